//! Derived profile-completeness flag.
//!
//! `profile_complete` gates geo-matching eligibility. It is recomputed on
//! every profile write from a fixed required-field set and is never accepted
//! from the client. The SQL patch in `user_repo::update_profile` mirrors
//! this rule; keep the two in sync.

/// The fields that must all be populated before a profile counts as
/// complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredProfileFields<'a> {
    pub state: Option<&'a str>,
    pub locality: Option<&'a str>,
    pub profession: Option<&'a str>,
    pub identity_document: Option<&'a str>,
}

/// Recompute the completeness flag from the required field set.
pub fn is_profile_complete(fields: &RequiredProfileFields<'_>) -> bool {
    [
        fields.state,
        fields.locality,
        fields.profession,
        fields.identity_document,
    ]
    .iter()
    .all(|v| v.is_some_and(|s| !s.trim().is_empty()))
}
