//! Referral link derivation and ledger state.
//!
//! A marketer's referral link is derived deterministically from the user id,
//! so re-deriving can never mint a second link for the same account. Link
//! issuance is a one-way admin action; individual referral events only touch
//! counters and lists.

use crate::types::DbId;

/// Public host embedded in marketer referral links.
const REFERRAL_LINK_HOST: &str = "cityfix.com";

/// Derive the unique referral link for a marketer.
pub fn referral_link_for(user_id: DbId) -> String {
    format!("{REFERRAL_LINK_HOST}/marketer/{user_id}-referral-link")
}

/// Ledger state of a would-be marketer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    NoLink,
    LinkIssued,
}

/// Derive the ledger state from the stored link column.
pub fn link_state(referral_link: Option<&str>) -> LinkState {
    match referral_link {
        Some(_) => LinkState::LinkIssued,
        None => LinkState::NoLink,
    }
}

/// Link issuance is one-way: `NoLink -> LinkIssued`, never back.
pub fn can_issue_link(state: LinkState) -> bool {
    state == LinkState::NoLink
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_is_deterministic_in_the_user_id() {
        assert_eq!(referral_link_for(42), referral_link_for(42));
        assert_ne!(referral_link_for(42), referral_link_for(43));
    }

    #[test]
    fn link_format_embeds_the_id() {
        assert_eq!(
            referral_link_for(7),
            "cityfix.com/marketer/7-referral-link"
        );
    }

    #[test]
    fn issuance_is_one_way() {
        assert!(can_issue_link(link_state(None)));
        assert!(!can_issue_link(link_state(Some(
            "cityfix.com/marketer/7-referral-link"
        ))));
    }
}
