//! Well-known account type and role constants.
//!
//! The account types must match the CHECK constraint in
//! `20260301000001_create_users.sql`.

/// Service-consuming account type.
pub const ACCOUNT_CONSUMER: &str = "User";

/// Service-offering account type, the only one eligible for geo-matching.
pub const ACCOUNT_PROVIDER: &str = "CityBuilder";

/// Account type permitted to hold a referral link and accrue referral credit.
pub const ACCOUNT_MARKETER: &str = "Marketer";

/// Role claim carried by administrative tokens. Admins are not rows in the
/// `users` table.
pub const ROLE_ADMIN: &str = "Admin";

/// Account types accepted at self-signup. Marketer accounts are only minted
/// by an admin converting an existing user.
pub const SIGNUP_ACCOUNT_TYPES: &[&str] = &[ACCOUNT_CONSUMER, ACCOUNT_PROVIDER];

/// Check whether `account_type` may be requested at signup.
pub fn is_signup_account_type(account_type: &str) -> bool {
    SIGNUP_ACCOUNT_TYPES.contains(&account_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumer_and_provider_can_sign_up() {
        assert!(is_signup_account_type(ACCOUNT_CONSUMER));
        assert!(is_signup_account_type(ACCOUNT_PROVIDER));
    }

    #[test]
    fn marketer_and_admin_cannot_sign_up() {
        assert!(!is_signup_account_type(ACCOUNT_MARKETER));
        assert!(!is_signup_account_type(ROLE_ADMIN));
        assert!(!is_signup_account_type(""));
        assert!(!is_signup_account_type("citybuilder"));
    }
}
