//! Association-credential validation and the verification state function.
//!
//! Verification state is derived, never stored: every call site that
//! needs to know whether a user may elevate goes through
//! [`verification_status`] instead of comparing dates itself.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use huiguan_core::models::user::User;
use regex::Regex;

use crate::error::AuthError;

/// Association credential: `HNHG` followed by exactly four digits,
/// case-insensitive, with one optional space between prefix and digits.
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)HNHG ?\d{4}$").expect("static pattern"));

/// Derived verification state for a user at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// No credential on record.
    Unverified,
    /// Credential on record and still within its validity window.
    Verified,
    /// Credential on record but past its expiry.
    Expired,
}

/// Compute the verification state of `user` as of `now`.
pub fn verification_status(user: &User, now: DateTime<Utc>) -> VerificationStatus {
    match (&user.verification_code, user.verification_expiry) {
        (Some(_), Some(expiry)) if expiry >= now => VerificationStatus::Verified,
        (Some(_), Some(_)) => VerificationStatus::Expired,
        _ => VerificationStatus::Unverified,
    }
}

/// Validate and normalize an association credential.
///
/// Accepts `"HNHG 1011"` and `"hnhg1011"` alike; returns the canonical
/// uppercase, space-free form (`"HNHG1011"`). Rejects anything that is
/// not the prefix plus exactly four digits.
pub fn normalize_code(input: &str) -> Result<String, AuthError> {
    if !CODE_PATTERN.is_match(input) {
        return Err(AuthError::InvalidCodeFormat);
    }
    Ok(input.to_uppercase().replace(' ', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use huiguan_core::models::user::{Role, User, default_roles};
    use uuid::Uuid;

    fn test_user(
        code: Option<&str>,
        expiry: Option<DateTime<Utc>>,
    ) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "mei@example.com".into(),
            name: "Mei".into(),
            password_hash: String::new(),
            primary_role: Role::SubEditor,
            roles: default_roles(Role::SubEditor),
            active_role: Role::SubEditor,
            association_id: None,
            points: 0,
            donor_badge: None,
            total_donated_cents: 0,
            verification_code: code.map(Into::into),
            verification_expiry: expiry,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn valid_codes_normalize() {
        assert_eq!(normalize_code("HNHG 1011").unwrap(), "HNHG1011");
        assert_eq!(normalize_code("hnhg1011").unwrap(), "HNHG1011");
        assert_eq!(normalize_code("hnhg 0001").unwrap(), "HNHG0001");
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for input in ["HNHG101", "ABCD1234", "hnhg12345", "HNHG  1011", "HNHG1O11", ""] {
            assert!(
                normalize_code(input).is_err(),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn status_without_credential_is_unverified() {
        let user = test_user(None, None);
        assert_eq!(
            verification_status(&user, Utc::now()),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn status_within_window_is_verified() {
        let now = Utc::now();
        let user = test_user(Some("HNHG1011"), Some(now + Duration::days(1)));
        assert_eq!(verification_status(&user, now), VerificationStatus::Verified);
    }

    #[test]
    fn status_past_expiry_is_expired() {
        let now = Utc::now();
        let user = test_user(Some("HNHG1011"), Some(now - Duration::days(1)));
        assert_eq!(verification_status(&user, now), VerificationStatus::Expired);
    }
}
