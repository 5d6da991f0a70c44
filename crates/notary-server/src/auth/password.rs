//! Account credential hashing.
//!
//! Stored credentials are argon2id PHC strings. A login for a username that
//! does not exist is still checked against a decoy hash, so an unknown user
//! and a wrong password cost the same argon2 work.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::storage::User;

/// Stand-in credential for logins that name no stored account. Built with the
/// same parameters as real account hashes.
static DECOY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("decoy-Credential-0").unwrap_or_default());

#[cfg(test)]
thread_local! {
    static VERIFICATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of argon2 verifications run on this thread.
#[cfg(test)]
pub(crate) fn verifications() -> usize {
    VERIFICATIONS.with(std::cell::Cell::get)
}

/// Hash an account password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check a login attempt against the account it names, if any.
///
/// `None` runs the check against the decoy hash and always fails. A stored
/// value that is not a valid PHC string is an error, not a mismatch.
pub fn verify_login(
    password: &str,
    account: Option<&User>,
) -> Result<bool, argon2::password_hash::Error> {
    let stored = account.map_or(DECOY_HASH.as_str(), |user| user.password_hash.as_str());
    let matched = verify(password, stored)?;
    Ok(matched && account.is_some())
}

fn verify(password: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    #[cfg(test)]
    VERIFICATIONS.with(|n| n.set(n.get() + 1));

    let parsed = PasswordHash::new(stored)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::accounts::policy::{generate_password, validate_password};
    use crate::storage::PERMISSIONS_USER;

    fn account(password: &str) -> User {
        User {
            id: 7,
            username: "operator".to_string(),
            password_hash: hash_password(password).unwrap(),
            permissions: PERMISSIONS_USER,
        }
    }

    #[test]
    fn generated_password_logs_in() {
        let password = generate_password();
        assert!(validate_password(&password));
        assert!(verify_login(&password, Some(&account(&password))).unwrap());
    }

    #[test]
    fn case_flipped_password_is_refused() {
        let user = account("Operator-42");
        assert!(validate_password("oPERATOR-42"));
        assert!(!verify_login("oPERATOR-42", Some(&user)).unwrap());
        assert!(!verify_login("Operator-4", Some(&user)).unwrap());
    }

    #[test]
    fn stored_hash_is_salted_argon2id() {
        let first = account("Operator-42");
        let second = account("Operator-42");
        assert!(first.password_hash.starts_with("$argon2id$"));
        assert!(!first.password_hash.contains("Operator-42"));
        assert_ne!(first.password_hash, second.password_hash);
    }

    #[test]
    fn unknown_account_never_logs_in() {
        assert!(!verify_login("decoy-Credential-0", None).unwrap());
        assert!(!verify_login(&generate_password(), None).unwrap());
    }

    #[test]
    fn unknown_account_costs_one_verification() {
        let before = verifications();
        verify_login("Operator-42", None).unwrap();
        let unknown = verifications() - before;

        let user = account("Operator-42");
        let before = verifications();
        verify_login("Wrong-Pass1", Some(&user)).unwrap();
        let wrong = verifications() - before;

        assert_eq!(unknown, 1);
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn corrupted_stored_hash_is_error() {
        let mut user = account("Operator-42");
        user.password_hash = "not-a-phc-string".to_string();
        assert!(verify_login("Operator-42", Some(&user)).is_err());
    }
}
