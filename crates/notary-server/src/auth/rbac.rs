//! Role checks guarding the API routes.
//!
//! Each guard takes the verified caller identity (or its absence) and the
//! target of the call as explicit arguments.

use std::str::FromStr;

use super::claims::Claims;

/// Authorization failures raised by the guards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

/// An account addressed in a path: a numeric id or the `me` alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRef {
    Me,
    Id(i64),
}

/// The path segment was neither `me` nor an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid account id: {0}")]
pub struct InvalidAccountRef(pub String);

/// Why an account path could not be resolved for a caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountPathError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Invalid(#[from] InvalidAccountRef),
}

impl FromStr for AccountRef {
    type Err = InvalidAccountRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "me" {
            return Ok(Self::Me);
        }
        s.parse()
            .map(Self::Id)
            .map_err(|_| InvalidAccountRef(s.to_string()))
    }
}

impl AccountRef {
    /// Resolve to a concrete id, taking `me` from the caller's own token.
    pub const fn resolve(self, claims: &Claims) -> i64 {
        match self {
            Self::Me => claims.id,
            Self::Id(id) => id,
        }
    }
}

pub fn require_admin(claims: &Claims) -> Result<(), AuthError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("admin access required"))
    }
}

/// Admins pass; anyone else only when `target` is their own account.
pub fn require_admin_or_owner(claims: &Claims, target: i64) -> Result<(), AuthError> {
    if claims.is_admin() || claims.id == target {
        Ok(())
    } else {
        Err(AuthError::Forbidden("admin or account owner access required"))
    }
}

/// Resolve an account path segment and check the caller may act on it.
///
/// The role check wins over parsing: a non-admin naming anything but their
/// own account is forbidden, even when the segment is not a valid id.
pub fn authorize_account_path(claims: &Claims, raw: &str) -> Result<i64, AccountPathError> {
    match raw.parse::<AccountRef>() {
        Ok(account) => {
            let id = account.resolve(claims);
            require_admin_or_owner(claims, id)?;
            Ok(id)
        }
        Err(e) if claims.is_admin() => Err(e.into()),
        Err(_) => Err(AuthError::Forbidden("admin or account owner access required").into()),
    }
}

/// Anonymous calls pass only while no user exists; afterwards an admin is required.
pub fn require_admin_or_first_user(
    claims: Option<&Claims>,
    user_count: i64,
) -> Result<(), AuthError> {
    if user_count == 0 {
        return Ok(());
    }
    match claims {
        Some(claims) => require_admin(claims),
        None => Err(bootstrap_closed(None)),
    }
}

/// The refusal given to a non-admin once the first account exists.
pub const fn bootstrap_closed(claims: Option<&Claims>) -> AuthError {
    match claims {
        Some(_) => AuthError::Forbidden("admin access required"),
        None => AuthError::Unauthenticated,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn claims(id: i64, permissions: i64) -> Claims {
        Claims {
            id,
            username: format!("user{id}"),
            permissions,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn account_ref_parses_me_and_ids() {
        assert_eq!("me".parse::<AccountRef>().unwrap(), AccountRef::Me);
        assert_eq!("42".parse::<AccountRef>().unwrap(), AccountRef::Id(42));
        assert!("abc".parse::<AccountRef>().is_err());
        assert!("Me".parse::<AccountRef>().is_err());
    }

    #[test]
    fn me_resolves_to_token_subject() {
        let caller = claims(5, 0);
        assert_eq!(AccountRef::Me.resolve(&caller), 5);
        assert_eq!(AccountRef::Id(9).resolve(&caller), 9);
    }

    #[test]
    fn admin_only() {
        assert!(require_admin(&claims(1, 1)).is_ok());
        assert!(matches!(
            require_admin(&claims(2, 0)),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_or_owner() {
        assert!(require_admin_or_owner(&claims(1, 1), 99).is_ok());
        assert!(require_admin_or_owner(&claims(2, 0), 2).is_ok());
        assert!(matches!(
            require_admin_or_owner(&claims(2, 0), 3),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn account_path_resolves_for_owner_and_admin() {
        assert_eq!(authorize_account_path(&claims(2, 0), "me"), Ok(2));
        assert_eq!(authorize_account_path(&claims(2, 0), "2"), Ok(2));
        assert_eq!(authorize_account_path(&claims(1, 1), "9"), Ok(9));
    }

    #[test]
    fn account_path_role_check_precedes_parsing() {
        for raw in ["3", "abc", ""] {
            assert!(matches!(
                authorize_account_path(&claims(2, 0), raw),
                Err(AccountPathError::Auth(AuthError::Forbidden(_)))
            ));
        }
        assert!(matches!(
            authorize_account_path(&claims(1, 1), "abc"),
            Err(AccountPathError::Invalid(_))
        ));
    }

    #[test]
    fn closed_bootstrap_refusal_depends_on_caller() {
        assert_eq!(bootstrap_closed(None), AuthError::Unauthenticated);
        assert!(matches!(
            bootstrap_closed(Some(&claims(2, 0))),
            AuthError::Forbidden(_)
        ));
    }

    #[test]
    fn first_user_bootstrap_is_open() {
        assert!(require_admin_or_first_user(None, 0).is_ok());
        assert!(require_admin_or_first_user(Some(&claims(2, 0)), 0).is_ok());
    }

    #[test]
    fn after_bootstrap_admin_is_required() {
        assert_eq!(
            require_admin_or_first_user(None, 1),
            Err(AuthError::Unauthenticated)
        );
        assert!(matches!(
            require_admin_or_first_user(Some(&claims(2, 0)), 2),
            Err(AuthError::Forbidden(_))
        ));
        assert!(require_admin_or_first_user(Some(&claims(1, 1)), 2).is_ok());
    }
}
