//! Caller identity supplied by the invocation context.

use crate::error::DomainError;
use crate::paths;

/// An authenticated caller, as established from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub uid: String,
    /// The `admin` custom claim
    pub admin: bool,
}

impl CallerIdentity {
    pub fn new(uid: impl Into<String>, admin: bool) -> Self {
        Self {
            uid: uid.into(),
            admin,
        }
    }
}

/// Fails with `Unauthenticated` unless a usable identity is present.
pub fn require_authenticated(caller: Option<&CallerIdentity>) -> Result<&CallerIdentity, DomainError> {
    match caller {
        Some(caller) if paths::is_valid_segment(&caller.uid) => Ok(caller),
        _ => Err(DomainError::Unauthenticated),
    }
}

/// Fails with `PermissionDenied` unless the caller carries the admin claim.
pub fn require_admin(caller: &CallerIdentity) -> Result<(), DomainError> {
    if caller.admin {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied("Admins only.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_caller() {
        assert!(matches!(
            require_authenticated(None),
            Err(DomainError::Unauthenticated)
        ));
    }

    #[test]
    fn test_unusable_uid_is_unauthenticated() {
        let caller = CallerIdentity::new("a/b", true);
        assert!(matches!(
            require_authenticated(Some(&caller)),
            Err(DomainError::Unauthenticated)
        ));
    }

    #[test]
    fn test_admin_checks() {
        let admin = CallerIdentity::new("U1", true);
        let member = CallerIdentity::new("U2", false);
        assert!(require_admin(&admin).is_ok());
        assert_eq!(
            require_admin(&member).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
    }
}
