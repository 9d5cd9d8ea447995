use crate::error::AppError;
use crate::models::{Role, User};

/// Checks that a resolved user holds one of `allowed` roles.
///
/// `None` means the resolver never produced a user, which is an
/// authentication failure rather than an authorization one. Roles don't
/// imply each other, so every route lists exactly the roles it accepts.
pub fn authorize(user: Option<&User>, allowed: &[Role]) -> Result<(), AppError> {
    let user = user.ok_or(AppError::Unauthenticated)?;
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new("x@example.com", "h".to_string(), "X".to_string(), role)
    }

    #[test]
    fn test_missing_user_is_unauthenticated() {
        assert_eq!(authorize(None, &[Role::Employer]), Err(AppError::Unauthenticated));
    }

    #[test]
    fn test_role_in_set_is_allowed() {
        let employer = user(Role::Employer);
        assert!(authorize(Some(&employer), &[Role::Employer]).is_ok());
        assert!(authorize(Some(&employer), &[Role::JobSeeker, Role::Employer]).is_ok());
    }

    #[test]
    fn test_role_outside_set_is_forbidden() {
        let seeker = user(Role::JobSeeker);
        assert!(matches!(
            authorize(Some(&seeker), &[Role::Employer]),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_does_not_imply_employer() {
        let admin = user(Role::SuperAdmin);
        assert!(matches!(
            authorize(Some(&admin), &[Role::Employer]),
            Err(AppError::Forbidden(_))
        ));
        assert!(authorize(Some(&admin), &[Role::SuperAdmin]).is_ok());
    }

    #[test]
    fn test_empty_set_allows_nobody() {
        assert!(authorize(Some(&user(Role::SuperAdmin)), &[]).is_err());
    }
}
