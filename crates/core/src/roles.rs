//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Returns `true` if `role` is one of the assignable role names.
pub fn is_valid_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_USER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("user"));
        assert!(!is_valid_role("creator"));
        assert!(!is_valid_role("Admin"));
    }
}
