//! One capability table instead of role-string checks at call sites.
//!
//! Admin-tier roles come from configuration; everything else hinges on the
//! acting user holding the project's currently assigned division role.

use crate::project::User;

#[derive(Debug, Clone)]
pub struct Policy {
    admin_roles: Vec<String>,
}

impl Policy {
    pub fn new(admin_roles: Vec<String>) -> Self {
        Self { admin_roles }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        self.admin_roles.iter().any(|role| user.has_role(role))
    }

    /// Fire a transition on a project owned by `assigned_division`.
    pub fn can_fire(&self, user: &User, assigned_division: &str) -> bool {
        user.has_role(assigned_division) || self.is_admin(user)
    }

    /// Report a division's portion of a parallel step as done. The user
    /// must hold that division's role (or be admin); owning the step's
    /// composite division is not required.
    pub fn can_mark_complete(&self, user: &User, division: &str) -> bool {
        user.has_role(division) || self.is_admin(user)
    }

    /// Manual override is admin-only. The single gate in front of the
    /// unchecked write path.
    pub fn can_override(&self, user: &User) -> bool {
        self.is_admin(user)
    }

    /// The role under which an action is recorded in history: the matching
    /// division role if the user holds it, else their first admin role.
    pub fn acting_role(&self, user: &User, assigned_division: &str) -> Option<String> {
        if user.has_role(assigned_division) {
            return Some(assigned_division.to_string());
        }
        self.admin_role_of(user)
    }

    /// First admin-tier role the user holds, for attributing overrides.
    pub fn admin_role_of(&self, user: &User) -> Option<String> {
        self.admin_roles
            .iter()
            .find(|role| user.has_role(role))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> User {
        User {
            username: "budi".to_string(),
            display_name: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn policy() -> Policy {
        Policy::new(vec!["Owner".to_string(), "Admin Proyek".to_string()])
    }

    #[test]
    fn division_member_can_fire_own_division_only() {
        let p = policy();
        let arsitek = user(&["Arsitek"]);
        assert!(p.can_fire(&arsitek, "Arsitek"));
        assert!(!p.can_fire(&arsitek, "Struktur"));
        assert!(!p.can_override(&arsitek));
    }

    #[test]
    fn admin_tier_can_fire_anywhere_and_override() {
        let p = policy();
        let admin = user(&["Admin Proyek"]);
        assert!(p.can_fire(&admin, "Arsitek"));
        assert!(p.can_override(&admin));
        assert_eq!(
            p.acting_role(&admin, "Arsitek"),
            Some("Admin Proyek".to_string())
        );
    }

    #[test]
    fn acting_role_prefers_division_membership() {
        let p = policy();
        let both = user(&["Owner", "Arsitek"]);
        assert_eq!(p.acting_role(&both, "Arsitek"), Some("Arsitek".to_string()));
    }
}
