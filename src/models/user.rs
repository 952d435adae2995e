use serde::{Deserialize, Serialize};

/// The identity record the platform returns for an authenticated session.
///
/// Role information arrives in a loose shape: some deployments set a single
/// `role` string, others a `roles` list. `resolve_role` is the only place
/// that interprets either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Normalized access level consumed by every identity-gated collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
    Guest,
    Unknown,
}

/// Collapse the loose `role`/`roles` shape into a single enum.
pub fn resolve_role(user: Option<&User>) -> Role {
    let Some(user) = user else {
        return Role::Guest;
    };

    let has = |name: &str| {
        user.role.as_deref() == Some(name)
            || user
                .roles
                .as_ref()
                .is_some_and(|rs| rs.iter().any(|r| r == name))
    };

    if has("admin") {
        Role::Admin
    } else if has("student") {
        Role::Student
    } else {
        Role::Unknown
    }
}

impl Role {
    /// Dashboard path for the "back to dashboard" link. Unrecognized roles
    /// land on the student dashboard, like any non-admin account.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            _ => "/student",
        }
    }
}
