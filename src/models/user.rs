//! Users and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Access role of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Admin,
    Tenant,
}

impl Role {
    /// Admins and superadmins share most staff permissions.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Tenant => "tenant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "tenant" => Ok(Role::Tenant),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: Role,
    /// Inactive accounts cannot authenticate.
    pub is_active: bool,
    /// Set once the account email has been confirmed (out of band).
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_tenant(&self) -> bool {
        self.role == Role::Tenant
    }
}

/// Fields for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Tenant
}

/// Partial update of a user; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        for role in [Role::Superadmin, Role::Admin, Role::Tenant] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("landlord".parse::<Role>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Superadmin.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Tenant.is_staff());
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"superadmin\"");
    }
}
