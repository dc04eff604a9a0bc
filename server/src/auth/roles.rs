use crate::models::User;
use std::fmt;
use thiserror::Error;

/// Roles seeded at startup. Stored by name in the `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Customer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Customer => "Customer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }

    fn grants(self, permission: Permission) -> bool {
        match permission {
            Permission::ManageRecipes => self == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create, edit, delete and list recipes in the admin panel.
    ManageRecipes,
}

#[derive(Debug, Error)]
#[error("permission {0:?} denied")]
pub struct Forbidden(pub Permission);

/// An authenticated user together with the roles granted to it.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.roles.iter().any(|role| role.grants(permission))
    }

    pub fn require(&self, permission: Permission) -> Result<(), Forbidden> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(Forbidden(permission))
        }
    }
}
