use std::collections::HashMap;

use backoffice_core::{AppError, AppResult};
use backoffice_domain::{AdminUser, Role};

/// Named roles known to the admin panel.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
}

impl RoleRegistry {
    /// Builds a registry; role names must be unique.
    pub fn new(roles: Vec<Role>) -> AppResult<Self> {
        let mut by_name = HashMap::with_capacity(roles.len());
        for role in roles {
            let name = role.name().as_str().to_owned();
            if by_name.contains_key(&name) {
                return Err(AppError::Conflict(format!(
                    "role '{name}' is defined more than once"
                )));
            }
            by_name.insert(name, role);
        }

        Ok(Self { roles: by_name })
    }

    /// Returns the role with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Returns whether a role with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }
}

/// Application service for permission checks against user roles.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    roles: RoleRegistry,
}

impl AuthorizationService {
    /// Creates a new authorization service over a role registry.
    #[must_use]
    pub fn new(roles: RoleRegistry) -> Self {
        Self { roles }
    }

    /// Returns the role assigned to a user, if it is registered.
    #[must_use]
    pub fn role_for(&self, user: &AdminUser) -> Option<&Role> {
        self.roles.get(user.role())
    }

    /// Returns whether the role registry knows a role name.
    #[must_use]
    pub fn role_exists(&self, name: &str) -> bool {
        self.roles.contains(name)
    }

    /// Returns whether the user currently has the permission.
    #[must_use]
    pub fn has_permission(&self, user: &AdminUser, permission: &str) -> bool {
        self.role_for(user)
            .is_some_and(|role| role.can(permission))
    }

    /// Ensures the user has the required permission.
    pub fn require_permission(&self, user: &AdminUser, permission: &str) -> AppResult<()> {
        if self.has_permission(user, permission) {
            return Ok(());
        }

        tracing::debug!(
            user_id = %user.id(),
            role = user.role(),
            permission,
            "permission denied"
        );

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{permission}'",
            user.id()
        )))
    }
}
