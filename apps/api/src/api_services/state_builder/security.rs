use backoffice_application::RoleRegistry;
use backoffice_core::AppError;
use backoffice_domain::{GLOBAL_WILDCARD, Role};

/// Roles assignable to admin users.
pub(super) fn default_roles() -> Result<RoleRegistry, AppError> {
    RoleRegistry::new(vec![
        Role::new("admin", [GLOBAL_WILDCARD])?,
        Role::new(
            "editor",
            [
                "admin.api.media.*",
                "admin.api.user.index",
                "admin.api.user.widgets",
            ],
        )?,
        Role::new("viewer", ["admin.api.media.index", "admin.api.user.index"])?,
    ])
}
