use std::fmt::{Display, Formatter};
use std::str::FromStr;

use backoffice_core::AppError;
use serde::{Deserialize, Serialize};

/// Admin-manageable resources known to the backoffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKey {
    /// Admin user accounts.
    User,
    /// Uploaded media entries.
    Media,
}

impl ResourceKey {
    /// Returns the stable route value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Media => "media",
        }
    }

    /// Returns all known resource keys.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceKey] = &[ResourceKey::User, ResourceKey::Media];

        ALL
    }
}

impl FromStr for ResourceKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "media" => Ok(Self::Media),
            _ => Err(AppError::NotFound(format!("unknown resource '{value}'"))),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Message types the resource dispatcher can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Generic record creation.
    Create,
    /// Generic record update.
    Update,
    /// Generic record deletion.
    Delete,
    /// Admin user creation with a hashed password.
    CreateUser,
    /// Admin user update with role and email checks.
    UpdateUser,
    /// Email change of the signed-in account.
    ChangeEmail,
}

impl MessageKind {
    /// Returns the stable service name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "admin.resource-create",
            Self::Update => "admin.resource-update",
            Self::Delete => "admin.resource-delete",
            Self::CreateUser => "admin.user-create",
            Self::UpdateUser => "admin.user-update",
            Self::ChangeEmail => "admin.account-change-email",
        }
    }
}

impl FromStr for MessageKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin.resource-create" => Ok(Self::Create),
            "admin.resource-update" => Ok(Self::Update),
            "admin.resource-delete" => Ok(Self::Delete),
            "admin.user-create" => Ok(Self::CreateUser),
            "admin.user-update" => Ok(Self::UpdateUser),
            "admin.account-change-email" => Ok(Self::ChangeEmail),
            _ => Err(AppError::NotFound(format!("unknown message '{value}'"))),
        }
    }
}

impl Display for MessageKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Endpoint families exposed for every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAction {
    /// List records.
    Index,
    /// Create a record.
    Create,
    /// Update a record.
    Update,
    /// Delete a record.
    Delete,
    /// Read page widgets.
    Widgets,
}

impl ResourceAction {
    /// Returns the stable action segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Widgets => "widgets",
        }
    }

    /// Returns the dotted permission guarding this action on a resource.
    #[must_use]
    pub fn permission(&self, resource: ResourceKey) -> String {
        format!("admin.api.{}.{}", resource.as_str(), self.as_str())
    }
}
