//! Admin user accounts and their record representation.

use std::str::FromStr;

use backoffice_core::{AppError, AppResult, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AdminRecord, DELETED_AT_FIELD};

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Checks the shape only: one `@`, a non-empty local part and a domain
    /// with at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain an '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one inner '.'".to_owned(),
            ));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Whether an admin user may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account may sign in.
    Active,
    /// Account is disabled.
    Inactive,
}

impl UserStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// Record field names used for admin users.
pub mod user_fields {
    /// Email field.
    pub const EMAIL: &str = "email";
    /// Role name field.
    pub const ROLE: &str = "role";
    /// Argon2 hash field; never projected publicly.
    pub const PASSWORD_HASH: &str = "passwordHash";
    /// Account status field.
    pub const STATUS: &str = "status";
    /// Creation timestamp field.
    pub const CREATED_AT: &str = "createdAt";
    /// Last update timestamp field.
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Admin user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    id: UserId,
    email: EmailAddress,
    role: String,
    password_hash: String,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    /// Creates a new active user.
    #[must_use]
    pub fn new(
        id: UserId,
        email: EmailAddress,
        role: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role: role.into(),
            password_hash: password_hash.into(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the role name.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns the password hash.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Returns the account status.
    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns the deletion timestamp, if soft-deleted.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the user may sign in.
    #[must_use]
    pub fn can_sign_in(&self) -> bool {
        self.status == UserStatus::Active && self.deleted_at.is_none()
    }

    /// Returns a copy with a new email.
    #[must_use]
    pub fn with_email(mut self, email: EmailAddress, now: DateTime<Utc>) -> Self {
        self.email = email;
        self.updated_at = now;
        self
    }

    /// Returns a copy with a new status.
    #[must_use]
    pub fn with_status(mut self, status: UserStatus, now: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = now;
        self
    }

    /// Returns a copy with a new role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>, now: DateTime<Utc>) -> Self {
        self.role = role.into();
        self.updated_at = now;
        self
    }

    /// Converts the user into its stored record.
    pub fn to_record(&self) -> AppResult<AdminRecord> {
        let mut fields = Map::new();
        fields.insert(
            user_fields::EMAIL.to_owned(),
            Value::String(self.email.as_str().to_owned()),
        );
        fields.insert(user_fields::ROLE.to_owned(), Value::String(self.role.clone()));
        fields.insert(
            user_fields::PASSWORD_HASH.to_owned(),
            Value::String(self.password_hash.clone()),
        );
        fields.insert(
            user_fields::STATUS.to_owned(),
            Value::String(self.status.as_str().to_owned()),
        );
        fields.insert(
            user_fields::CREATED_AT.to_owned(),
            Value::String(self.created_at.to_rfc3339()),
        );
        fields.insert(
            user_fields::UPDATED_AT.to_owned(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        fields.insert(
            DELETED_AT_FIELD.to_owned(),
            self.deleted_at
                .map(|value| Value::String(value.to_rfc3339()))
                .unwrap_or(Value::Null),
        );

        AdminRecord::new(self.id.to_string(), fields)
    }

    /// Reads a user back from its stored record.
    pub fn from_record(record: &AdminRecord) -> AppResult<Self> {
        let id = UserId::from_str(record.id())?;
        let email = EmailAddress::new(required_text(record, user_fields::EMAIL)?)?;
        let role = required_text(record, user_fields::ROLE)?.to_owned();
        let password_hash = required_text(record, user_fields::PASSWORD_HASH)?.to_owned();
        let status = record
            .field(user_fields::STATUS)
            .and_then(Value::as_str)
            .map(UserStatus::from_str)
            .transpose()?
            .unwrap_or(UserStatus::Active);

        Ok(Self {
            id,
            email,
            role,
            password_hash,
            status,
            created_at: required_timestamp(record, user_fields::CREATED_AT)?,
            updated_at: required_timestamp(record, user_fields::UPDATED_AT)?,
            deleted_at: optional_timestamp(record, DELETED_AT_FIELD)?,
        })
    }
}

fn required_text<'a>(record: &'a AdminRecord, field: &str) -> AppResult<&'a str> {
    record
        .field(field)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "user record '{}' is missing '{field}'",
                record.id()
            ))
        })
}

fn required_timestamp(record: &AdminRecord, field: &str) -> AppResult<DateTime<Utc>> {
    optional_timestamp(record, field)?.ok_or_else(|| {
        AppError::Validation(format!(
            "user record '{}' is missing '{field}'",
            record.id()
        ))
    })
}

fn optional_timestamp(record: &AdminRecord, field: &str) -> AppResult<Option<DateTime<Utc>>> {
    record
        .field(field)
        .and_then(Value::as_str)
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|error| {
                    AppError::Validation(format!("invalid timestamp in '{field}': {error}"))
                })
        })
        .transpose()
}
