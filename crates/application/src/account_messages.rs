//! User-specific messages: the user resource's create and update overrides
//! and the account email change.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult, UserId};
use backoffice_domain::{AdminUser, EmailAddress, MessageKind, UserStatus, user_fields};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    Message, MessageFactory, MessageMetadata, PasswordHasher, RoleRegistry, UserDirectory,
    Violations,
};

/// Body field repeating the new email on the account form.
pub const EMAIL_REPEAT_FIELD: &str = "emailRepeat";

/// Body field carrying the plaintext password of a new user.
pub const PASSWORD_FIELD: &str = "password";

fn text_field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

fn parse_email(body: &Map<String, Value>) -> Option<AppResult<EmailAddress>> {
    body.get(user_fields::EMAIL).map(|value| {
        value
            .as_str()
            .ok_or_else(|| AppError::Validation("email must be a string".to_owned()))
            .and_then(EmailAddress::new)
    })
}

fn parse_status(body: &Map<String, Value>) -> Option<AppResult<UserStatus>> {
    body.get(user_fields::STATUS).map(|value| {
        value
            .as_str()
            .ok_or_else(|| AppError::Validation("status must be a string".to_owned()))
            .and_then(UserStatus::from_str)
    })
}

/// Builds [`MessageKind::CreateUser`] messages.
#[derive(Clone)]
pub struct CreateUserFactory {
    users: Arc<dyn UserDirectory>,
    roles: Arc<RoleRegistry>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CreateUserFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectory>,
        roles: Arc<RoleRegistry>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            roles,
            hasher,
        }
    }
}

impl MessageFactory for CreateUserFactory {
    fn build(&self, body: Map<String, Value>, _metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(CreateUserMessage {
            users: self.users.clone(),
            roles: self.roles.clone(),
            hasher: self.hasher.clone(),
            body,
        })
    }
}

struct CreateUserMessage {
    users: Arc<dyn UserDirectory>,
    roles: Arc<RoleRegistry>,
    hasher: Arc<dyn PasswordHasher>,
    body: Map<String, Value>,
}

impl CreateUserMessage {
    fn role(&self) -> Option<&str> {
        text_field(&self.body, user_fields::ROLE).filter(|role| self.roles.contains(role))
    }

    fn password(&self) -> Option<&str> {
        text_field(&self.body, PASSWORD_FIELD).filter(|password| !password.is_empty())
    }
}

#[async_trait]
impl Message for CreateUserMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::CreateUser
    }

    async fn validate(&self) -> AppResult<Violations> {
        let mut violations = Violations::new();

        match parse_email(&self.body) {
            Some(Ok(email)) => {
                if self.users.find_by_email(&email).await?.is_some() {
                    violations.add(user_fields::EMAIL, "email_already_taken");
                }
            }
            Some(Err(_)) | None => violations.add(user_fields::EMAIL, "invalid_email"),
        }

        if self.role().is_none() {
            violations.add(user_fields::ROLE, "invalid_role");
        }
        if self.password().is_none() {
            violations.add(PASSWORD_FIELD, "invalid_password");
        }
        if let Some(Err(_)) = parse_status(&self.body) {
            violations.add(user_fields::STATUS, "invalid_status");
        }

        Ok(violations)
    }

    async fn execute(&self) -> AppResult<()> {
        let email = parse_email(&self.body)
            .ok_or_else(|| AppError::Validation("email is required".to_owned()))??;
        let role = self
            .role()
            .ok_or_else(|| AppError::Validation("a known role is required".to_owned()))?;
        let password = self
            .password()
            .ok_or_else(|| AppError::Validation("password is required".to_owned()))?;

        let now = Utc::now();
        let mut user = AdminUser::new(
            UserId::new(),
            email,
            role,
            self.hasher.hash_password(password)?,
            now,
        );
        if let Some(status) = parse_status(&self.body) {
            user = user.with_status(status?, now);
        }

        tracing::info!(user_id = %user.id(), role, "creating user");
        self.users.save(&user).await
    }
}

/// Builds [`MessageKind::UpdateUser`] messages.
#[derive(Clone)]
pub struct UpdateUserFactory {
    users: Arc<dyn UserDirectory>,
    roles: Arc<RoleRegistry>,
}

impl UpdateUserFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>, roles: Arc<RoleRegistry>) -> Self {
        Self { users, roles }
    }
}

impl MessageFactory for UpdateUserFactory {
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(UpdateUserMessage {
            users: self.users.clone(),
            roles: self.roles.clone(),
            user_id: metadata
                .entity_id
                .as_deref()
                .and_then(|id| UserId::from_str(id).ok()),
            body,
        })
    }
}

struct UpdateUserMessage {
    users: Arc<dyn UserDirectory>,
    roles: Arc<RoleRegistry>,
    user_id: Option<UserId>,
    body: Map<String, Value>,
}

impl UpdateUserMessage {
    async fn target_user(&self) -> AppResult<Option<AdminUser>> {
        let Some(user_id) = self.user_id else {
            return Ok(None);
        };

        let user = self.users.find_by_id(user_id).await?;
        Ok(user.filter(|user| user.deleted_at().is_none()))
    }

    fn email(&self) -> Option<AppResult<EmailAddress>> {
        parse_email(&self.body)
    }

    fn status(&self) -> Option<AppResult<UserStatus>> {
        parse_status(&self.body)
    }
}

#[async_trait]
impl Message for UpdateUserMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::UpdateUser
    }

    async fn validate(&self) -> AppResult<Violations> {
        let mut violations = Violations::new();
        let user = self.target_user().await?;
        if user.is_none() {
            violations.add("id", "not_found");
        }

        match self.email() {
            Some(Ok(email)) => {
                if let Some(user) = &user
                    && self.users.email_taken_by_other(&email, user.id()).await?
                {
                    violations.add(user_fields::EMAIL, "email_already_taken");
                }
            }
            Some(Err(_)) => violations.add(user_fields::EMAIL, "invalid_email"),
            None => {}
        }

        if let Some(role) = self.body.get(user_fields::ROLE) {
            let known = role.as_str().is_some_and(|role| self.roles.contains(role));
            if !known {
                violations.add(user_fields::ROLE, "invalid_role");
            }
        }

        if let Some(Err(_)) = self.status() {
            violations.add(user_fields::STATUS, "invalid_status");
        }

        Ok(violations)
    }

    async fn execute(&self) -> AppResult<()> {
        let Some(mut user) = self.target_user().await? else {
            return Err(AppError::NotFound("user does not exist".to_owned()));
        };
        let now = Utc::now();

        if let Some(email) = self.email() {
            user = user.with_email(email?, now);
        }
        if let Some(role) = text_field(&self.body, user_fields::ROLE) {
            user = user.with_role(role, now);
        }
        if let Some(status) = self.status() {
            user = user.with_status(status?, now);
        }

        tracing::info!(user_id = %user.id(), "updating user");
        self.users.save(&user).await
    }
}

/// Builds [`MessageKind::ChangeEmail`] messages.
#[derive(Clone)]
pub struct ChangeEmailFactory {
    users: Arc<dyn UserDirectory>,
}

impl ChangeEmailFactory {
    /// Creates the factory.
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

impl MessageFactory for ChangeEmailFactory {
    fn build(&self, body: Map<String, Value>, metadata: MessageMetadata) -> Box<dyn Message> {
        Box::new(ChangeEmailMessage {
            users: self.users.clone(),
            user_id: metadata.user_id,
            email: text_field(&body, user_fields::EMAIL).map(str::to_owned),
            email_repeat: text_field(&body, EMAIL_REPEAT_FIELD).map(str::to_owned),
        })
    }
}

struct ChangeEmailMessage {
    users: Arc<dyn UserDirectory>,
    user_id: Option<UserId>,
    email: Option<String>,
    email_repeat: Option<String>,
}

impl ChangeEmailMessage {
    async fn user(&self) -> AppResult<Option<AdminUser>> {
        match self.user_id {
            Some(user_id) => self.users.find_by_id(user_id).await,
            None => Ok(None),
        }
    }

    fn email(&self) -> AppResult<EmailAddress> {
        EmailAddress::new(self.email.clone().unwrap_or_default())
    }
}

#[async_trait]
impl Message for ChangeEmailMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::ChangeEmail
    }

    async fn validate(&self) -> AppResult<Violations> {
        let mut violations = Violations::new();
        let user = self.user().await?;
        if user.is_none() {
            violations.add("user", "invalid_user");
        }

        let email = self.email();
        if email.is_err() {
            violations.add(user_fields::EMAIL, "invalid_email");
        }

        if self.email != self.email_repeat {
            violations.add(EMAIL_REPEAT_FIELD, "invalid_email");
        }

        if let (Some(user), Ok(email)) = (&user, &email)
            && self.users.email_taken_by_other(email, user.id()).await?
        {
            violations.add(user_fields::EMAIL, "email_already_taken");
        }

        Ok(violations)
    }

    async fn execute(&self) -> AppResult<()> {
        let Some(user) = self.user().await? else {
            return Err(AppError::NotFound("user does not exist".to_owned()));
        };

        let user = user.with_email(self.email()?, Utc::now());
        tracing::info!(user_id = %user.id(), "changing account email");
        self.users.save(&user).await
    }
}
