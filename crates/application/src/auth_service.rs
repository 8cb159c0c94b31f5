use std::sync::Arc;

use backoffice_core::{AppResult, UserId};
use backoffice_domain::{AdminUser, EmailAddress, SessionData};
use chrono::Utc;
use uuid::Uuid;

use crate::{PasswordHasher, SessionTokenCodec, UserDirectory};

/// Freshly signed session plus the anti-forgery token mirrored to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Signed token for the session cookie.
    pub session_token: String,
    /// Anti-forgery token for the readable cookie.
    pub xsrf_token: String,
    /// Session payload inside the token.
    pub data: SessionData,
}

/// Issues and reads stateless session tokens.
#[derive(Debug, Clone)]
pub struct SessionService {
    codec: SessionTokenCodec,
}

impl SessionService {
    /// Creates a session service around a token codec.
    #[must_use]
    pub fn new(codec: SessionTokenCodec) -> Self {
        Self { codec }
    }

    /// Returns the session lifetime in seconds.
    #[must_use]
    pub fn lifetime_seconds(&self) -> i64 {
        self.codec.lifetime_seconds()
    }

    /// Issues a session with a new anti-forgery token.
    pub fn issue(&self, issuer: &str, user_id: Option<UserId>) -> AppResult<IssuedSession> {
        let xsrf_token = Uuid::new_v4().to_string();
        let data = SessionData::new(xsrf_token.clone(), user_id)?;
        let session_token = self.codec.issue(issuer, &data, Utc::now())?;

        Ok(IssuedSession {
            session_token,
            xsrf_token,
            data,
        })
    }

    /// Reads the session carried by a token; invalid tokens are anonymous.
    #[must_use]
    pub fn parse(&self, token: &str) -> Option<SessionData> {
        self.codec.parse(token, Utc::now())
    }
}

/// Result of a sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched an active user.
    SignedIn {
        /// Session for the user.
        session: IssuedSession,
        /// Signed-in user.
        user: AdminUser,
    },
    /// Unknown email, wrong password or disabled account.
    InvalidCredentials,
}

/// Session attached to a request after its cookie was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    /// Verified session payload.
    pub data: SessionData,
    /// Signed-in user, when the session names one that may still sign in.
    pub user: Option<AdminUser>,
}

/// Application service for sign-in, sign-out and session resolution.
#[derive(Clone)]
pub struct AuthService {
    sessions: SessionService,
    users: Arc<dyn UserDirectory>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        sessions: SessionService,
        users: Arc<dyn UserDirectory>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            sessions,
            users,
            password_hasher,
        }
    }

    /// Returns the session service.
    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Checks credentials and issues a signed-in session.
    pub async fn login(&self, email: &str, password: &str, issuer: &str) -> AppResult<LoginOutcome> {
        if email.trim().is_empty() || password.is_empty() {
            return Ok(LoginOutcome::InvalidCredentials);
        }
        let Ok(email) = EmailAddress::new(email) else {
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::info!("sign-in rejected: unknown email");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        if !user.can_sign_in() {
            tracing::info!(user_id = %user.id(), "sign-in rejected: account disabled");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        if !self
            .password_hasher
            .verify_password(password, user.password_hash())?
        {
            tracing::info!(user_id = %user.id(), "sign-in rejected: wrong password");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let session = self.sessions.issue(issuer, Some(user.id()))?;
        tracing::info!(user_id = %user.id(), "user signed in");

        Ok(LoginOutcome::SignedIn { session, user })
    }

    /// Issues an anonymous session that replaces the current one.
    pub fn logout(&self, issuer: &str) -> AppResult<IssuedSession> {
        self.sessions.issue(issuer, None)
    }

    /// Resolves the session of a request from its cookie token.
    ///
    /// Lookup failures degrade to an anonymous session instead of failing
    /// the request.
    pub async fn resolve(&self, token: &str) -> Option<ResolvedSession> {
        let data = self.sessions.parse(token)?;

        let user = match data.user_id() {
            Some(user_id) => match self.users.find_by_id(user_id).await {
                Ok(user) => user.filter(AdminUser::can_sign_in),
                Err(error) => {
                    tracing::warn!(user_id = %user_id, error = %error, "session user lookup failed");
                    None
                }
            },
            None => None,
        };

        Some(ResolvedSession { data, user })
    }
}
