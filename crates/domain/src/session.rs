use backoffice_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};

/// State carried by the signed session cookie.
///
/// There is no server-side session store: the token holding this value is
/// the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    xsrf_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
}

impl SessionData {
    /// Creates session data from an anti-forgery token and optional user.
    pub fn new(xsrf_token: impl Into<String>, user_id: Option<UserId>) -> AppResult<Self> {
        let xsrf_token = xsrf_token.into();
        if xsrf_token.trim().is_empty() {
            return Err(AppError::Validation(
                "xsrf token must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            xsrf_token,
            user_id,
        })
    }

    /// Returns the anti-forgery token mirrored into the readable cookie.
    #[must_use]
    pub fn xsrf_token(&self) -> &str {
        self.xsrf_token.as_str()
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns whether the session belongs to a signed-in user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}
