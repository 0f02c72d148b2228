// SPDX-License-Identifier: MPL-2.0

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Missing token")]
    Missing,
    #[error("Invalid token")]
    Invalid,
}

/// The authenticated identity behind a request.
/// Passed explicitly to whatever needs it; there is no ambient session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
}

/// Resolves bearer tokens to callers.
/// Tokens are issued elsewhere; this only checks them against a known table.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    tokens: HashMap<String, i64>,
}

impl Authenticator {
    pub fn new(tokens: HashMap<String, i64>) -> Self {
        Self { tokens }
    }

    /// Identify the caller from an `Authorization` header value.
    ///
    /// No header (or not a bearer header) is anonymous; a bearer token that
    /// is not recognized is an error even where anonymous access is allowed.
    pub fn identify(&self, authorization: Option<&str>) -> Result<Option<Caller>, SessionError> {
        let Some(token) = authorization.and_then(|h| h.strip_prefix("Bearer ")) else {
            return Ok(None);
        };

        self.tokens
            .get(token.trim())
            .map(|&user_id| Some(Caller { user_id }))
            .ok_or(SessionError::Invalid)
    }

    /// Like [`identify`](Self::identify), but anonymous callers are rejected
    pub fn require(&self, authorization: Option<&str>) -> Result<Caller, SessionError> {
        self.identify(authorization)?.ok_or(SessionError::Missing)
    }
}
