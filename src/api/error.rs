// SPDX-License-Identifier: MPL-2.0

use crate::api::Reply;
use crate::state::SessionError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Unauthorized(#[from] SessionError),
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::PayloadTooLarge => 413,
            ApiError::Store(e) if e.is_unavailable() => 503,
            ApiError::Store(_) | ApiError::Internal(_) => 500,
        }
    }

    pub fn into_reply(self) -> Reply {
        Reply {
            status: self.status(),
            body: serde_json::json!({ "message": self.to_string() }),
        }
    }
}
