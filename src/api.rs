//! JSON response envelope
//!
//! Every response body is `{ "msg": <payload or null>, "err": <message or ""> }`.
//! [`Reply`] pairs the body with an HTTP status picked from the error kind.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub msg: Option<T>,
    pub err: String,
}

impl<T> Envelope<T> {
    pub fn success(msg: T) -> Self {
        Self {
            msg: Some(msg),
            err: String::new(),
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            msg: None,
            err: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.err.is_empty()
    }
}

/// A response status and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply<T> {
    pub status: u16,
    pub body: Envelope<T>,
}

impl<T> From<Result<T>> for Reply<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(msg) => Self {
                status: 200,
                body: Envelope::success(msg),
            },
            Err(err) => Self {
                status: err.status_code(),
                body: Envelope::failure(&err),
            },
        }
    }
}
