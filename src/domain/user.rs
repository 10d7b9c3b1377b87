//! User domain model
//!
//! The password hash never lives on [`User`]; only the store reads it.

use serde::{Deserialize, Serialize};

use super::id::validate_user_id;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub kor_name: String,
    pub name: String,
    pub team: String,
    pub role: String,
    pub email: String,
    pub phone_number: String,
    /// Free-form join date as entered by an administrator
    pub entry_date: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_user_id(&self.id)?;
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            return Err(Error::bad_request(format!("invalid email: {:?}", self.email)));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Per-user session state, kept apart from the profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub userid: String,
    /// Show the user last worked on; empty when none
    pub current_show: String,
}

impl UserConfig {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            current_show: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_user() {
        let mut user = User::new("kybin");
        assert!(user.validate().is_ok());

        user.email = "kybin@example.com".to_string();
        assert!(user.validate().is_ok());

        user.email = "not an email".to_string();
        assert!(user.validate().is_err());

        assert!(User::new("ky bin").validate().is_err());
        assert!(User::new("").validate().is_err());
    }
}
