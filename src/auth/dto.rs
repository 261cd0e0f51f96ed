use serde::{Deserialize, Serialize};

use crate::extract::Validate;

/// Request body for login. No `Debug`: it holds the plaintext password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username is required".into());
        }
        if self.password.is_empty() {
            return Err("password is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_in: u64, // seconds
    pub user: UserSummary,
}

/// Non-sensitive view of the logged-in user.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub fullname: String,
    pub username: String,
}
