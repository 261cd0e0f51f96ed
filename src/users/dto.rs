use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::repo::User;
use crate::extract::{check_text, Validate};

/// Stands in for the password in every user payload we send back.
pub const PASSWORD_MASK: &str = "********";

const MAX_TEXT: usize = 100;
const MIN_PASSWORD: usize = 8;
const MAX_PASSWORD: usize = 72; // bcrypt only reads the first 72 bytes

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD {
        return Err(format!("password must be at least {MIN_PASSWORD} characters"));
    }
    if password.len() > MAX_PASSWORD {
        return Err(format!("password must be at most {MAX_PASSWORD} bytes"));
    }
    Ok(())
}

fn check_profile(
    firstname: &str,
    fullname: &str,
    lastname: &str,
    username: &str,
    status: &str,
) -> Result<(), String> {
    check_text("firstname", firstname, MAX_TEXT)?;
    check_text("fullname", fullname, MAX_TEXT)?;
    check_text("lastname", lastname, MAX_TEXT)?;
    if !is_valid_username(username) {
        return Err("username must be 3-50 letters, digits, '_', '.' or '-'".into());
    }
    check_text("status", status, MAX_TEXT)
}

/// Request body for `POST /users`. Holds a plaintext password, so no `Debug`.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub password: String,
    pub status: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        check_profile(
            &self.firstname,
            &self.fullname,
            &self.lastname,
            &self.username,
            &self.status,
        )?;
        check_password(&self.password)
    }
}

/// Request body for `PUT /users/:id`; omit `password` to keep the current one.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub status: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), String> {
        check_profile(
            &self.firstname,
            &self.fullname,
            &self.lastname,
            &self.username,
            &self.status,
        )?;
        match &self.password {
            Some(p) => check_password(p),
            None => Ok(()),
        }
    }
}

/// User as returned to clients, with the password masked.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub password: &'static str,
    pub status: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            firstname: u.firstname,
            fullname: u.fullname,
            lastname: u.lastname,
            username: u.username,
            password: PASSWORD_MASK,
            status: u.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
