use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::{Validate, ValidationError};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Role {
        // Only member and admin are ever written; anything else is treated as the least privileged account
        Role::from_str(&self.role).unwrap_or(Role::Member)
    }
}

/// Who is at the screen. Guests are never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, JsonSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Member,
    Admin,
}

/// Explicit session context handed to whatever acts on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: Option<i64>,
    username: String,
    role: Role,
}

impl Session {
    pub fn guest() -> Self {
        Session {
            user_id: None,
            username: "Guest".to_string(),
            role: Role::Guest,
        }
    }

    pub fn authenticated(user_id: i64, username: impl Into<String>, role: Role) -> Self {
        match role {
            Role::Guest => Session::guest(),
            Role::Member | Role::Admin => Session {
                user_id: Some(user_id),
                username: username.into(),
                role,
            },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The user bookings are recorded against, `None` for guests.
    pub fn booking_user(&self) -> Option<i64> {
        match self.role {
            Role::Guest => None,
            Role::Member | Role::Admin => self.user_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Guest | Role::Member => false,
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset")
            .with_message("Username can only contain letters, numbers and underscores".into()))
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    let checks: [(fn(&char) -> bool, &'static str); 3] = [
        (char::is_ascii_uppercase, "Password must contain at least one uppercase letter"),
        (char::is_ascii_lowercase, "Password must contain at least one lowercase letter"),
        (char::is_ascii_digit, "Password must contain at least one number"),
    ];
    for (check, message) in checks {
        if !password.chars().any(|c| check(&c)) {
            return Err(ValidationError::new("password_strength").with_message(message.into()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct UserRegistrationRequest {
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3 to 20 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "validate_password")
    )]
    pub password: String,
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UserLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserLoginResponse {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Serialize, JsonSchema)]
#[schemars(example = "RegisterResponse::example")]
pub struct RegisterResponse {
    #[schemars(title = "User ID")]
    pub user_id: i64,

    #[schemars(title = "Register Status")]
    pub status: String,
}

impl RegisterResponse {
    pub fn example() -> Self {
        Self {
            user_id: 123,
            status: "success".to_string(),
        }
    }
}
