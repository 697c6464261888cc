use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::seat::SeatingPlan;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

// Top-level configuration, assembled from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub seating: SeatingPlan,
    pub admin: Option<AdminAccount>,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub bcrypt_cost: u32,
}

// Account created on startup when both variables are present
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = SeatingPlan::default();
        let seating = SeatingPlan {
            rows: parse_or("SEAT_ROWS", defaults.rows)?,
            columns: parse_or("SEAT_COLUMNS", defaults.columns)?,
            premium_from_row: parse_or("PREMIUM_ROW_FROM", defaults.premium_from_row)?,
            premium_surcharge: parse_or::<Decimal>("PREMIUM_SURCHARGE", defaults.premium_surcharge)?,
        };
        if seating.rows == 0 || seating.rows > 26 || seating.columns == 0 {
            return Err(ConfigError::Invalid {
                name: "SEAT_ROWS/SEAT_COLUMNS",
                value: format!("{}x{}", seating.rows, seating.columns),
            });
        }

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminAccount { username, password }),
            _ => None,
        };

        Ok(Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://cinema.db".to_string()),
                max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
                jwt_expires_in_hours: parse_or("JWT_EXPIRES_IN_HOURS", 24)?,
                bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
            seating,
            admin,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "cinema_booking=info".to_string()),
        })
    }

    /// The HTTP server refuses to sign tokens with an empty secret.
    pub fn require_jwt_secret(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        Ok(())
    }
}
