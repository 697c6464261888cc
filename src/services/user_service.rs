use crate::config::AuthConfig;
use crate::models::user::{Role, User, UserLoginRequest, UserLoginResponse, UserRegistrationRequest};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        UserService::with_cost(pool, DEFAULT_COST)
    }

    pub fn with_cost(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        UserService { pool, bcrypt_cost }
    }

    // Register a new member account
    pub async fn register_user(&self, request: UserRegistrationRequest) -> AppResult<i64> {
        request.validate()?;

        self.insert_user(
            &request.username,
            &request.password,
            &request.first_name,
            &request.last_name,
            Role::Member,
        )
        .await
    }

    // Login user
    pub async fn login_user(
        &self,
        request: UserLoginRequest,
        auth: &AuthConfig,
    ) -> AppResult<UserLoginResponse> {
        let user = self
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        // Verify password
        let password_matches = verify(request.password.as_bytes(), &user.password_hash)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        let role = user.role();
        let token = jwt::generate_token(user.id, &user.username, role, auth)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        info!(user_id = user.id, %role, "User logged in");

        Ok(UserLoginResponse {
            token,
            user_id: user.id,
            role,
        })
    }

    /// Creates the bootstrap administrator unless the username already exists.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<i64> {
        if let Some(existing) = self.find_by_username(username).await? {
            return Ok(existing.id);
        }

        let user_id = self
            .insert_user(username, password, "Site", "Administrator", Role::Admin)
            .await?;
        info!(user_id, username, "Created administrator account");
        Ok(user_id)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, role
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(
        &self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> AppResult<i64> {
        let stored_role = match role {
            Role::Member | Role::Admin => role.to_string(),
            Role::Guest => {
                return Err(AppError::ValidationError("Guest accounts cannot be stored".into()));
            }
        };

        // Hash password
        let hashed_password = hash(password.as_bytes(), self.bcrypt_cost)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .bind(first_name)
        .bind(last_name)
        .bind(stored_role)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict("Username already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
