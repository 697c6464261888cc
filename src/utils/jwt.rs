use crate::config::AuthConfig;
use crate::models::user::{Role, Session};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_okapi::request::OpenApiFromRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user_id
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, OpenApiFromRequest)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn session(&self) -> Session {
        Session::authenticated(self.user_id, self.username.clone(), self.role)
    }
}

pub fn generate_token(
    user_id: i64,
    username: &str,
    role: Role,
    auth: &AuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(auth.jwt_expires_in_hours))
        .timestamp()
        .max(0) as usize;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, auth: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = match request.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token,
                None => return Outcome::Error((Status::Unauthorized, ())),
            },
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let auth = match request.rocket().state::<AuthConfig>() {
            Some(auth) => auth,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        let claims = match decode_token(token, auth) {
            Ok(claims) => claims,
            Err(_) => return Outcome::Error((Status::Unauthorized, ())),
        };

        // Tokens are only ever issued to stored accounts
        if claims.role == Role::Guest {
            return Outcome::Error((Status::Unauthorized, ()));
        }

        Outcome::Success(AuthenticatedUser {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
