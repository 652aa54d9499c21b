use chrono::{Duration, Local};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::SESSION_LIFETIME_HOURS;
use crate::error::{Error, HttpError};
use crate::schema::{User, UserRole, Uuid};

use super::permissions::ActionType;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Uuid,
    pub email: String,
    pub user_uid: UserRole,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Uuid, email: String, uid: UserRole) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp();

        Self {
            user_id: id,
            email,
            user_uid: uid,
            iat,
            exp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: Uuid,
    pub email: String,
    pub user_uid: UserRole,
    pub is_admin: bool,
}

impl SessionData {
    pub fn authenticate(&self, action: ActionType) -> Result<(), Error> {
        if !action.authenticate(self) {
            return Err(
                HttpError::Unauthorized.new("You don't have permission to perform this action")
            );
        }
        Ok(())
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            email: value.email,
            is_admin: value.user_uid == UserRole::Admin,
            user_uid: value.user_uid,
        }
    }
}

fn session_key() -> Result<Hmac<Sha256>, Error> {
    let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
        log::warn!("SESSION_SECRET not set, using an insecure development secret");
        String::from("insecure-dev-secret")
    });

    Hmac::new_from_slice(secret.as_bytes())
        .map_err(|_| HttpError::InternalServerError.new("Invalid session secret"))
}

pub fn generate_jwt_session(user: &User) -> Result<String, Error> {
    let key = session_key()?;
    let claims = JwtSessionData::new(user.id, user.email.to_owned(), user.uid.to_owned());

    claims
        .sign_with_key(&key)
        .map_err(|_| HttpError::InternalServerError.new("Failed to sign session"))
}

pub fn verify_jwt_session(token: String) -> Result<JwtSessionData, Error> {
    let key = session_key()?;

    token
        .verify_with_key(&key)
        .map_err(|_| HttpError::InvalidSession.new("Invalid session; Invalid token"))
        .map(|session: JwtSessionData| {
            let now = Local::now().timestamp();

            if (session.exp - now).is_negative() {
                return Err(HttpError::InvalidSession.new("Invalid session; Token expired"));
            }
            Ok(session)
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            password: "hash".to_string(),
            uid: UserRole::User,
            is_active: true,
        }
    }

    #[test]
    fn session_round_trip() {
        let token = generate_jwt_session(&sample_user()).unwrap();
        let session = verify_jwt_session(token).unwrap();

        assert_eq!(session.user_id, 1);
        assert_eq!(session.email, "user@example.com");
        assert_eq!(session.user_uid, UserRole::User);
    }

    #[test]
    fn expired_session_is_rejected() {
        let now = Local::now().timestamp();
        let claims = JwtSessionData {
            user_id: 1,
            email: "user@example.com".to_string(),
            user_uid: UserRole::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = claims.sign_with_key(&session_key().unwrap()).unwrap();

        let error = verify_jwt_session(token).unwrap_err();
        assert_eq!(error.code, 401);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = generate_jwt_session(&sample_user()).unwrap();
        let tampered = format!("{token}x");

        assert!(verify_jwt_session(tampered).is_err());
    }

    #[test]
    fn admin_flag_from_role() {
        let claims = JwtSessionData::new(2, "admin@example.com".to_string(), UserRole::Admin);
        let session: SessionData = claims.into();

        assert!(session.is_admin);
    }
}
