use sqlx::{Pool, Postgres};

use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        jwt::generate_jwt_session,
    },
    error::{Error, HttpError, QueryError},
    form::{Credentials, NewUser, UserPatch},
    schema::{User, Uuid},
};

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Creates a user with a hashed password. Duplicate emails are a
/// validation error, not a conflict leak: the row simply is not created.
pub async fn register_user(form: &NewUser, pool: &Pool<Postgres>) -> Result<Uuid, Error> {
    form.validate().map_err(Error::from)?;

    let hash = hash_password(&form.password)
        .map_err(|_| HttpError::InternalServerError.new("Failed to hash password"))?;

    let row: Option<(i32,)> = sqlx::query_as(
        "
        INSERT INTO users (email, name, password)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING RETURNING id;
    ",
    )
    .bind(&form.email)
    .bind(&form.name)
    .bind(hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    match row {
        Some(id) => Ok(id.0),
        None => Err(HttpError::InvalidRequest.new("Email is already registered")),
    }
}

/// Verifies credentials and returns a signed session token. Unknown email
/// and wrong password are indistinguishable to the caller.
pub async fn login_user(credentials: &Credentials, pool: &Pool<Postgres>) -> Result<String, Error> {
    let user = match get_user_by_email(pool, &credentials.email).await? {
        Some(user) => user,
        None => return Err(HttpError::Unauthorized.new("Invalid credentials")),
    };

    if !user.is_active {
        return Err(HttpError::Unauthorized.new("Invalid credentials"));
    }

    let authenticated = verify_password(&credentials.password, &user.password)
        .map_err(|_| HttpError::InternalServerError.new("Failed to verify password"))?;
    if !authenticated {
        return Err(HttpError::Unauthorized.new("Invalid credentials"));
    }

    generate_jwt_session(&user)
}

pub async fn update_user_profile(
    user_id: Uuid,
    patch: &UserPatch,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    patch.validate().map_err(Error::from)?;

    let hash = match &patch.password {
        Some(password) => Some(
            hash_password(password)
                .map_err(|_| HttpError::InternalServerError.new("Failed to hash password"))?,
        ),
        None => None,
    };

    sqlx::query(
        "
        UPDATE users SET
        name = COALESCE($1, name),
        password = COALESCE($2, password)
        WHERE id = $3
    ",
    )
    .bind(&patch.name)
    .bind(hash)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}
