//! Password hashing and token authentication.
//!
//! Each user holds at most one token. Logging in returns the existing token
//! or mints a new one; logging out deletes it.

use crate::constants::AUTH_TOKEN_LENGTH;
use crate::orm::{auth_tokens, users};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};

/// Header scheme expected in `Authorization: Token <key>`.
pub const TOKEN_SCHEME: &str = "Token";

pub fn get_argon2() -> Argon2<'static> {
    Argon2::default()
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(get_argon2()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Returns false for a wrong password as well as for an unreadable hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("unreadable password hash: {}", e);
            false
        }
    }
}

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns the user's token, creating it on first login.
pub async fn issue_token<C>(db: &C, user_id: i32) -> Result<String, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(existing) = auth_tokens::Entity::find()
        .filter(auth_tokens::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing.key);
    }

    let token = auth_tokens::ActiveModel {
        key: Set(generate_key()),
        user_id: Set(user_id),
        created_at: Set(Utc::now().naive_utc()),
    };
    let token = token.insert(db).await?;
    log::debug!("issued auth token for user_id={}", user_id);
    Ok(token.key)
}

pub async fn revoke_token<C>(db: &C, user_id: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    auth_tokens::Entity::delete_many()
        .filter(auth_tokens::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Resolves a token key to its user.
pub async fn authenticate_token<C>(db: &C, key: &str) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let found = auth_tokens::Entity::find_by_id(key.to_owned())
        .find_also_related(users::Entity)
        .one(db)
        .await?;
    Ok(found.and_then(|(_, user)| user))
}

/// Extracts the key from an `Authorization` header value.
///
/// Returns `None` when the header uses another scheme or is malformed.
pub fn parse_authorization(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let key = parts.next()?;
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) || parts.next().is_some() {
        return None;
    }
    Some(key)
}

/// Checks an email/password pair against the stored hash.
pub async fn check_credentials<C>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;

    Ok(user.filter(|u| verify_password(password, &u.password)))
}
