use crate::auth::{hash_password, verify_password};
use crate::constants::{
    AVATAR_IMAGE_PREFIX, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, RESERVED_USERNAME,
};
use crate::error::ApiError;
use crate::image::{media_url, save_data_uri};
use crate::orm::users;
use crate::storage::StorageBackend;
use crate::subscriptions;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Letters, digits and `@ . + - _`.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value == RESERVED_USERNAME {
        let mut err = ValidationError::new("reserved_username");
        err.message = Some(Cow::from(format!(
            "Username \"{}\" is not allowed.",
            RESERVED_USERNAME
        )));
        return Err(err);
    }
    if !USERNAME_RE.is_match(value) {
        let mut err = ValidationError::new("invalid_username");
        err.message = Some(Cow::from(
            "Username may contain only letters, digits and @/./+/-/_ characters.",
        ));
        return Err(err);
    }
    Ok(())
}

/// Public representation of a user.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl Profile {
    pub fn from_model(user: &users::Model, is_subscribed: bool) -> Self {
        Self {
            email: user.email.to_owned(),
            id: user.id,
            username: user.username.to_owned(),
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            is_subscribed,
            avatar: user.avatar.as_deref().map(media_url),
        }
    }

    /// Builds the profile as seen by `viewer_id`.
    pub async fn load<C>(db: &C, user: &users::Model, viewer_id: Option<i32>) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let is_subscribed = match viewer_id {
            Some(viewer_id) => subscriptions::is_subscribed(db, viewer_id, user.id).await?,
            None => false,
        };
        Ok(Self::from_model(user, is_subscribed))
    }
}

/// Representation returned by registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<users::Model> for RegisteredUser {
    fn from(user: users::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(email, length(max = "MAX_EMAIL_LENGTH"))]
    pub email: String,
    #[validate(length(min = 1, max = "MAX_NAME_LENGTH"), custom = "validate_username")]
    pub username: String,
    #[validate(length(min = 1, max = "MAX_NAME_LENGTH"))]
    pub first_name: String,
    #[validate(length(min = 1, max = "MAX_NAME_LENGTH"))]
    pub last_name: String,
    #[validate(length(min = 8, max = 1000))]
    pub password: String,
}

/// Creates a user after validating the form and uniqueness of email/username.
pub async fn register<C>(db: &C, form: RegistrationForm) -> Result<users::Model, ApiError>
where
    C: ConnectionTrait,
{
    form.validate()?;

    let username = form.username.trim().to_owned();
    let email = form.email.trim().to_lowercase();

    if users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::field("email", "A user with that email already exists."));
    }
    if users::Entity::find()
        .filter(users::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::field(
            "username",
            "A user with that username already exists.",
        ));
    }

    let password = hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to create user".to_owned())
    })?;

    let user = users::ActiveModel {
        email: Set(email),
        username: Set(username),
        first_name: Set(form.first_name.trim().to_owned()),
        last_name: Set(form.last_name.trim().to_owned()),
        password: Set(password),
        avatar: Set(None),
        is_staff: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    // Concurrent registrations with the same name race past the lookups above.
    let user = user.insert(db).await.map_err(|e| {
        if crate::error::is_unique_violation(&e) {
            ApiError::non_field("A user with that email or username already exists.")
        } else {
            e.into()
        }
    })?;

    log::info!("New user registered: {} (user_id: {})", user.username, user.id);
    Ok(user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordForm {
    #[validate(length(min = 8, max = 1000))]
    pub new_password: String,
    pub current_password: String,
}

pub async fn set_password<C>(db: &C, user: &users::Model, form: PasswordForm) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    form.validate()?;

    if !verify_password(&form.current_password, &user.password) {
        return Err(ApiError::field("current_password", "Wrong password."));
    }

    let password = hash_password(&form.new_password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to change password".to_owned())
    })?;

    let mut active: users::ActiveModel = user.clone().into();
    active.password = Set(password);
    active.update(db).await?;

    log::info!("Password changed for user_id={}", user.id);
    Ok(())
}

/// Stores the avatar and returns its public URL.
pub async fn set_avatar<C>(
    db: &C,
    storage: &dyn StorageBackend,
    user: &users::Model,
    data_uri: &str,
) -> Result<String, ApiError>
where
    C: ConnectionTrait,
{
    let key = save_data_uri(storage, "avatar", AVATAR_IMAGE_PREFIX, data_uri).await?;

    let mut active: users::ActiveModel = user.clone().into();
    active.avatar = Set(Some(key.to_owned()));
    active.update(db).await?;

    Ok(media_url(&key))
}

/// Detaches the avatar. The stored file is left in place since identical
/// images share one key.
pub async fn clear_avatar<C>(db: &C, user: &users::Model) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    let mut active: users::ActiveModel = user.clone().into();
    active.avatar = Set(None);
    active.update(db).await?;
    Ok(())
}

pub async fn get_user<C>(db: &C, user_id: i32) -> Result<users::Model, ApiError>
where
    C: ConnectionTrait,
{
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

/// Returns a page of users ordered by username, with the total count.
pub async fn list_users<C>(db: &C, limit: u64, offset: u64) -> Result<(Vec<users::Model>, u64), DbErr>
where
    C: ConnectionTrait,
{
    let count = users::Entity::find().count(db).await? as u64;
    let rows = users::Entity::find()
        .order_by_asc(users::Column::Username)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;
    Ok((rows, count))
}
