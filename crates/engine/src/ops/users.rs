use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, UpdateUserCmd, User, categories, password::PasswordHash,
    transactions, users, util::normalize_required_name,
};

use super::{Engine, with_tx};

/// Fails with `ExistingKey` if another user already has `username`.
async fn ensure_username_available<C: ConnectionTrait>(
    db: &C,
    username: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
    if let Some(user_id) = except {
        query = query.filter(users::Column::Id.ne(user_id));
    }
    if query.one(db).await?.is_some() {
        return Err(EngineError::ExistingKey(username.to_string()));
    }
    Ok(())
}

impl Engine {
    /// Registers a new user and returns it.
    ///
    /// Usernames are trimmed and must be unique.
    pub async fn register_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_required_name(username, "user")?;
        let hash = PasswordHash::new_blocking(password, self.password_cost).await?;

        with_tx!(self, |db_tx| {
            ensure_username_available(&db_tx, &username, None).await?;

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                username: ActiveValue::Set(username),
                password_hash: ActiveValue::Set(hash.into_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(user_id = %model.id, "registered user");
            Ok(User::from(model))
        })
    }

    /// Checks credentials and returns the matching user.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;

        let stored = PasswordHash::from_stored(model.password_hash.clone());
        if !stored.verify_blocking(password).await? {
            return Err(EngineError::InvalidCredentials);
        }

        Ok(User::from(model))
    }

    /// Changes the username and/or the password of a user.
    ///
    /// A new password is re-hashed with the engine's cost.
    pub async fn update_user(&self, cmd: UpdateUserCmd) -> ResultEngine<User> {
        let username = cmd
            .username
            .as_deref()
            .map(|name| normalize_required_name(name, "user"))
            .transpose()?;
        let hash = match cmd.password.as_deref() {
            Some(password) => {
                Some(PasswordHash::new_blocking(password, self.password_cost).await?)
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(cmd.user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let current = model.clone();
            let mut active: users::ActiveModel = model.into();
            if let Some(username) = username {
                ensure_username_available(&db_tx, &username, Some(cmd.user_id)).await?;
                active.username = ActiveValue::Set(username);
            }
            if let Some(hash) = hash {
                active.password_hash = ActiveValue::Set(hash.into_string());
            }
            let updated = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                current
            };

            tracing::info!(user_id = %updated.id, "updated user");
            Ok(User::from(updated))
        })
    }

    /// Deletes a user together with every category and transaction they own.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::CreatedBy.eq(user_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_many()
                .filter(categories::Column::CreatedBy.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(
                %user_id,
                transactions = removed.rows_affected,
                "deleted user"
            );
            Ok(User::from(model))
        })
    }
}
