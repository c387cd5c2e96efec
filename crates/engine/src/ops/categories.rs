use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryCmd, EngineError, ResultEngine, UpdateCategoryCmd, categories, transactions,
    util::{normalize_category_key, normalize_required_name},
};

use super::{Engine, with_tx};

/// Loads a category only if `user_id` owns it.
pub(super) async fn owned_category<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<Option<categories::Model>> {
    Ok(categories::Entity::find_by_id(category_id)
        .filter(categories::Column::CreatedBy.eq(user_id))
        .one(db)
        .await?)
}

async fn ensure_name_available<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    name_norm: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let mut query = categories::Entity::find()
        .filter(categories::Column::CreatedBy.eq(user_id))
        .filter(categories::Column::NameNorm.eq(name_norm));
    if let Some(id) = except {
        query = query.filter(categories::Column::Id.ne(id));
    }
    if let Some(existing) = query.one(db).await? {
        return Err(EngineError::ExistingKey(existing.name));
    }
    Ok(())
}

impl Engine {
    /// Creates a category for the user.
    ///
    /// Names are unique per user after case and accent folding.
    pub async fn create_category(&self, cmd: CategoryCmd) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "category")?;
        let name_norm = normalize_category_key(&name)?;

        with_tx!(self, |db_tx| {
            ensure_name_available(&db_tx, cmd.user_id, &name_norm, None).await?;

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                created_by: ActiveValue::Set(cmd.user_id),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            Category::try_from(model)
        })
    }

    /// Lists the user's categories ordered by name.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::CreatedBy.eq(user_id))
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    /// Returns a single category owned by the user.
    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        owned_category(&self.database, user_id, category_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
            .and_then(Category::try_from)
    }

    /// Renames and/or re-kinds a category.
    ///
    /// Transactions already written against it keep their kind.
    pub async fn update_category(&self, cmd: UpdateCategoryCmd) -> ResultEngine<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = owned_category(&db_tx, cmd.user_id, cmd.category_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            if name.is_none() && cmd.kind.is_none() {
                return Category::try_from(model);
            }

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                let name_norm = normalize_category_key(&name)?;
                ensure_name_available(&db_tx, cmd.user_id, &name_norm, Some(cmd.category_id))
                    .await?;
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }

            Category::try_from(active.update(&db_tx).await?)
        })
    }

    /// Deletes a category that no transaction references any more.
    pub async fn delete_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = owned_category(&db_tx, user_id, category_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            let used_by = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "category '{}' is used by {used_by} transactions",
                    model.name
                )));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Category::try_from(model)
        })
    }
}
