use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, Transaction, TransactionCmd, TransactionKind,
    UpdateTransactionCmd, categories, transactions, util::clean_input,
};

use super::super::{Engine, categories::owned_category, with_tx};

fn validate_amount(amount: i64) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    Ok(())
}

/// Resolves the category a write refers to and returns its kind.
async fn category_for_write<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<(categories::Model, TransactionKind)> {
    let model = owned_category(db, user_id, category_id)
        .await?
        .ok_or_else(|| EngineError::CategoryNotFound(category_id.to_string()))?;
    let kind = TransactionKind::try_from(model.kind.as_str())?;
    Ok((model, kind))
}

async fn owned_transaction<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    transaction_id: Uuid,
) -> ResultEngine<(transactions::Model, Option<categories::Model>)> {
    transactions::Entity::find_by_id(transaction_id)
        .find_also_related(categories::Entity)
        .filter(transactions::Column::CreatedBy.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
}

impl Engine {
    /// Records a new transaction. Its kind is copied from the category.
    pub async fn create_transaction(&self, cmd: TransactionCmd) -> ResultEngine<Transaction> {
        validate_amount(cmd.amount)?;
        let description = clean_input(cmd.description.as_deref()).unwrap_or_default();

        with_tx!(self, |db_tx| {
            let (category, kind) =
                category_for_write(&db_tx, cmd.user_id, cmd.category_id).await?;

            let mut tx = Transaction {
                id: Uuid::new_v4(),
                amount: cmd.amount,
                description,
                category_id: category.id,
                category: None,
                date: cmd.date,
                kind,
                created_by: cmd.user_id,
                created_at: Utc::now(),
            };
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            tx.category = Some(Category::try_from(category)?);

            tracing::debug!(transaction_id = %tx.id, kind = kind.as_str(), "created transaction");
            Ok(tx)
        })
    }

    /// Returns a single transaction owned by the user, with its category.
    pub async fn transaction_detail(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let (model, category) = owned_transaction(&self.database, user_id, transaction_id).await?;
        Transaction::with_category(model, category)
    }

    /// Replaces amount, description, category and date of a transaction.
    ///
    /// The kind is re-derived from the new category.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        validate_amount(cmd.amount)?;
        let description = clean_input(Some(&cmd.description)).unwrap_or_default();

        with_tx!(self, |db_tx| {
            let (model, _) = owned_transaction(&db_tx, cmd.user_id, cmd.transaction_id).await?;
            let (category, kind) =
                category_for_write(&db_tx, cmd.user_id, cmd.category_id).await?;

            let mut active: transactions::ActiveModel = model.into();
            active.amount = ActiveValue::Set(cmd.amount);
            active.description = ActiveValue::Set(description);
            active.category_id = ActiveValue::Set(category.id);
            active.date = ActiveValue::Set(cmd.date);
            active.kind = ActiveValue::Set(kind.as_str().to_string());
            let updated = active.update(&db_tx).await?;

            tracing::debug!(transaction_id = %updated.id, "updated transaction");
            Transaction::with_category(updated, Some(category))
        })
    }

    /// Deletes a transaction owned by the user and returns it.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let (model, category) = owned_transaction(&db_tx, user_id, transaction_id).await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(%transaction_id, "deleted transaction");
            Transaction::with_category(model, category)
        })
    }
}
