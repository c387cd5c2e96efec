//! Transaction primitives.
//!
//! A `Transaction` is a dated amount owned by a user. Its kind is copied from
//! its category on every write and never supplied by the caller.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, categories};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Minor units, always > 0. The kind carries the direction.
    pub amount: i64,
    pub description: String,
    pub category_id: Uuid,
    /// Resolved on read. `None` when the row was loaded without the join.
    pub category: Option<Category>,
    /// Calendar date chosen by the user.
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub created_by: Uuid,
    /// System insertion time, used only to order transactions within a date.
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount: i64,
    pub description: String,
    pub category_id: Uuid,
    pub date: Date,
    pub kind: String,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            amount: ActiveValue::Set(tx.amount),
            description: ActiveValue::Set(tx.description.clone()),
            category_id: ActiveValue::Set(tx.category_id),
            date: ActiveValue::Set(tx.date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            created_by: ActiveValue::Set(tx.created_by),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            amount: model.amount,
            description: model.description,
            category_id: model.category_id,
            category: None,
            date: model.date,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

impl Transaction {
    /// Builds a transaction from a row joined with its category.
    pub(crate) fn with_category(
        model: Model,
        category: Option<categories::Model>,
    ) -> ResultEngine<Self> {
        let mut tx = Self::try_from(model)?;
        tx.category = category.map(Category::try_from).transpose()?;
        Ok(tx)
    }
}
