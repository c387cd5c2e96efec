//! Domain core of the finance tracker: users, categories and transactions
//! persisted through sea-orm, plus the grouped transaction listing.

pub use categories::Category;
pub use commands::{
    CategoryCmd, TransactionCmd, UpdateCategoryCmd, UpdateTransactionCmd, UpdateUserCmd,
};
pub use error::EngineError;
pub use ops::{
    DateGroup, DateRange, Engine, EngineBuilder, Totals, TransactionListSummary, group_by_date,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
pub use util::parse_calendar_date;

mod categories;
mod commands;
mod error;
mod ops;
mod password;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
