mod list;
mod write;

pub use list::{DateGroup, DateRange, Totals, TransactionListSummary, group_by_date};
