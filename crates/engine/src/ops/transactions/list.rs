//! Listing a user's transactions as date groups with running totals.
//!
//! The whole matching set is loaded with one query, then totalled and
//! grouped in memory.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    ResultEngine, Transaction, TransactionKind, categories, transactions,
    util::{clean_input, parse_calendar_date},
};

use super::super::Engine;

/// Date bounds of a list request after input cleaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateRange {
    /// No complete pair of bounds was given: nothing is filtered out.
    All,
    /// Inclusive on both ends.
    Between { start: NaiveDate, end: NaiveDate },
    /// Both bounds were given but one of them is unreadable: nothing matches.
    Empty,
}

impl DateRange {
    /// Builds a range from raw query values.
    ///
    /// A single bound on its own disables filtering. Malformed dates are not an
    /// error; they produce a range that matches nothing.
    pub fn from_query(start: Option<&str>, end: Option<&str>) -> Self {
        let (Some(start), Some(end)) = (clean_input(start), clean_input(end)) else {
            return Self::All;
        };

        match (parse_calendar_date(&start), parse_calendar_date(&end)) {
            (Some(start), Some(end)) => Self::Between { start, end },
            _ => {
                tracing::debug!(%start, %end, "unreadable date bounds, matching nothing");
                Self::Empty
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::All => true,
            Self::Between { start, end } => start <= date && date <= end,
            Self::Empty => false,
        }
    }
}

/// Income and expense sums over a set of transactions, in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: i64,
    pub expense: i64,
}

impl Totals {
    pub fn add(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionKind::Income => self.income = self.income.saturating_add(tx.amount),
            TransactionKind::Expense => self.expense = self.expense.saturating_add(tx.amount),
        }
    }

    pub fn remaining_balance(&self) -> i64 {
        self.income.saturating_sub(self.expense)
    }
}

impl<'a> FromIterator<&'a Transaction> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a Transaction>>(iter: I) -> Self {
        let mut totals = Self::default();
        for tx in iter {
            totals.add(tx);
        }
        totals
    }
}

/// All transactions sharing one calendar date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateGroup {
    pub date: NaiveDate,
    /// Most recently created first.
    pub transactions: Vec<Transaction>,
}

/// Buckets transactions by date, newest date first.
///
/// Inside a bucket the order is by creation time, newest first, with the id
/// as a final tie-break so equal timestamps still sort deterministically.
pub fn group_by_date(transactions: Vec<Transaction>) -> Vec<DateGroup> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for tx in transactions {
        buckets.entry(tx.date).or_default().push(tx);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, mut transactions)| {
            transactions.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            DateGroup { date, transactions }
        })
        .collect()
}

/// Grouped transactions plus the totals computed over the same set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionListSummary {
    pub list_group: Vec<DateGroup>,
    pub total_income: i64,
    pub total_expense: i64,
    pub remaining_balance: i64,
}

impl TransactionListSummary {
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let totals: Totals = transactions.iter().collect();
        Self {
            list_group: group_by_date(transactions),
            total_income: totals.income,
            total_expense: totals.expense,
            remaining_balance: totals.remaining_balance(),
        }
    }
}

impl Engine {
    /// Lists every transaction the user owns inside `range`, grouped by date,
    /// with income/expense totals.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> ResultEngine<TransactionListSummary> {
        let transactions = self.fetch_transactions(user_id, range).await?;
        let summary = TransactionListSummary::from_transactions(transactions);

        tracing::debug!(
            %user_id,
            groups = summary.list_group.len(),
            total_income = summary.total_income,
            total_expense = summary.total_expense,
            "listed transactions"
        );
        Ok(summary)
    }

    /// Loads the user's transactions in `range` with their categories joined.
    async fn fetch_transactions(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .find_also_related(categories::Entity)
            .filter(transactions::Column::CreatedBy.eq(user_id));

        match range {
            DateRange::All => {}
            DateRange::Between { start, end } => {
                query = query
                    .filter(transactions::Column::Date.gte(start))
                    .filter(transactions::Column::Date.lte(end));
            }
            DateRange::Empty => return Ok(Vec::new()),
        }

        let rows: Vec<(transactions::Model, Option<categories::Model>)> =
            query.all(&self.database).await?;

        rows.into_iter()
            .map(|(tx_model, category)| Transaction::with_category(tx_model, category))
            .collect()
    }
}
