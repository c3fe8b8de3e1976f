//! Debt entity - Outstanding balances paid down by debt payment transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Debt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    /// Unique identifier for the debt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this debt belongs to
    pub owner_id: String,
    /// Display name (e.g. "Car Loan")
    pub name: String,
    /// Outstanding balance; not clamped, goes negative when overpaid
    pub total_balance: f64,
    /// Annual interest rate in percent, informational only
    pub interest_rate: f64,
}

/// Defines relationships between Debt and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One debt has many payment transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
