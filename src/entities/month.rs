//! Month entity - One budgeting period per owner and calendar month.
//!
//! The `month` column always holds the first day of the calendar month. A unique
//! index on `(owner_id, month)` is created alongside the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Month database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "months")]
pub struct Model {
    /// Unique identifier for the month row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this month belongs to
    pub owner_id: String,
    /// First day of the calendar month (`YYYY-MM-01`)
    pub month: Date,
    /// Manually entered base income
    pub income: f64,
    /// Cash carried over from the previous month, may be negative
    pub rollover: f64,
    /// Lifecycle status: `"active"` or `"closed"`
    pub status: String,
}

/// Defines relationships between Month and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One month has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
