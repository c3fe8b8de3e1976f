//! Category entity - Spending categories and their commitment configuration.
//!
//! The storage layout keeps the legacy `is_commitment` flag next to
//! `commitment_type` so older rows stay readable. Code outside the store
//! boundary works with `core::category::Commitment` instead of these columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this category belongs to
    pub owner_id: String,
    /// Display name (e.g. "Rent", "Groceries")
    pub name: String,
    /// `None` for standard categories, `"fixed"` or `"variable_fixed"` for commitments
    pub commitment_type: Option<String>,
    /// Legacy commitment flag, kept equal to `commitment_type.is_some()`
    pub is_commitment: bool,
    /// Monthly budget reserved for commitment categories
    pub budget_limit: Option<f64>,
    /// Whether the category shows up in the envelope tracker
    pub is_pinned: bool,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
