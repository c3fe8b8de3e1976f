//! Savings goal entity - Targets that accumulate through contributions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this goal belongs to
    pub owner_id: String,
    /// Display name (e.g. "Emergency Fund")
    pub name: String,
    /// Amount the owner wants to reach
    pub target_amount: f64,
    /// Amount contributed so far
    pub current_amount: f64,
    /// Date the goal should be reached by
    pub target_date: Date,
}

/// `SavingsGoal` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
