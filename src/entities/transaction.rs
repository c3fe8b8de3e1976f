//! Transaction entity - Every dated income, expense and debt payment.
//!
//! Amounts are always positive; the direction is carried by `transaction_type`
//! (`"income"`, `"expense"` or `"debt_payment"`). `category_id` is only set for
//! expenses and `debt_id` only for debt payments.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner who recorded the transaction
    pub owner_id: String,
    /// Month the transaction was recorded against, from `date` at creation time
    pub month_id: i64,
    /// Positive transaction amount
    pub amount: f64,
    /// Free text description
    pub description: String,
    /// Type of transaction: `"income"`, `"expense"` or `"debt_payment"`
    pub transaction_type: String,
    /// Calendar date the transaction happened on
    pub date: Date,
    /// Category for expenses, `None` when uncategorized
    pub category_id: Option<i64>,
    /// Debt being paid, set only for debt payments
    pub debt_id: Option<i64>,
    /// When the row was written, used as the ordering tie-breaker
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one month
    #[sea_orm(
        belongs_to = "super::month::Entity",
        from = "Column::MonthId",
        to = "super::month::Column::Id"
    )]
    Month,
    /// An expense may belong to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// A debt payment belongs to one debt
    #[sea_orm(
        belongs_to = "super::debt::Entity",
        from = "Column::DebtId",
        to = "super::debt::Column::Id"
    )]
    Debt,
}

impl Related<super::month::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Month.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::debt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
