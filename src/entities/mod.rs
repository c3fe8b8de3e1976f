//! Entity module - Contains all SeaORM entity definitions for the ledger store.
//! These entities represent the database tables and their relationships.
//! Every table is scoped per owner through its `owner_id` column.

pub mod category;
pub mod debt;
pub mod month;
pub mod savings_goal;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use debt::{Column as DebtColumn, Entity as Debt, Model as DebtModel};
pub use month::{Column as MonthColumn, Entity as Month, Model as MonthModel};
pub use savings_goal::{
    Column as SavingsGoalColumn, Entity as SavingsGoal, Model as SavingsGoalModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
