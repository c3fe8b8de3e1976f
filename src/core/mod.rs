//! Core business logic - framework-agnostic budgeting operations.
//!
//! Pure calculations (classification, aggregation, envelope status) work on
//! entity models in memory. Store-facing functions take a `SeaORM` connection
//! and are scoped by owner id.

/// Transaction aggregation and the Safe-to-Spend formula
pub mod aggregate;
/// Categories and their commitment classification
pub mod category;
/// Transaction types and classification rules
pub mod classify;
/// Debts and debt payments
pub mod debt;
/// Pinned budget envelope tracking
pub mod envelope;
/// Month records and the close-month lifecycle
pub mod monthly;
/// Dashboard assembly and text formatting
pub mod report;
/// Savings goals and contributions
pub mod savings;
/// Transaction creation, editing and queries
pub mod transaction;
/// Input validation shared by every write path
pub mod validation;
