//! Database configuration module for the ledger store.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint the entities cannot
//! express, a single month row per owner and calendar month, is added as a unique index.

use crate::entities::{Category, Debt, Month, SavingsGoal, Transaction, month};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

/// Fallback database location when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/notepad_budget.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all ledger tables if they do not exist yet.
///
/// Tables are created parents first (months, categories, debts) so that the
/// foreign keys declared by transactions resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Month).await?;
    create_table_for(db, &schema, Category).await?;
    create_table_for(db, &schema, Debt).await?;
    create_table_for(db, &schema, SavingsGoal).await?;
    create_table_for(db, &schema, Transaction).await?;

    let month_index = Index::create()
        .name("idx_months_owner_month")
        .table(Month)
        .col(month::Column::OwnerId)
        .col(month::Column::Month)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&month_index)).await?;

    Ok(())
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}
