/// Database connection and table creation
pub mod database;

/// Owner identity from environment variables
pub mod owner;

/// Budget settings and initial categories from config.toml
pub mod settings;
