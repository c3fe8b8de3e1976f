#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use notepad_budget::{
    config::{database, owner, settings},
    core::{category, monthly, report},
    errors::Result,
    service::BudgetService,
};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Settings are optional, a missing config.toml just skips seeding
    let config = settings::load_default_config()
        .inspect_err(|e| warn!("Using default settings: {}", e))
        .unwrap_or_default();

    // 4. Initialize database
    if env::var("DATABASE_URL").is_err() {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection().await?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let Some(owner_id) = owner::get_owner_id() else {
        warn!("{} is not set, nothing to show", owner::OWNER_ID_VAR);
        return Ok(());
    };

    // 5. Seed configured categories the owner does not have yet
    let seeded = category::seed_categories(&db, &owner_id, &config.categories).await?;
    if seeded > 0 {
        info!("Seeded {} categories for owner {}", seeded, owner_id);
    }

    let service = BudgetService::new(db, config.dashboard);

    // 6. Close the month on its last day when the owner opted in
    let auto_close = env::var("AUTO_CLOSE_MONTH").is_ok_and(|v| v.trim() == "1");
    if auto_close && monthly::can_close_on(service.today()) {
        let result = service.close_month(Some(owner_id.as_str())).await;
        match result.error {
            None => info!("Month closed for owner {}", owner_id),
            Some(message) => warn!("Month was not closed: {}", message),
        }
    }

    // 7. Print the dashboard
    let dashboard = service.get_dashboard_data(Some(owner_id.as_str()), None).await;
    let envelopes = service.get_tracked_budgets(Some(owner_id.as_str())).await;
    println!("{}", report::format_dashboard_summary(&dashboard, &envelopes));

    Ok(())
}
