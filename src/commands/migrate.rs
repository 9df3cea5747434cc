//! `migrate` command - schema management for accounts, classes and attendance.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                println!("{:<48} {}", name, if applied { "applied" } else { "pending" });
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table, attendance history included");
            db.fresh_migrations().await?;
            tracing::info!("Schema recreated");
        }
    }

    Ok(())
}
