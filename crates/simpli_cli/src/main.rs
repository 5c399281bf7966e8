//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `simpli_core` linkage.
//! - Optionally summarize an existing database: `simpli_cli [DB_PATH]`.

use simpli_core::db::open_db;
use simpli_core::{ProjectsService, ServiceConfig, SqliteStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("simpli_core ping={}", simpli_core::ping());
    println!("simpli_core version={}", simpli_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match summarize(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let store = SqliteStore::try_new(&conn).map_err(|err| err.to_string())?;
    let service = ProjectsService::new(store, ServiceConfig::default());

    for line in summary_lines(&service) {
        println!("{line}");
    }
    Ok(())
}

/// Renders the snapshots published by `ProjectsService::new`.
fn summary_lines(service: &ProjectsService<SqliteStore<'_>>) -> Vec<String> {
    let mut lines: Vec<String> = service
        .projects()
        .iter()
        .map(|overview| {
            format!(
                "project title={:?} closed={} items={} done={:.0}%",
                overview.project.title,
                overview.project.closed,
                overview.items.len(),
                overview.completion_status * 100.0
            )
        })
        .collect();
    lines.push(format!("hot_items={}", service.hot_items().len()));
    lines
}
