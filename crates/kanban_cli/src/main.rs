//! Board inspection CLI.
//!
//! # Responsibility
//! - Open a kanban database and print project boards and rankings.
//! - Run the done-task clean-up from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kanban_core::db::open_db;
use kanban_core::{
    default_log_level, init_logging, ContributorRepository, LoggingConfig, ProjectId,
    ProjectService, SqliteContributorRepository, SqliteProjectRepository,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Inspect kanban projects stored in SQLite")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "KANBAN_DB")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "KANBAN_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KANBAN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the core library is linked
    Ping,
    /// List projects by name
    Projects,
    /// Show column totals and contributor ranking of a project
    Board { project_id: ProjectId },
    /// Move every done task of a project to out
    Cleanup { project_id: ProjectId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let config = LoggingConfig::new(level, log_dir).context("invalid logging configuration")?;
        init_logging(&config).context("failed to initialize logging")?;
    }

    if let Command::Ping = cli.command {
        println!("kanban_core ping={}", kanban_core::ping());
        println!("kanban_core version={}", kanban_core::core_version());
        return Ok(());
    }

    let db_path = cli
        .db
        .as_ref()
        .context("a database is required: pass --db or set KANBAN_DB")?;
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);

    match cli.command {
        Command::Ping => {}
        Command::Projects => {
            for project in service.list_projects()? {
                println!(
                    "{}\t{}\towner={}\ttasks={}",
                    project.id,
                    project.name,
                    project.owner_id,
                    project.tasks.len()
                );
            }
        }
        Command::Board { project_id } => {
            let people = SqliteContributorRepository::try_new(&conn)?;
            let summary = service.board_summary(project_id)?;
            for column in &summary.columns {
                println!(
                    "{:<8} tasks={:<4} points={}",
                    column.position, column.task_count, column.points
                );
            }
            println!();
            for (rank, entry) in service.contributors_scores(project_id)?.iter().enumerate() {
                let name = people
                    .get_contributor(entry.contributor_id)?
                    .map_or_else(|| format!("#{}", entry.contributor_id), |c| c.name);
                println!("{:>3}. {:<20} {}", rank + 1, name, entry.score);
            }
        }
        Command::Cleanup { project_id } => {
            let moved = service.clean_up_done_tasks(project_id)?;
            info!("event=cli_cleanup module=cli status=ok project_id={project_id} moved={moved}");
            println!("moved {moved} done task(s) to out");
        }
    }

    Ok(())
}
