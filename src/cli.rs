use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::env;

use crate::commands::analyze::{self, AnalyzeOptions};
use crate::commands::carbon::{self, CarbonOptions};
use crate::commands::history::{self, HistoryOptions};
use crate::commands::{CommandReport, categories, status};

const DEFAULT_USER: &str = "local";

#[derive(Debug, Parser)]
#[command(name = "upcycle", version, about = "Upcycling ideas and carbon estimates for waste materials")]
struct Cli {
    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Caller identity for saved records (default: UPCYCLE_USER or `local`)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Carbon estimate plus three upcycling suggestions
    Analyze {
        #[arg(long)]
        material: String,
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        quantity: f64,
        #[arg(long, default_value = "kg")]
        unit: String,
        #[arg(long)]
        condition: Option<String>,
        /// Skip writing the result to the history ledger
        #[arg(long)]
        no_save: bool,
    },
    /// Carbon estimate only
    Carbon {
        #[arg(long)]
        material: String,
        #[arg(long, allow_negative_numbers = true)]
        quantity: f64,
        #[arg(long, default_value = "kg")]
        unit: String,
    },
    /// Product categories worth considering for a material
    Categories {
        #[arg(long)]
        material: String,
    },
    /// Recent analyses, newest first
    History {
        #[arg(long)]
        limit: Option<u64>,
    },
    /// One saved analysis
    Show { id: String },
    /// Resolved paths, provider and settings
    Status,
}

fn resolve_user(flag: Option<String>) -> String {
    flag.filter(|u| !u.trim().is_empty())
        .or_else(|| env::var("UPCYCLE_USER").ok().filter(|u| !u.trim().is_empty()))
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for line in &report.details {
        println!("{line}");
    }
    for issue in &report.issues {
        println!("issue: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let user = resolve_user(cli.user);

    let report = match cli.command {
        Command::Analyze {
            material,
            category,
            quantity,
            unit,
            condition,
            no_save,
        } => analyze::run(&AnalyzeOptions {
            material,
            category,
            quantity,
            unit,
            condition,
            user,
            no_save,
        })?,
        Command::Carbon {
            material,
            quantity,
            unit,
        } => carbon::run(&CarbonOptions {
            material,
            quantity,
            unit,
        })?,
        Command::Categories { material } => categories::run(&material)?,
        Command::History { limit } => history::run(&HistoryOptions { user, limit })?,
        Command::Show { id } => history::show(&user, &id)?,
        Command::Status => status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        return Err(anyhow!(
            "{} failed: {}",
            report.command,
            report.issues.join("; ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, resolve_user};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_user_wins() {
        assert_eq!(resolve_user(Some(" amy ".to_string())), "amy");
    }
}
