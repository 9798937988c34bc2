// ==========================================
// 车间生产管理系统 - 命令行入口
// ==========================================
// 用途: 管理员运维（建库、完整性扫描、物料流转报表、首页汇总、配置）
// 用法: shopfloor [--db PATH] [--locale en|zh-CN] [--json] <COMMAND>
// ==========================================

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use shopfloor_mis::api::{ApiError, ErrorResponse};
use shopfloor_mis::app::{get_default_db_path, AppState, DB_PATH_ENV};
use shopfloor_mis::config::config_keys;
use shopfloor_mis::domain::report::MaterialFlowRow;
use shopfloor_mis::domain::IntegrityReport;
use shopfloor_mis::i18n::{self, t, t_with_args};
use shopfloor_mis::{logging, Actor};

#[derive(Parser)]
#[command(name = "shopfloor")]
#[command(author, version, about = "Shop-floor production MIS: material-flow checks and reports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
struct GlobalOpts {
    /// SQLite database path (default: per-user data dir)
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Message language (en, zh-CN)
    #[arg(long, global = true, default_value = "en")]
    locale: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema (idempotent)
    InitDb,

    /// Run the data integrity scan
    Integrity {
        /// Scan date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Also write the findings to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Section-to-section material balance
    MaterialFlow {
        /// Report date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Also write the rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Admin dashboard summary
    Summary {
        /// Summary date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Read or change settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show one setting
    Get { key: String },
    /// Change one setting
    Set { key: String, value: String },
    /// Show all known settings with their effective values
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.global.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    i18n::set_locale(&cli.global.locale);

    match run(cli.command, &cli.global) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err, cli.global.json);
            ExitCode::FAILURE
        }
    }
}

fn print_error(err: &anyhow::Error, json: bool) {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => {
            let resp = ErrorResponse::from(api_err);
            if json {
                match serde_json::to_string_pretty(&resp) {
                    Ok(s) => eprintln!("{}", s),
                    Err(_) => eprintln!("{}: {}", resp.code, resp.message),
                }
            } else {
                eprintln!("{}: {}", resp.code, resp.message);
            }
            if !api_err.is_user_error() {
                tracing::error!(error = %api_err, "命令执行失败");
            }
        }
        None => eprintln!("error: {:#}", err),
    }
}

fn resolve_db_path(global: &GlobalOpts) -> String {
    match &global.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => get_default_db_path(),
    }
}

fn run(command: Commands, global: &GlobalOpts) -> anyhow::Result<()> {
    let db_path = resolve_db_path(global);
    let state = AppState::new(db_path.clone())?;
    let admin = Actor::admin("cli");
    let today = Local::now().date_naive();

    match command {
        Commands::InitDb => {
            println!("{}", t_with_args("cli.db_initialized", &[("path", &db_path)]));
        }

        Commands::Integrity { date, csv } => {
            let report = state
                .report_api
                .check_data_integrity_on(&admin, date.unwrap_or(today))?;
            if let Some(path) = csv {
                write_findings_csv(&report, &path)?;
                eprintln!("{}", t_with_args("cli.csv_written", &[("path", &path.to_string_lossy())]));
            }
            if global.json {
                print_json(&report)?;
            } else {
                print_integrity_text(&report);
            }
        }

        Commands::MaterialFlow { date, csv } => {
            let rows = state
                .report_api
                .material_flow_report_on(&admin, date.unwrap_or(today))?;
            if let Some(path) = csv {
                write_rows_csv(&rows, &path)?;
                eprintln!("{}", t_with_args("cli.csv_written", &[("path", &path.to_string_lossy())]));
            }
            if global.json {
                print_json(&rows)?;
            } else {
                for row in &rows {
                    println!(
                        "{:<20} -> {:<20} out={:>10.2} in={:>10.2} diff={:>10.2}{}",
                        row.from_section,
                        row.to_section,
                        row.output,
                        row.input,
                        row.discrepancy,
                        if row.has_issue { "  !" } else { "" }
                    );
                }
            }
        }

        Commands::Summary { date } => {
            let summary = state.report_api.admin_summary_on(&admin, date.unwrap_or(today))?;
            if global.json {
                print_json(&summary)?;
            } else {
                println!("workers:               {}", summary.total_workers);
                println!("sections:              {}", summary.total_sections);
                println!("pending requisitions:  {}", summary.pending_requisitions);
                println!("target / actual:       {} / {}", summary.production_summary.total_target, summary.production_summary.total_actual);
                println!("wastage (kg):          {:.2}", summary.production_summary.total_wastage);
            }
        }

        Commands::Config(cmd) => run_config(cmd, &state, global)?,
    }

    Ok(())
}

fn run_config(cmd: ConfigCommands, state: &AppState, global: &GlobalOpts) -> anyhow::Result<()> {
    let config = &state.config_manager;

    match cmd {
        ConfigCommands::Get { key } => {
            let default = default_for(&key)?;
            match config.get_config_value(&key).map_err(ApiError::from)? {
                Some(value) => println!("{}", value),
                None => println!(
                    "{}",
                    t_with_args("cli.config_unset", &[("key", &key), ("default", default)])
                ),
            }
        }
        ConfigCommands::Set { key, value } => {
            default_for(&key)?;
            config.set_config_value(&key, &value).map_err(ApiError::from)?;
            println!(
                "{}",
                t_with_args("cli.config_updated", &[("key", &key), ("value", &value)])
            );
        }
        ConfigCommands::List => {
            let snapshot = config.get_config_snapshot().map_err(ApiError::from)?;
            if global.json {
                println!("{}", snapshot);
            } else {
                let map: std::collections::BTreeMap<String, String> = serde_json::from_str(&snapshot)?;
                for (key, value) in map {
                    println!("{:<36} {}", key, value);
                }
            }
        }
    }
    Ok(())
}

fn default_for(key: &str) -> anyhow::Result<&'static str> {
    config_keys::DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            ApiError::InvalidInput(t_with_args("cli.unknown_config_key", &[("key", key)])).into()
        })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_integrity_text(report: &IntegrityReport) {
    if report.findings.is_empty() {
        println!("{}", t("cli.no_findings"));
        return;
    }

    println!(
        "{}",
        t_with_args(
            "cli.findings_header",
            &[
                ("count", &report.findings.len().to_string()),
                ("scan_id", &report.scan_id),
            ],
        )
    );
    for finding in &report.findings {
        println!(
            "[{:<6}] {:<13} {}",
            finding.severity.to_string(),
            finding.kind.to_string(),
            finding.description
        );
    }
}

// ==========================================
// CSV 导出
// ==========================================

#[derive(Serialize)]
struct FindingCsvRow<'a> {
    scan_id: &'a str,
    scan_date: String,
    #[serde(rename = "type")]
    kind: String,
    severity: String,
    description: &'a str,
    details: String,
}

fn write_findings_csv(report: &IntegrityReport, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for finding in &report.findings {
        writer.serialize(FindingCsvRow {
            scan_id: &report.scan_id,
            scan_date: report.scan_date.to_string(),
            kind: finding.kind.to_string(),
            severity: finding.severity.to_string(),
            description: &finding.description,
            details: finding.details.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_rows_csv(rows: &[MaterialFlowRow], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
