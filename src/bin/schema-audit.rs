//! Command-line entry point: run one mode, print and persist its report

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use schema_audit::audit::{ReportSink, format_summary, print_report};
use schema_audit::build_info;
use schema_audit::config::AuditConfig;
use schema_audit::mode::{RunMode, run_all_checks};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for failures outside the checks themselves
const FATAL_EXIT: u8 = 2;

/// Validate schema documents and report the results
#[derive(Debug, Parser)]
#[command(name = "schema-audit")]
#[command(version = build_info::LONG_VERSION)]
struct Cli {
    /// Which documents and checks to run
    mode: RunMode,

    /// Directory holding the schemas/ and validation/ trees
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory the JSON report is written to
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,

    /// Per-check timeout in seconds (0 disables it)
    #[arg(long, global = true, conflicts_with = "no_timeout")]
    timeout_secs: Option<u64>,

    /// Let checks run without a time bound
    #[arg(long, global = true)]
    no_timeout: bool,

    /// Run checks on parallel workers
    #[arg(long, global = true)]
    concurrent: bool,

    /// Configuration profile (falls back to AUDIT_PROFILE, then "default")
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Only print the summary, not the per-check table
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AuditConfig> {
        let mut config = match &self.profile {
            Some(profile) => AuditConfig::load(profile),
            None => AuditConfig::load_from_env(),
        }
        .context("loading configuration")?;

        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        if let Some(dir) = &self.report_dir {
            config.report_dir = dir.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.check_timeout_secs = secs;
        }
        if self.no_timeout {
            config.check_timeout_secs = 0;
        }
        Ok(config)
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli, config: &AuditConfig) -> anyhow::Result<ExitCode> {
    let report = run_all_checks(cli.mode, config, cli.concurrent)?;

    if cli.quiet {
        println!("{}", format_summary(&report));
    } else {
        print_report(&report);
    }

    let path = ReportSink::new(config.report_dir())
        .persist(&report, cli.mode.report_file_name())
        .context("persisting report")?;
    println!("Report saved to {}", path.display());

    // Exit codes are 0 or 1 here; anything else is reserved for fatal errors
    Ok(ExitCode::from(report.exit_code() as u8))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            let message = format!("{:#}", e);
            error!(error = %message, "Configuration failed");
            return ExitCode::from(FATAL_EXIT);
        }
    };
    init_tracing(&config.log_filter);
    info!(
        version = %build_info::version_string(),
        profile = %config.profile,
        mode = %cli.mode,
        "schema-audit starting"
    );

    match run(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Run aborted");
            eprintln!("schema-audit: {}", message);
            ExitCode::from(FATAL_EXIT)
        }
    }
}
