//! Zixin - local simulation harness for soulbound badge programs
//!
//! The `zixin` command runs one badge program end to end against the live
//! identity, image and storage services, the same way the oracle network
//! would, and prints what the oracle would hand back to the contract.
//!
//! ## Commands
//!
//! - `programs`: List the builtin badge programs
//! - `run`: Execute one program with credentials from the environment

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, Level};

use zixin_core::{
    BadgePipeline, BuiltinProgram, CredentialName, Credentials, InvocationReport, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "zixin")]
#[command(author = "Zixin Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Soulbound identity badge issuance simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and a JSON report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List builtin badge programs
    Programs,

    /// Run one badge program and print the oracle result
    Run {
        /// Program name, see `zixin programs`
        #[arg(short, long)]
        program: String,

        /// OAuth access token of the badge recipient (overrides ACCESS_TOKEN)
        #[arg(long)]
        access_token: Option<String>,

        /// Image templating service API key (overrides IMAGE_API_KEY)
        #[arg(long)]
        image_api_key: Option<String>,

        /// Storage relay API key (overrides NFT_STORAGE_API_KEY)
        #[arg(long)]
        storage_api_key: Option<String>,

        /// Per-stage timeout in seconds (0 disables), overrides ZIXIN_STAGE_TIMEOUT_SECS
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

/// Rendered output of `zixin run --json`.
#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    report: &'a InvocationReport,
    encoded: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    zixin_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Programs => cmd_programs(cli.json),
        Commands::Run {
            program,
            access_token,
            image_api_key,
            storage_api_key,
            timeout_secs,
        } => {
            let credentials = collect_credentials(
                Credentials::from_env(),
                access_token,
                image_api_key,
                storage_api_key,
            );
            cmd_run(&program, credentials, timeout_secs, cli.json).await
        }
    }
}

/// Layer credentials passed on the command line over `base`.
fn collect_credentials(
    mut credentials: Credentials,
    access_token: Option<String>,
    image_api_key: Option<String>,
    storage_api_key: Option<String>,
) -> Credentials {
    let supplied = [
        (CredentialName::AccessToken, access_token),
        (CredentialName::ImageApiKey, image_api_key),
        (CredentialName::StorageApiKey, storage_api_key),
    ];
    for (name, value) in supplied {
        if let Some(value) = value {
            credentials.insert(name, value);
        }
    }
    credentials
}

fn cmd_programs(json: bool) -> Result<()> {
    let programs: Vec<_> = BuiltinProgram::ALL.iter().map(|b| b.program()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&programs)?);
        return Ok(());
    }

    for program in &programs {
        let gate = program
            .predicate
            .as_ref()
            .map(|p| p.name())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<26} {:<9} {:<5} {}",
            program.name,
            program.provider.name(),
            program.mode.name(),
            gate
        );
    }
    Ok(())
}

async fn cmd_run(
    name: &str,
    credentials: Credentials,
    timeout_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let program = BuiltinProgram::from_name(name)?.program();

    let mut config = PipelineConfig::from_env().context("Failed to load pipeline configuration")?;
    if let Some(secs) = timeout_secs {
        config = config.with_stage_timeout_secs(secs);
    }
    debug!(?credentials, program = %program.name, "Running badge program");

    let pipeline = BadgePipeline::from_config(program.provider, config)
        .context("Failed to build badge pipeline")?;
    let report = pipeline
        .run(&program, &credentials)
        .await
        .with_context(|| format!("Badge program '{}' failed", program.name))?;

    print_report(&report, json)
}

fn print_report(report: &InvocationReport, json: bool) -> Result<()> {
    let encoded = format!("0x{}", hex::encode(report.encoded()));

    if json {
        let output = RunOutput { report, encoded };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("result:   {}", report.result);
    println!("kind:     {}", report.result.kind());
    if let Some(verdict) = &report.verdict {
        println!(
            "verdict:  {} ({})",
            if verdict.eligible { "eligible" } else { "ineligible" },
            verdict.predicate
        );
    }
    println!("encoded:  {encoded}");
    println!("duration: {}ms", report.duration_ms);
    Ok(())
}
