use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use verisl::{
    admin_auth::{AdminAuthManager, AdminPrincipal},
    config::StoreBackend,
    logging,
    models::NewBusiness,
    services::{is_valid_id, QrFormat, QrService},
    state::{open_store, AppStateOptions},
    Config, Error,
};

#[derive(Parser)]
#[command(
    name = "verisl",
    about = "Operator command line for the VeriSL business registry",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert business records from a JSON array into the configured store.
    Import {
        /// Path to a JSON file holding an array of business records.
        file: PathBuf,
    },

    /// Render the QR code for a business profile.
    Qr {
        /// Business identifier (lowercase hyphenated UUID).
        id: String,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Output format: png (default) or svg.
        #[arg(short, long, default_value = "png")]
        format: String,
        /// Output file path. Defaults to `<id>-qr.<format>`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mint a development admin token signed with the configured secret.
    Token {
        #[arg(long)]
        sub: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 3600)]
        ttl_seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Import { file } => run_import(&config, &file).await?,
        Commands::Qr {
            id,
            width,
            height,
            format,
            output,
        } => run_qr(&config, &id, width, height, &format, output.as_deref())?,
        Commands::Token {
            sub,
            email,
            name,
            ttl_seconds,
        } => run_token(&config, sub, email, name, ttl_seconds)?,
    }

    Ok(())
}

async fn run_import(config: &Config, file: &Path) -> Result<()> {
    let records = load_records(file)?;

    if config.database.backend == StoreBackend::Memory {
        tracing::warn!("Importing into the in-memory store; records will not outlive this command");
    }
    let store = open_store(config, &AppStateOptions::from_config(config))
        .await
        .context("Failed to open record store")?;

    let (mut inserted, mut duplicates) = (0usize, 0usize);
    for (index, record) in records.into_iter().enumerate() {
        record
            .check()
            .with_context(|| format!("Record #{index} is invalid"))?;

        match store.insert(record).await {
            Ok(business) => {
                inserted += 1;
                tracing::info!(
                    id = %business.id,
                    registration_number = %business.registration_number,
                    "Imported business"
                );
            }
            Err(Error::DuplicateRegistration {
                registration_number,
            }) => {
                duplicates += 1;
                tracing::warn!(%registration_number, "Skipping duplicate registration number");
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to import record #{index}")),
        }
    }

    println!("Imported {inserted} business(es), skipped {duplicates} duplicate(s)");
    Ok(())
}

fn load_records(path: &Path) -> Result<Vec<NewBusiness>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse business records in {:?}", path.display()))
}

fn run_qr(
    config: &Config,
    id: &str,
    width: Option<u32>,
    height: Option<u32>,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    if !is_valid_id(id) {
        anyhow::bail!("Invalid business ID {id:?}: expected a lowercase hyphenated UUID");
    }
    let format: QrFormat = format.parse()?;

    let qr = QrService::new(config.public_base_url(), config.qr.clone());
    let image = qr.generate(id, width, height, format)?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{id}-qr.{}", image.extension())),
    };
    fs::write(&output_path, image.into_bytes())
        .with_context(|| format!("Failed to write to {:?}", output_path))?;
    eprintln!("Wrote QR code for {} to {:?}", qr.profile_url(id), output_path);
    Ok(())
}

fn run_token(
    config: &Config,
    sub: String,
    email: Option<String>,
    name: Option<String>,
    ttl_seconds: u64,
) -> Result<()> {
    require_signing_secret(config)?;
    if sub.trim().is_empty() {
        anyhow::bail!("--sub must not be empty");
    }

    let manager = AdminAuthManager::new(&config.auth);
    let principal = AdminPrincipal {
        id: sub,
        email,
        name,
    };
    let token = manager
        .issue_token(&principal, ttl_seconds)
        .map_err(Error::from)?;
    println!("{token}");
    Ok(())
}

/// Tokens minted without the server's shared secret would never validate.
fn require_signing_secret(config: &Config) -> Result<()> {
    match config.auth.jwt_secret.as_deref().map(str::trim) {
        Some(secret) if !secret.is_empty() => Ok(()),
        _ => anyhow::bail!("auth.jwt_secret is not configured; set VERISL__AUTH__JWT_SECRET"),
    }
}
