use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use db2meta_catalog::{CsvSink, ExtractError, Extractor};
use db2meta_core::{Config, ConfigError};

/// Environment variable overriding the configured password
const PASSWORD_ENV: &str = "DB2META_PASSWORD";

/// db2meta - DB2 catalog metadata extractor
#[derive(Parser)]
#[command(name = "db2meta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Without a command: discover schemas when targetSchema is empty, extract otherwise
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the schemas in the catalog and write them to targetSchema
    Schemas,

    /// Extract table and column metadata of the target schemas
    Extract {
        /// Output file (default: csvfile from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Failure of one CLI stage, each with its own exit code
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read configuration: {0:#}")]
    ConfigRead(anyhow::Error),

    #[error("Invalid configuration: {0:#}")]
    ConfigParse(anyhow::Error),

    #[error("Schema discovery failed: {0}")]
    Discovery(ExtractError),

    #[error("Failed to write configuration: {0:#}")]
    ConfigWrite(anyhow::Error),

    #[error("Failed to create output file: {0:#}")]
    OutputCreate(anyhow::Error),

    #[error("Extraction failed: {0}")]
    Extraction(ExtractError),

    #[error("{0}")]
    UnknownDialect(String),

    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigRead(_) => 2,
            Self::ConfigParse(_) => 3,
            Self::Discovery(_) => 4,
            Self::ConfigWrite(_) => 5,
            Self::OutputCreate(_) => 6,
            Self::Extraction(_) => 7,
            Self::UnknownDialect(_) => 8,
            Self::Cancelled => 130,
        }
    }

    /// Attribute a pipeline error to `stage` unless it has its own code
    fn from_extract(e: ExtractError, stage: fn(ExtractError) -> CliError) -> Self {
        match e {
            ExtractError::Cancelled => Self::Cancelled,
            ExtractError::UnknownDialect(_) => Self::UnknownDialect(e.to_string()),
            other => stage(other),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    match run(cli, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), CliError> {
    let file_config = load_config(&cli.config)?;
    let config = with_password_override(file_config.clone(), std::env::var(PASSWORD_ENV).ok());

    let extractor = Extractor::from_config(&config)
        .map_err(|e| CliError::from_extract(e, CliError::Extraction))?;

    if cli.verbose {
        eprintln!(
            "{} {} ({})",
            "Using catalog:".cyan(),
            extractor.dialect(),
            extractor.dialect().platform()
        );
    }

    match cli.command {
        Some(Commands::Schemas) => {
            discover(&extractor, &config, &file_config, &cli.config, cancel).await
        }
        Some(Commands::Extract { output }) => {
            let output = output.unwrap_or_else(|| config.csv_file.clone());
            extract(&extractor, &config, &output, cancel).await
        }
        None if config.needs_schema_discovery() => {
            discover(&extractor, &config, &file_config, &cli.config, cancel).await
        }
        None => extract(&extractor, &config, &config.csv_file, cancel).await,
    }
}

/// Load the config file, telling unreadable from malformed
fn load_config(path: &Path) -> Result<Config, CliError> {
    Config::from_file(path).map_err(|e| {
        let context = format!("{}", path.display());
        match e {
            ConfigError::Io(_) => CliError::ConfigRead(anyhow::Error::new(e).context(context)),
            _ => CliError::ConfigParse(anyhow::Error::new(e).context(context)),
        }
    })
}

fn with_password_override(mut config: Config, password: Option<String>) -> Config {
    if let Some(password) = password {
        config.password = password;
    }
    config
}

/// List schemas and store them as the extraction targets
async fn discover(
    extractor: &Extractor,
    config: &Config,
    file_config: &Config,
    config_path: &Path,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    eprintln!("{}", "Discovering schemas...".cyan());

    let schemas = extractor
        .find_schemas(&config.dsn(), cancel)
        .await
        .map_err(|e| CliError::from_extract(e, CliError::Discovery))?;

    if schemas.is_empty() {
        eprintln!("{}", "⚠ The catalog lists no schemas".yellow());
    }
    for schema in &schemas {
        println!("  {}", schema);
    }

    persist_schemas(file_config, schemas, config_path)?;
    eprintln!("{} {}", "Target schemas written to:".green(), config_path.display());
    eprintln!("Remove the schemas you do not need, then run again to extract.");
    Ok(())
}

/// Write `schemas` into the config file as it was read (no overrides applied)
fn persist_schemas(file_config: &Config, schemas: Vec<String>, path: &Path) -> Result<(), CliError> {
    let mut updated = file_config.clone();
    updated.target_schema = schemas;
    updated
        .save_to_file(path)
        .context(format!("{}", path.display()))
        .map_err(CliError::ConfigWrite)
}

/// Extract the target schemas into `output`
async fn extract(
    extractor: &Extractor,
    config: &Config,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    // Leave an existing output file alone when there is nothing to extract
    extractor
        .check_targets()
        .map_err(|e| CliError::from_extract(e, CliError::Extraction))?;

    eprintln!(
        "{} {}",
        "Extracting schemas:".cyan(),
        extractor.schemas().join(", ")
    );

    let file = tokio::fs::File::create(output)
        .await
        .context(format!("{}", output.display()))
        .map_err(CliError::OutputCreate)?;
    let mut sink = CsvSink::new(tokio::io::BufWriter::new(file));

    let summary = extractor
        .run(&config.dsn(), &mut sink, cancel)
        .await
        .map_err(|e| CliError::from_extract(e, CliError::Extraction))?;

    info!(
        tables = summary.tables,
        columns = summary.columns,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Extraction finished"
    );
    eprintln!(
        "{} {} tables, {} columns written to {}",
        "✓ Extracted".green(),
        summary.tables,
        summary.columns,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CONFIG: &str = r#"{
        "hostname": "db.example.com",
        "database": "SAMPLE",
        "port": 50000,
        "userid": "db2inst1",
        "password": "from-file",
        "lang": "ja",
        "remarks": ["Description"],
        "csvfile": "out.csv",
        "systemSchema": "SYSCAT",
        "targetSchema": []
    }"#;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            CliError::ConfigRead(anyhow::anyhow!("x")),
            CliError::ConfigParse(anyhow::anyhow!("x")),
            CliError::Discovery(ExtractError::Query("x".into())),
            CliError::ConfigWrite(anyhow::anyhow!("x")),
            CliError::OutputCreate(anyhow::anyhow!("x")),
            CliError::Extraction(ExtractError::Query("x".into())),
            CliError::UnknownDialect("x".into()),
            CliError::Cancelled,
        ];
        let codes: HashSet<u8> = errors.iter().map(CliError::exit_code).collect();

        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn pipeline_errors_keep_their_own_codes() {
        let cancelled = CliError::from_extract(ExtractError::Cancelled, CliError::Extraction);
        assert_eq!(cancelled.exit_code(), 130);

        let failed = CliError::from_extract(ExtractError::Connection("refused".into()), CliError::Discovery);
        assert_eq!(failed.exit_code(), 4);
    }

    #[test]
    fn missing_and_malformed_config() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_config(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn discovered_schemas_keep_file_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, CONFIG).unwrap();

        let file_config = load_config(&path).unwrap();
        let config = with_password_override(file_config.clone(), Some("from-env".into()));
        assert_eq!(config.password, "from-env");

        persist_schemas(&file_config, vec!["DB2INST1".into()], &path).unwrap();

        let saved = load_config(&path).unwrap();
        assert_eq!(saved.target_schema, vec!["DB2INST1"]);
        assert_eq!(saved.password, "from-file");
    }

    #[test]
    fn password_can_come_from_environment_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, CONFIG.replace(r#""password": "from-file","#, "")).unwrap();

        let file_config = load_config(&path).unwrap();
        assert_eq!(file_config.password, "");

        let config = with_password_override(file_config, Some("from-env".into()));
        assert_eq!(config.password, "from-env");
        assert_eq!(config.dsn().password, "from-env");
    }

    #[tokio::test]
    async fn extract_without_targets_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, CONFIG).unwrap();
        let output = dir.path().join("out.csv");
        std::fs::write(&output, "20,,S.T,,,ja,Table\n\n").unwrap();

        let config = load_config(&config_path).unwrap();
        let extractor = Extractor::from_config(&config).unwrap();
        let err = extract(&extractor, &config, &output, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 7);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "20,,S.T,,,ja,Table\n\n");
    }

    #[test]
    fn parses_commands() {
        let cli = Cli::try_parse_from(["db2meta"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));

        let cli = Cli::try_parse_from(["db2meta", "extract", "-o", "meta.csv", "--config", "c.json"]).unwrap();
        match cli.command {
            Some(Commands::Extract { output }) => assert_eq!(output, Some(PathBuf::from("meta.csv"))),
            _ => panic!("expected extract"),
        }
        assert_eq!(cli.config, PathBuf::from("c.json"));

        assert!(matches!(
            Cli::try_parse_from(["db2meta", "-v", "schemas"]).unwrap().command,
            Some(Commands::Schemas)
        ));
    }
}
