//! Command-line entry point: reads a ticket, writes `<table>.sql` and `<table>.log.md`.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use query_unifier::{
    UnifierConfig, UnifyResult,
    pipeline::Unifier,
    ticket::{FileGateway, TicketSource},
};

/// Unify the SELECT queries of a ticket into one UNION ALL query
#[derive(Parser, Debug)]
#[command(name = "query-unifier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ticket body file (default: the ISSUE_BODY environment variable)
    #[arg(short, long)]
    ticket: Option<PathBuf>,
    /// Glossary CSV used to rename output columns
    #[arg(short, long)]
    glossary: Option<PathBuf>,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory receiving the generated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Wrap the result in CREATE TABLE <table> AS ...;
    #[arg(long)]
    create_table: bool,
    /// Cast renamed columns to their glossary type
    #[arg(long)]
    cast_types: bool,
    /// Print the unified SQL to stdout
    #[arg(long)]
    print: bool,
}

async fn load_config(cli: &Cli) -> UnifyResult<UnifierConfig> {
    let mut config = match &cli.config {
        Some(path) => UnifierConfig::from_json_file(path).await?,
        None => UnifierConfig::new(),
    };

    if let Some(glossary) = &cli.glossary {
        config = config.with_glossary(glossary);
    }
    if let Some(output_dir) = &cli.output_dir {
        config = config.with_output_dir(output_dir);
    }
    if cli.create_table {
        config = config.with_create_table();
    }
    if cli.cast_types {
        config = config.with_glossary_casts();
    }

    Ok(config)
}

async fn run(cli: Cli) -> UnifyResult<()> {
    let config = load_config(&cli).await?;
    let source = match cli.ticket {
        Some(path) => TicketSource::File(path),
        None => TicketSource::Env,
    };
    let gateway = FileGateway::new(source, &config.output_dir);

    let unifier = Unifier::new(config)?;
    let outcome = unifier.run(&gateway).await?;

    info!(
        "Unified {} columns into {}",
        outcome.schema.len(),
        gateway.sql_path(&outcome.table_name).display()
    );
    if cli.print {
        println!("{}", outcome.query);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        },
    }
}
