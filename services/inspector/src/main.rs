//! Promowire inspector - decode captured payloads against the promotion catalog
//!
//! Usage:
//!   promowire-inspect --hex "12 08 12 06 41 42 43 31 32 33" --type Promotion
//!   promowire-inspect --file capture.bin --delimited
//!   promowire-inspect --list

mod inspect;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use codec::Decoder;
use promowire_config::{LoggingSettings, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "promowire-inspect")]
#[command(about = "Decode and print promowire payloads")]
#[command(version)]
struct Args {
    /// Message type of the payload
    #[arg(short, long = "type", default_value = "InsertionLogFlatPromotion")]
    message_type: String,

    /// Payload as hex text
    #[arg(long, conflicts_with = "file")]
    hex: Option<String>,

    /// Read the payload from a file (stdin when neither --hex nor --file is given)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Payload is a stream of varint length-prefixed messages
    #[arg(short, long)]
    delimited: bool,

    /// Print the schema and exit
    #[arg(long)]
    list: bool,

    /// Extra schema definitions (TOML) added to the catalog
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Path to settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides settings)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        settings.logging.level = level.clone();
    }
    settings.logging.json |= args.json_logs;
    init_logging(&settings.logging)?;

    let extra = args
        .schema
        .as_ref()
        .map(|path| std::fs::read_to_string(path).with_context(|| format!("Failed to read schema file {path:?}")))
        .transpose()?;
    let schema = inspect::load_schema(extra.as_deref())?;

    if args.list {
        print!("{}", inspect::describe_schema(&schema));
        return Ok(());
    }

    let data = read_payload(&args)?;
    info!(bytes = data.len(), message_type = %args.message_type, "inspecting payload");

    let decoder = Decoder::new(settings.codec.clone());
    for line in inspect::render(&decoder, &schema, &args.message_type, &data, args.delimited)? {
        println!("{line}");
    }

    Ok(())
}

fn read_payload(args: &Args) -> Result<Vec<u8>> {
    if let Some(text) = &args.hex {
        return inspect::parse_hex(text);
    }
    if let Some(path) = &args.file {
        return std::fs::read(path).with_context(|| format!("Failed to read payload file {path:?}"));
    }

    let mut data = Vec::new();
    std::io::stdin()
        .read_to_end(&mut data)
        .context("Failed to read payload from stdin")?;
    Ok(data)
}

fn init_logging(logging: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_new(&logging.level)
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}
