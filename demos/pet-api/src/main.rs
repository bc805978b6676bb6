//! Pet API - Entry point
//!
//! Runs the pet dispatcher offline: print the OpenAPI document, or dispatch
//! one gateway event read from a file or stdin.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use daedalus::config::ConfigLoader;
use daedalus::telemetry::{init_logging, metrics, LogWriter};
use daedalus::ApiEvent;
use pet_api::{MemoryPetStore, PetStore};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Environment prefix for configuration overrides.
const ENV_PREFIX: &str = "PET_API";

enum Command {
    /// Print the OpenAPI document.
    OpenApi,
    /// Dispatch one event; `None` reads stdin.
    Invoke(Option<PathBuf>),
}

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    command: Command,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut command = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("pet-api {}", env!("CARGO_PKG_VERSION"));
                    std::process::exit(0);
                }
                "openapi" if command.is_none() => command = Some(Command::OpenApi),
                "invoke" if command.is_none() => {
                    let input = args.next().filter(|path| path != "-").map(PathBuf::from);
                    command = Some(Command::Invoke(input));
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        let Some(command) = command else {
            print_help();
            std::process::exit(1);
        };

        Self { config, command }
    }
}

fn print_help() {
    println!(
        r#"Pet API - Daedalus pet store demo

USAGE:
    pet-api [OPTIONS] <COMMAND>

COMMANDS:
    openapi              Print the OpenAPI document
    invoke [FILE]        Dispatch a gateway event read from FILE or stdin

OPTIONS:
    -c, --config <PATH>  Path to configuration file (TOML or JSON)
    -h, --help           Print help information
    -v, --version        Print version information

ENVIRONMENT VARIABLES:
    PET_API__API__TITLE              Document title
    PET_API__DOCS__PATH              Documentation path (default: /swagger.json)
    PET_API__ROUTING__MATCH_MODE     prefix | strict (default: prefix)
    PET_API__LOGGING__LEVEL          Log filter (default: info)
    BASEURL                          Public base URL of the deployment

EXAMPLES:
    pet-api openapi > swagger.json
    echo '{{"httpMethod":"GET","path":"/pets"}}' | pet-api invoke
"#
    );
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("pet-api: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new().with_defaults().with_dotenv();
    if let Some(path) = &args.config {
        loader = loader.with_file(path)?;
    }
    let config = loader.with_env_prefix(ENV_PREFIX).load()?;

    // stdout carries the document or the response
    let mut log_config = config.logging.to_log_config();
    log_config.writer = LogWriter::Stderr;
    init_logging(&log_config)?;
    metrics::describe_metrics();

    let store: Arc<dyn PetStore> = Arc::new(MemoryPetStore::seeded());
    let dispatcher = pet_api::dispatcher(store, &config)?;
    info!(routes = dispatcher.table().len(), "pet dispatcher ready");

    match args.command {
        Command::OpenApi => {
            println!("{}", dispatcher.openapi_json()?);
        }
        Command::Invoke(input) => {
            let raw = read_event(input.as_deref()).await?;
            let event: ApiEvent =
                serde_json::from_str(&raw).context("input is not a gateway event")?;
            let response = dispatcher.dispatch(event).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

async fn read_event(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read stdin")?;
            Ok(raw)
        }
    }
}
