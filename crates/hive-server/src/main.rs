//! `hive` binary: serve the agent hierarchy over HTTP

use anyhow::Context as _;
use clap::Parser;
use hive_server::{AppState, Catalog, HierarchyBuilder, ServiceConfig};
use hive_utils::LogFormat;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hive")]
#[command(about = "Answer queries with a hierarchy of LLM agents", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HIVE_HOST")]
    host: Option<IpAddr>,

    /// Port to bind
    #[arg(short, long, env = "HIVE_PORT")]
    port: Option<u16>,

    /// Agents file in TOML; the built-in tree when unset
    #[arg(short, long, env = "HIVE_AGENTS_FILE")]
    agents: Option<PathBuf>,

    /// Validate the agent catalogue and exit
    #[arg(long)]
    check: bool,
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    let catalog = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading agents file");
            Catalog::load(path)?
        }
        None => Catalog::builtin()?,
    };
    catalog.validate()?;
    Ok(catalog)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let log_format = hive_utils::env_or("HIVE_LOG_FORMAT", LogFormat::Text)?;
    hive_utils::init_tracing_with("info,hive_server=info,tower_http=info", log_format);

    let agents_file = args.agents.clone();

    if args.check {
        let catalog = load_catalog(agents_file.as_deref())?;
        let order = catalog.build_order()?;
        println!("Catalogue OK: root '{}', {} agents", catalog.root, order.len());
        for name in order {
            println!("  {name}");
        }
        return Ok(());
    }

    let mut config = ServiceConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.agents_file = agents_file;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hive");

    let catalog = load_catalog(config.agents_file.as_deref())?;
    let root = HierarchyBuilder::new(catalog, config.providers()?)
        .finance_config(config.finance.clone())
        .max_iterations(config.max_iterations)
        .build()
        .context("failed to build agents")?;

    hive_server::run(config.bind_addr(), AppState::new(root)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_fall_back_to_environment() {
        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        };
        assert_eq!(env_of("host").as_deref(), Some("HIVE_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("HIVE_PORT"));
        assert_eq!(env_of("agents").as_deref(), Some("HIVE_AGENTS_FILE"));
        assert_eq!(env_of("check"), None);
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::try_parse_from(["hive", "--host", "0.0.0.0", "-p", "8080", "--check"]).unwrap();
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.host, Some(IpAddr::from([0, 0, 0, 0])));
        assert!(args.check);
    }
}
