//! Main entry point for CLI command to start server.

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::clients::Clients;
use crate::configuration::generate_config_schema;
use crate::configuration::Configuration;
use crate::graphql;
use crate::server;

/// Options for the storefront
#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Storefront GraphQL server", version)]
pub(crate) struct Opt {
    /// Log level (off|error|warn|info|debug|trace). `RUST_LOG` takes precedence.
    #[arg(long = "log", default_value = "info", env = "STOREFRONT_LOG")]
    log_level: String,

    /// Configuration file location.
    #[arg(short, long = "config", env = "STOREFRONT_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Overrides the configured listen address.
    #[arg(long, env = "STOREFRONT_LISTEN")]
    listen: Option<SocketAddr>,

    /// Prints the configuration schema.
    #[arg(long)]
    schema: bool,

    /// Prints the GraphQL schema.
    #[arg(long)]
    sdl: bool,
}

/// This is the main storefront entrypoint.
pub fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(start(Opt::parse()))
}

async fn start(opt: Opt) -> Result<()> {
    if opt.schema {
        let schema = generate_config_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    if opt.sdl {
        println!("{}", graphql::sdl());
        return Ok(());
    }

    init_tracing(&opt.log_level)?;

    let config_path = opt.config_path.ok_or_else(|| {
        anyhow!("a configuration file is required, pass one with '--config <path>'")
    })?;
    let config_path = if config_path.is_relative() {
        std::env::current_dir()?.join(config_path)
    } else {
        config_path
    };
    let mut configuration = Configuration::from_file(&config_path)
        .with_context(|| format!("could not load {}", config_path.display()))?;
    if let Some(listen) = opt.listen {
        configuration.server.listen = listen;
    }

    let clients = Clients::from_configuration(&configuration)?;
    let schema = graphql::build_schema(clients, configuration.catalog.clone());

    if let Err(err) = server::serve(schema, &configuration.server, shutdown_signal()).await {
        tracing::error!("{}", err);
        return Err(err.into());
    }
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).context("could not parse log configuration")?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // We choose json or plain based on tty
    let installed = if std::io::stdout().is_terminal() {
        builder.try_init()
    } else {
        builder
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .try_init()
    };
    installed.map_err(|err| anyhow!("could not install the tracing subscriber: {err}"))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("could not listen for ctrl-c: {}", err);
        return;
    }
    tracing::info!("received ctrl-c, shutting down");
}
