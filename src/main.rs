mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod error;
mod event;
mod logging;
mod proxy;
mod query;
mod ui;
mod upstream;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ml-gallery")]
#[command(about = "Machine-learning model gallery and API proxy")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./ml-gallery.yaml, then $XDG_CONFIG_HOME/ml-gallery/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Browse the model gallery in the terminal (default)
  Browse,
  /// Run the HTTP proxy in front of the catalog and ML backends
  Serve {
    /// Address to listen on (overrides server.bind)
    #[arg(short, long)]
    bind: Option<SocketAddr>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let config = config::Config::load(args.config.as_deref())?;

  match args.command.unwrap_or(Cmd::Browse) {
    Cmd::Serve { bind } => {
      logging::init_stderr(&config)?;
      let state = proxy::ProxyState {
        client: upstream::UpstreamClient::new()?,
        endpoints: upstream::Endpoints::new(&config.upstreams),
      };
      proxy::serve(state, bind.unwrap_or(config.server.bind)).await?;
    }
    Cmd::Browse => {
      let _guard = logging::init_file(&config)?;
      let store = cache::open_store(&config)?;
      let service = catalog::CatalogService::new(upstream::UpstreamClient::new()?, store, &config);
      app::App::new(service).run().await?;
    }
  }

  Ok(())
}
