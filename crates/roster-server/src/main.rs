//! roster-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ROSTER_*` environment variables, opens the SQLite store, and serves the
//! student roster API over HTTP.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `ROSTER_HASHING__MEMORY_KIB=65536`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roster_core::{Credential, CredentialHasher, Roster};
use roster_server::{ServerConfig, app, load_config, open_store};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Student roster server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password read from stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg: ServerConfig = load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let hasher = server_cfg
    .hashing
    .hasher()
    .context("invalid hashing parameters")?;

  if cli.hash_password {
    let password = read_stdin_line()?;
    let hash = hasher.hash(&Credential::new(password))?;
    println!("{hash}");
    return Ok(());
  }

  let store = open_store(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let cors = server_cfg.cors.layer().context("invalid CORS origin")?;
  let roster = Arc::new(Roster::new(store, hasher));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(roster, cors))
    .await
    .context("server error")?;

  Ok(())
}

fn read_stdin_line() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
