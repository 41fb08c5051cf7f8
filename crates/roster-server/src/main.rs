//! `roster` binary.
//!
//! Reads `roster.toml` (or the path given with `--config`), opens the SQLite
//! store, and either serves the HTTP API or runs an import.
//!
//! ```text
//! roster serve
//! roster import --input people.json
//! roster hash-password
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_api::{AppState, TokenKeys, auth::hash_password};
use roster_server::{ServerConfig, read_rows, run_import};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster people registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API.
  Serve,
  /// Import people from a JSON array of raw rows and seed accounts.
  Import {
    /// JSON file containing the rows.
    #[arg(short, long)]
    input: PathBuf,
  },
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
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

  if let Command::HashPassword = cli.command {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => serve(cfg, store).await,
    Command::Import { input } => {
      let rows = read_rows(&input).await?;
      tracing::info!(rows = rows.len(), input = ?input, "loaded raw rows");
      let report = run_import(&store, &rows, &cfg.import).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::HashPassword => Ok(()),
  }
}

async fn serve(cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let secret = cfg
    .jwt_secret
    .as_deref()
    .context("jwt_secret must be configured to serve")?;
  let tokens = TokenKeys::new(secret, cfg.jwt_expiry_secs)?;

  let app = roster_api::router(AppState::new(store, tokens))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
