use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use liftlog::auth::TokenGenerator;
use liftlog::config::ServerConfig;
use liftlog::server::cache::ViewCache;
use liftlog::server::{AppState, create_router};
use liftlog::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "A workout logging server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create the database)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Mint an access token for a user. The token is printed to stdout
    /// once and cannot be recovered later.
    Token {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Opaque user id the token authenticates as
        #[arg(long)]
        user_id: String,

        /// Days until the token expires (never, if omitted)
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
}

fn open_initialized_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let db_path = PathBuf::from(data_dir).join("liftlog.db");
    if !db_path.exists() {
        bail!("Server not initialized. Run 'liftlog admin init' first to create the database.");
    }
    Ok(SqliteStore::new(db_path)?)
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("liftlog.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    if store.has_access_tokens()? {
        bail!("Server already initialized at: {}", db_path.display());
    }

    eprintln!("Database created at {}", db_path.display());

    if !non_interactive {
        create_first_token_prompt(&store)?;
    }

    Ok(())
}

fn create_first_token_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create = inquire::Confirm::new("Would you like to create a user token now?")
        .with_default(true)
        .prompt()?;

    if !create {
        return Ok(());
    }

    let user_id = inquire::Text::new("User id:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("User id cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("User id cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let raw_token = mint_token(store, &user_id, None)?;

    eprintln!();
    eprintln!("========================================");
    eprintln!("Token for '{user_id}' (save this, it won't be shown again):");
    eprintln!();
    println!("{raw_token}");
    eprintln!();
    eprintln!("========================================");

    Ok(())
}

fn mint_token(
    store: &SqliteStore,
    user_id: &str,
    expires_in_days: Option<i64>,
) -> anyhow::Result<String> {
    let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(days));
    let generator = TokenGenerator::new();
    let (token, raw_token) = generator.mint(user_id, expires_at)?;
    store.create_access_token(&token)?;
    Ok(raw_token)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("liftlog=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
            AdminCommands::Token {
                data_dir,
                user_id,
                expires_in_days,
            } => {
                let store = open_initialized_store(&data_dir)?;
                let raw_token = mint_token(&store, &user_id, expires_in_days)?;
                // Raw token alone on stdout so it can be piped
                println!("{raw_token}");
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'liftlog admin init' first to create the database."
                );
            }

            let store = SqliteStore::new(&db_path)?;
            if !store.has_access_tokens()? {
                tracing::warn!(
                    "No access tokens exist yet; mint one with 'liftlog admin token --user-id <id>'"
                );
            }

            let state = Arc::new(AppState {
                store: Arc::new(store),
                views: ViewCache::new(),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
