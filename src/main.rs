use std::{
    io::BufRead,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use schoolgate::{
    AppState, build_app,
    auth::CredentialVerifier,
    config::{self, MIN_BCRYPT_COST},
    db, observability,
};

#[derive(Parser, Debug)]
#[command(name = "schoolgate", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "schoolgate.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the login gateway (default)
    Serve,
    /// Read a password from stdin and print its bcrypt hash
    HashPassword {
        /// bcrypt cost; defaults to `auth.login.bcrypt_cost` from the config file
        #[arg(long)]
        cost: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::HashPassword { cost }) => run_hash_password(&args.config, cost).await,
        Some(Command::Serve) | None => run_server(&args.config).await,
    }
}

async fn run_hash_password(config_path: &Path, cost: Option<u32>) {
    let cost = match cost {
        Some(cost) => cost,
        None => config::GatewayConfig::from_file(config_path)
            .map(|c| c.auth.login.bcrypt_cost)
            .unwrap_or_else(|_| config::LoginConfig::default().bcrypt_cost),
    };
    if !(MIN_BCRYPT_COST..=31).contains(&cost) {
        eprintln!("Error: bcrypt cost must be between {} and 31", MIN_BCRYPT_COST);
        std::process::exit(2);
    }

    let mut line = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
        eprintln!("Error: failed to read password from stdin: {}", e);
        std::process::exit(1);
    }
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        eprintln!("Error: password must not be empty");
        std::process::exit(2);
    }

    match CredentialVerifier::new(1, cost).hash(password).await {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_server(config_path: &Path) {
    let config = match config::GatewayConfig::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing::info!(config_file = %config_path.display(), "Starting login gateway");

    let db = match db::DbPool::from_config(&config.database).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if config.database.run_migrations()
        && let Err(e) = db.run_migrations().await
    {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), db.clone());
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    db.close().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
