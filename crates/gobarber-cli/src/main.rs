//! GoBarber CLI - sign in to GoBarber and manage the stored session.
//!
//! One session store is built at startup and handed to whichever command
//! runs, so every command sees the same restored session.

mod commands;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gobarber_core::{ApiClient, Config, SessionStore, StorageBackend};

#[derive(Parser)]
#[command(name = "gobarber", version, about = "GoBarber command-line client")]
struct Cli {
    /// Where to keep the session (memory, file or keyring)
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    /// API base URL (overrides config and GOBARBER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// Replace the stored user profile
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        avatar_url: Option<String>,
        /// User id, required when no one is signed in
        #[arg(long)]
        id: Option<String>,
    },
    /// Set a new password using the link from the reset email
    ResetPassword {
        #[arg(long)]
        link: String,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
    let backend = cli.storage.unwrap_or(config.storage);
    let data_dir = Config::data_dir()?;
    debug!(%api_url, %backend, ?data_dir, "Configuration resolved");

    let api = ApiClient::new(&api_url)?;
    let store = SessionStore::new(api, backend.open(&data_dir));
    info!(authenticated = store.is_authenticated(), "Session store ready");

    match cli.command {
        Command::SignIn { email } => commands::sign_in(&store, &mut config, email).await,
        Command::SignOut => commands::sign_out(&store),
        Command::Whoami => commands::whoami(&store),
        Command::UpdateProfile {
            name,
            email,
            avatar_url,
            id,
        } => commands::update_profile(&store, id, name, email, avatar_url),
        Command::ResetPassword { link } => commands::reset_password(&store, &link).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sign_in_with_global_flags() {
        let cli = Cli::try_parse_from([
            "gobarber",
            "sign-in",
            "--email",
            "johndoe@test.com",
            "--storage",
            "keyring",
        ])
        .unwrap();
        assert_eq!(cli.storage, Some(StorageBackend::Keyring));
        assert!(matches!(
            cli.command,
            Command::SignIn { email: Some(ref e) } if e == "johndoe@test.com"
        ));
    }

    #[test]
    fn test_parse_update_profile() {
        let cli = Cli::try_parse_from([
            "gobarber",
            "update-profile",
            "--name",
            "John Doe",
            "--email",
            "johndoe@test.com",
            "--avatar-url",
            "image.jpg",
        ])
        .unwrap();
        match cli.command {
            Command::UpdateProfile {
                name,
                avatar_url,
                id,
                ..
            } => {
                assert_eq!(name, "John Doe");
                assert_eq!(avatar_url.as_deref(), Some("image.jpg"));
                assert_eq!(id, None);
            }
            _ => panic!("expected update-profile"),
        }
    }

    #[test]
    fn test_rejects_unknown_storage() {
        assert!(Cli::try_parse_from(["gobarber", "whoami", "--storage", "redis"]).is_err());
    }
}
