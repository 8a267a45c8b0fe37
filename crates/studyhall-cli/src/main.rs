//! studyhall command-line client.
//!
//! A thin consumer of the session core: sign up, sign in, show the current
//! session, refresh it, and sign out. Exists mainly to exercise the
//! published session API outside of tests.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use studyhall_core::api::IdentityClient;
use studyhall_core::auth::{CredentialStore, KeyringStore, SessionManager};
use studyhall_core::config::Config;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: studyhall <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  signup [email]   Create an account and sign in");
    eprintln!("  signin [email]   Sign in to an existing account");
    eprintln!("  whoami           Show the current session (default)");
    eprintln!("  refresh          Re-resolve the current user");
    eprintln!("  signout          Sign out and clear the stored credential");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = Config::load()?;
    let identity = Arc::new(IdentityClient::new(&config.service_url)?);
    let store: Arc<dyn CredentialStore> = Arc::new(KeyringStore::new());
    let session = SessionManager::new(identity, store);

    info!(service_url = %config.service_url, "studyhall starting");
    session.initialize().await;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("signup") => credential_command(&session, &mut config, args.get(2), true).await,
        Some("signin") => credential_command(&session, &mut config, args.get(2), false).await,
        Some("signout") => {
            session.signout().await?;
            println!("Signed out.");
            Ok(())
        }
        Some("refresh") => {
            session.refresh_user().await?;
            whoami(&session);
            Ok(())
        }
        Some("whoami") | None => {
            whoami(&session);
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    }
}

async fn credential_command(
    session: &SessionManager,
    config: &mut Config,
    email_arg: Option<&String>,
    signup: bool,
) -> Result<()> {
    let email = match email_arg {
        Some(email) => email.clone(),
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let user = if signup {
        session.signup(&email, &password).await?
    } else {
        session.signin(&email, &password).await?
    };

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
    }

    println!("Signed in as {} ({})", user.email, user.id);
    Ok(())
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        match last_email {
            Some(last) => Ok(last.to_string()),
            None => anyhow::bail!("An email address is required"),
        }
    } else {
        Ok(trimmed.to_string())
    }
}

fn whoami(session: &SessionManager) {
    let state = session.current_session();
    match state.user {
        Some(user) => println!("Signed in as {} ({})", user.email, user.id),
        None => println!("Not signed in."),
    }
}
