//! Atlasnap terminal client.
//!
//! A small interactive client for the Atlasnap travel-memory service:
//! log in with a password or with Google, and the session survives
//! restarts via the persisted bearer token.

mod api;
mod app;
mod auth;
mod config;
mod messages;
mod models;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::{ApiClient, AuthApi};
use app::App;
use auth::{OauthRedirect, RedirectHandler, SessionStore, SessionValidator};
use config::Config;
use ui::{Navigator, Route, TerminalUi};

/// How long to wait for a validation pass to settle before giving up
/// on showing its outcome. Slightly above the HTTP request timeout.
const VALIDATION_WAIT_SECS: u64 = 35;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Atlasnap client starting");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let store = Arc::new(SessionStore::new(config.token_storage()?)?);
    let api = Arc::new(ApiClient::new(config.base_url(), Arc::clone(&store))?);
    let api: Arc<dyn AuthApi> = api;

    // Revalidates the rehydrated token now and every token change later
    let validator_task =
        SessionValidator::new(Arc::clone(&store), Arc::clone(&api)).spawn();

    let app = App::new(Arc::clone(&store), api);
    let ui = TerminalUi::new(if store.token().is_some() {
        Route::Home
    } else {
        Route::Login
    });

    let result = run(app, config, &ui).await;

    validator_task.abort();
    info!("Atlasnap client shutting down");
    result
}

async fn run(app: App, mut config: Config, ui: &TerminalUi) -> Result<()> {
    println!("Atlasnap — your travel memories, in the terminal");
    println!("Commands: login, register, google, whoami, logout, quit");

    // A rehydrated token is being validated in the background; show the
    // outcome before the first prompt so the user knows where they stand.
    if app.store.token().is_some() {
        print!("Checking saved session... ");
        io::stdout().flush()?;
        await_validation(&app.store).await;
        match app.store.user() {
            Some(user) => println!("welcome back, {}", user.email),
            None => println!("session expired, please log in again"),
        }
    }

    loop {
        print!("{}> ", ui.current_route().path());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }

        match line.trim() {
            "login" => {
                let email = prompt_email(&config.last_email)?;
                let password = rpassword::prompt_password("Password: ")?;
                if app.login(&email, &password, ui, ui).await {
                    await_validation(&app.store).await;
                    match app.store.user() {
                        Some(user) => println!("Logged in as {}", user.email),
                        None => println!("Logged in, but the session could not be validated"),
                    }
                    config.last_email = Some(email);
                    if let Err(e) = config.save() {
                        warn!(error = %e, "Failed to save config");
                    }
                }
            }
            "register" => {
                let email = prompt_email(&None)?;
                let password = rpassword::prompt_password("Password: ")?;
                app.register(&email, &password, ui, ui).await;
            }
            "google" => {
                if let Some(url) = app.google_authorize(ui).await {
                    println!("Open this URL in your browser and sign in:");
                    println!("  {}", url);
                    let pasted = prompt_line("Paste the redirect URL you were sent back to: ")?;
                    match Url::parse(pasted.trim()) {
                        Ok(parsed) => {
                            let redirect = OauthRedirect::parse(&parsed);
                            ui.navigate(Route::OauthCallback);
                            app.complete_google_login(
                                &RedirectHandler::new(),
                                &redirect,
                                ui,
                                ui,
                            );
                            if app.store.token().is_some() {
                                await_validation(&app.store).await;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Unparseable redirect URL");
                            println!("That does not look like a redirect URL.");
                        }
                    }
                }
            }
            "whoami" => {
                let session = app.store.snapshot();
                if session.is_loading {
                    println!("Checking session...");
                } else if let Some(user) = session.user {
                    let verified = if user.is_verified { "verified" } else { "unverified" };
                    println!("[{}] {} ({})", user.initial(), user.email, verified);
                } else if session.token.is_some() {
                    println!("Session pending validation");
                } else {
                    println!("Not logged in");
                }
            }
            "logout" => {
                app.logout(ui);
                println!("Logged out");
            }
            "quit" | "exit" => return Ok(()),
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }
}

/// Wait until an in-flight validation settles: either the session is
/// confirmed or the token is gone.
async fn await_validation(store: &SessionStore) {
    let mut rx = store.subscribe();
    let settled = async {
        loop {
            {
                let session = rx.borrow_and_update();
                if !session.is_loading && (session.is_authenticated || session.token.is_none()) {
                    return;
                }
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(VALIDATION_WAIT_SECS), settled)
        .await
        .is_err()
    {
        warn!("Timed out waiting for session validation");
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_email(last_email: &Option<String>) -> Result<String> {
    match last_email {
        Some(last) => {
            let input = prompt_line(&format!("Email [{}]: ", last))?;
            if input.is_empty() {
                Ok(last.clone())
            } else {
                Ok(input)
            }
        }
        None => prompt_line("Email: "),
    }
}
