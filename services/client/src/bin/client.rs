//! services/client/src/bin/client.rs

use clap::{Parser, Subcommand};
use client_lib::{
    adapters::{FileSessionStore, HttpShopAdapter, MemorySessionStore, WsFeedTransport},
    config::Config,
    error::ClientError,
    live::{
        landing_route, login, logout, register, submit_post, ClientState, LiveView, Notice,
        SessionContext, ViewOptions,
    },
};
use shop_notify_core::{
    ports::SessionStore, ConnectionStatus, Feed, LoginForm, PostForm, RegistrationForm,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "client", about = "Shop notification client")]
struct Cli {
    /// Keep the session in memory only; nothing is written to SESSION_PATH.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Publish a piece of content.
    Post { content: String },
    /// Show whether a session is stored.
    Status,
    /// Show recent posts, then stream live notifications until Ctrl-C.
    Watch {
        /// Skip the recent-posts fetch.
        #[arg(long)]
        no_history: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Initialize Adapters & Session ---
    let store: Arc<dyn SessionStore> = if cli.ephemeral {
        Arc::new(MemorySessionStore::new())
    } else {
        Arc::new(FileSessionStore::new(config.session_path.clone()))
    };
    let session = SessionContext::initialize(store).await;
    let api = Arc::new(HttpShopAdapter::new(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);
    let transport = Arc::new(WsFeedTransport::new(config.connect_timeout));

    let state = ClientState {
        config,
        session,
        api,
        transport,
    };

    // --- 3. Run the Command ---
    let notice = match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            register(
                &state,
                RegistrationForm {
                    username,
                    email,
                    password,
                },
            )
            .await
        }
        Command::Login { email, password } => {
            login(&state, LoginForm { email, password }).await
        }
        Command::Logout => logout(&state).await,
        Command::Post { content } => submit_post(&state, PostForm { content }).await,
        Command::Status => {
            let text = if state.session.is_authenticated() {
                "Logged in"
            } else {
                "Not logged in"
            };
            println!("{} (start at: {:?})", text, landing_route(&state.session));
            return Ok(());
        }
        Command::Watch { no_history } => {
            return watch(
                &state,
                ViewOptions {
                    load_history: !no_history,
                },
            )
            .await;
        }
    };

    match notice {
        Notice::Success(text) => println!("{}", text),
        Notice::Failure(text) => {
            eprintln!("{}", text);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Mounts one live view and prints what it receives until Ctrl-C or disconnect.
async fn watch(state: &ClientState, options: ViewOptions) -> Result<(), ClientError> {
    let mut view = LiveView::mount(state, options);

    if view.history_settled().await.is_some() {
        let posts = view.posts();
        let posts = posts.borrow();
        if posts.is_empty() {
            println!("No posts available.");
        }
        for post in posts.iter() {
            println!(
                "[{}] #{} {}",
                post.created_at.format("%Y-%m-%d %H:%M"),
                post.id,
                post.content
            );
        }
    }

    let mut feed = view.feed();
    let mut status = view.status_updates();
    let mut printed = 0;
    println!("Status: {}", *status.borrow_and_update());

    loop {
        // Feed first: a server close marks both channels changed at once.
        tokio::select! {
            biased;
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let lines = unprinted(&feed.borrow_and_update(), &mut printed);
                for line in lines {
                    println!("{}", line);
                }
            }
            changed = status.changed() => {
                let current = *status.borrow_and_update();
                println!("Status: {}", current);
                if changed.is_err() || current == ConnectionStatus::Closed {
                    break;
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
        }
    }

    let lines = unprinted(&feed.borrow(), &mut printed);
    for line in lines {
        println!("{}", line);
    }
    view.unmount().await;
    Ok(())
}

/// Renders the feed events past `printed` and advances it.
fn unprinted(feed: &Feed, printed: &mut usize) -> Vec<String> {
    let lines = feed
        .events()
        .iter()
        .skip(*printed)
        .map(|event| format!("🔔 {}", event.message()))
        .collect();
    *printed = feed.len();
    lines
}
