use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event};

use board::api::{ApiClient, CredentialProvider, MemoryCredentials};
use board::app::{handlers::handle_key_event, App};
use board::auth::{validate_post, AuthFlow};
use board::config::ConfigManager;
use board::logging::{self, LogConfig};
use board::server_config::{api_base_url, determine_server_url};
use board::session::SessionStore;
use board::share::BrowserShare;
use board::{terminal, ui};
use board_types::{display_date, CreatePostRequest, LoginRequest, SignUpRequest};

/// Board - terminal client for the community board
#[derive(Parser)]
#[command(name = "board")]
#[command(about = "Read, like and comment on board posts from the terminal")]
#[command(version)]
struct Cli {
    /// Server URL to connect to (without the /api suffix)
    #[arg(long, short)]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    /// Use this token instead of the stored session
    #[arg(long, env = "BOARD_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a post in the interactive viewer
    View { post_id: String },
    /// List one page of posts
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create a post
    Write {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "image-id")]
        image_ids: Vec<String>,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOARD_PASSWORD")]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Open the third-party login page in the browser
    Oauth,
    /// Finish a third-party login with the code from the redirect
    OauthCallback { code: String },
    /// Show the logged-in user
    Whoami,
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let config_manager = ConfigManager::new()?;
    let config = config_manager.load_or_default()?;
    let server_url = determine_server_url(cli.server, &config);
    let base_url = api_base_url(&server_url);
    log::info!("Using API at {}", base_url);

    let session_store = SessionStore::with_path(config_manager.token_file());
    let credentials: Arc<dyn CredentialProvider> = match cli.token {
        Some(token) => Arc::new(MemoryCredentials::new(Some(token))),
        None => Arc::new(session_store.clone()),
    };
    let api_client = ApiClient::new(base_url, credentials);

    match cli.command {
        Command::View { post_id } => {
            let share = Box::new(BrowserShare::new(config.share_url.clone()));
            let app = App::new(Arc::new(api_client), config, share);
            run_viewer(app, post_id).await?;
        }
        Command::List { page } => {
            let posts = api_client
                .list_posts(page)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for post in &posts.content {
                let date = post
                    .created_at
                    .as_deref()
                    .and_then(display_date)
                    .unwrap_or_default();
                println!(
                    "{:>6}  {:<22} {:<10} {}  [{} comments, {} likes]",
                    post.id,
                    post.title,
                    post.author.as_deref().unwrap_or("-"),
                    date,
                    post.num_of_comments.unwrap_or(0),
                    post.num_of_recommendations.unwrap_or(0)
                );
            }
            println!("page {} of {}", page, posts.total_pages);
        }
        Command::Write {
            title,
            content,
            image_ids,
        } => {
            let request = CreatePostRequest {
                title,
                content,
                image_ids,
            };
            validate_post(&request)?;
            let created = api_client
                .create_post(&request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            match created.get("id") {
                Some(id) => println!("Created post {}", id),
                None => println!("Post created"),
            }
        }
        Command::Login { email, password } => {
            let flow = AuthFlow::new(api_client, session_store);
            flow.login(&LoginRequest { email, password }).await?;
            println!("Logged in");
        }
        Command::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            let flow = AuthFlow::new(api_client, session_store);
            flow.sign_up(&SignUpRequest {
                username,
                password,
                confirm_password,
                email,
            })
            .await?;
            println!("Account created; log in to continue");
        }
        Command::Oauth => {
            let flow = AuthFlow::new(api_client, session_store);
            let url = flow.start_oauth().await?;
            println!("Continue in your browser: {}", url);
            println!("Then run `board oauth-callback <code>` with the code from the redirect");
        }
        Command::OauthCallback { code } => {
            let flow = AuthFlow::new(api_client, session_store);
            flow.complete_oauth(&code).await?;
            println!("Logged in");
        }
        Command::Whoami => {
            let flow = AuthFlow::new(api_client, session_store);
            match flow.check_existing_session().await? {
                Some(user) => println!("{}", user.username),
                None => println!("Not logged in"),
            }
        }
        Command::Logout => {
            AuthFlow::new(api_client, session_store).logout()?;
            println!("Logged out");
        }
    }

    Ok(())
}

/// Interactive viewer for one post. The terminal is restored even when the
/// loop fails.
async fn run_viewer(mut app: App, post_id: String) -> Result<()> {
    let mut tui = terminal::init()?;
    let result = event_loop(&mut tui, &mut app, post_id).await;
    terminal::restore()?;
    result
}

async fn event_loop(tui: &mut terminal::Tui, app: &mut App, post_id: String) -> Result<()> {
    app.open_post(post_id);

    while app.running {
        let now = Instant::now();
        app.drain_completions(now);
        app.tick(now);

        tui.draw(|frame| ui::render(app, frame)).context("Failed to draw")?;

        // Short poll so throttled likes and completions are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key, Instant::now())?;
            }
        } else {
            tokio::task::yield_now().await;
        }
    }

    app.close_post();
    Ok(())
}
