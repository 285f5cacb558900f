use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ideahub::config::ConfigError;
use ideahub::render;
use ideahub::types::NewIdea;
use ideahub::{ClientConfig, ClientError, IdeaHubClient, SessionState, api};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("server unhealthy: status {0}")]
    Unhealthy(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Parser, Debug)]
#[command(name = "ideahub", about = "IdeaHub client: browse, create, and like ideas")]
struct Cli {
    /// API base address; overrides the same-origin `/api` default.
    #[arg(long, global = true, env = "IDEAHUB_API_BASE")]
    api_base: Option<String>,

    /// File holding the session token.
    #[arg(long, global = true, env = "IDEAHUB_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session token.
    Login {
        #[arg(long, default_value = "demo")]
        username: String,
        #[arg(long, default_value = "demo")]
        password: String,
    },
    /// Forget the session token.
    Logout,
    /// Show the navigation bar for the current session.
    Status,
    Ideas(IdeasCommand),
    Users(UsersCommand),
    /// Check the API health endpoint.
    Ping,
    /// Print the resolved configuration.
    Config,
}

#[derive(Args, Debug)]
struct IdeasCommand {
    #[command(subcommand)]
    command: IdeasSubcommand,
}

#[derive(Subcommand, Debug)]
enum IdeasSubcommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Like {
        idea_id: i64,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Me,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ideahub=warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env_with_api_base(cli.api_base.as_deref())?;
    if let Some(token_file) = cli.token_file {
        config = config.with_token_file(token_file);
    }

    if matches!(cli.command, Command::Config) {
        print_config(&config);
        return Ok(());
    }

    let client = IdeaHubClient::from_config(&config)?;
    watch_session(&client);

    match cli.command {
        Command::Login { username, password } => run_login(&client, &username, &password).await,
        Command::Logout => {
            client.logout();
            println!("{}", render::nav_bar(client.state()));
            Ok(())
        }
        Command::Status => {
            println!("{}", render::nav_bar(client.state()));
            Ok(())
        }
        Command::Ideas(ideas) => run_ideas(&client, ideas).await,
        Command::Users(users) => run_users(&client, users).await,
        Command::Ping => run_ping(&client).await,
        Command::Config => Ok(()),
    }
}

/// Log every session transition for as long as the client lives.
fn watch_session(client: &IdeaHubClient) {
    let mut observer = client.subscribe();
    tokio::spawn(async move {
        while let Some(session) = observer.changed().await {
            info!(state = ?session.state(), "session changed");
        }
    });
}

async fn run_login(client: &IdeaHubClient, username: &str, password: &str) -> Result<(), CliError> {
    match client.login(username, password).await {
        Ok(()) => {
            println!("Logged in as {username}");
            println!("{}", render::nav_bar(client.state()));
            Ok(())
        }
        Err(ClientError::Authentication { message }) => Err(CliError::LoginFailed(message)),
        Err(e) => Err(e.into()),
    }
}

async fn run_ideas(client: &IdeaHubClient, ideas: IdeasCommand) -> Result<(), CliError> {
    let http = client.http();
    let list = match ideas.command {
        IdeasSubcommand::List => api::list_ideas(http).await?,
        IdeasSubcommand::Create { title, description } => {
            api::create_idea(http, &NewIdea::new(title, description)).await?;
            api::list_ideas(http).await?
        }
        IdeasSubcommand::Like { idea_id } => api::like_idea(http, idea_id).await?,
    };
    let can_like = client.state() == SessionState::Authenticated;
    println!("{}", render::idea_list(&list, can_like));
    Ok(())
}

async fn run_users(client: &IdeaHubClient, users: UsersCommand) -> Result<(), CliError> {
    if client.state() == SessionState::Anonymous {
        println!("{}", render::USERS_LOGIN_PROMPT);
        return Ok(());
    }
    let http = client.http();
    match users.command {
        UsersSubcommand::List => {
            let list = api::list_users(http).await?;
            println!("{}", render::user_list(&list));
        }
        UsersSubcommand::Me => {
            let me = api::current_user(http).await?;
            println!("{} (id {})", me.username, me.id);
        }
    }
    Ok(())
}

async fn run_ping(client: &IdeaHubClient) -> Result<(), CliError> {
    let health = api::health(client.http()).await?;
    if !health.is_ok() {
        return Err(CliError::Unhealthy(health.status));
    }
    println!("ok {}", health.timestamp.unwrap_or_default());
    Ok(())
}

fn print_config(config: &ClientConfig) {
    let source = if config.api_base_overridden { "explicit" } else { "same-origin" };
    println!("api_base: {} ({source})", config.api_base);
    println!("origin: {}", config.origin);
    println!("allowed_hosts: {}", config.allowed_hosts.join(", "));
    println!("token_file: {}", config.token_file.display());
    println!(
        "timeouts: request={}s connect={}s",
        config.timeouts.request_secs, config.timeouts.connect_secs
    );
}
