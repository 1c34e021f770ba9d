use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use studyhub_core::{Gateway, Scraper, SessionStore, StudyAssistant};
use studyhub_server::StudyServer;

mod config;

use config::HubConfig;

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(version)]
#[command(about = "Study Hub — an AI-powered study companion")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,

    /// Start the HTTP server
    Serve,

    /// Store an API key and pick a provider
    Login {
        /// The provider API key
        api_key: String,

        /// Which provider the key belongs to (openai or gemini)
        #[arg(short, long, default_value = "gemini")]
        provider: String,
    },

    /// Forget the stored API key
    Logout,

    /// Summarize study material from a file or stdin
    Summarize {
        /// File to read; omit to read stdin
        file: Option<PathBuf>,

        /// What kind of material this is (article, notes, textbook, ...)
        #[arg(short = 't', long, default_value = "general")]
        content_type: String,
    },

    /// Generate a multiple-choice quiz from a file or stdin
    Quiz {
        /// File to read; omit to read stdin
        file: Option<PathBuf>,

        /// How many questions to generate
        #[arg(short = 'n', long, default_value_t = studyhub_core::DEFAULT_QUIZ_QUESTIONS)]
        questions: usize,
    },

    /// Generate flashcards from a file or stdin
    Flashcards {
        /// File to read; omit to read stdin
        file: Option<PathBuf>,
    },

    /// Ask the study companion a question
    Chat {
        /// The message to send
        message: String,
    },

    /// Fetch a web page and extract its study content
    Scrape {
        /// The page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Login { api_key, provider } => cmd_login(&cli.config, &api_key, &provider).await,
        Commands::Logout => cmd_logout(&cli.config).await,
        Commands::Summarize { file, content_type } => {
            let content = read_content(file.as_deref())?;
            let assistant = build_assistant(&cli.config)?;
            println!("{}", assistant.summarize(&content, &content_type).await?);
            Ok(())
        }
        Commands::Quiz { file, questions } => {
            let content = read_content(file.as_deref())?;
            let assistant = build_assistant(&cli.config)?;
            println!("{}", assistant.quiz(&content, questions).await?);
            Ok(())
        }
        Commands::Flashcards { file } => {
            let content = read_content(file.as_deref())?;
            let assistant = build_assistant(&cli.config)?;
            println!("{}", assistant.flashcards(&content).await?);
            Ok(())
        }
        Commands::Chat { message } => {
            let assistant = build_assistant(&cli.config)?;
            println!("{}", assistant.chat(&message).await?);
            Ok(())
        }
        Commands::Scrape { url } => cmd_scrape(&url).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("Study hub initialized at {}", config_dir.display());
    println!(
        "Run `studyhub login <api-key> --provider <openai|gemini>` to connect a provider."
    );
    Ok(())
}

fn cmd_config(path: &Option<PathBuf>) -> Result<()> {
    let config = HubConfig::load(path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

async fn cmd_serve(path: &Option<PathBuf>) -> Result<()> {
    let config = HubConfig::load(path)?;
    let server = StudyServer::new(config.bind_addr()?, config.gateway_config(), config.data_dir());
    server.run().await
}

async fn cmd_login(path: &Option<PathBuf>, api_key: &str, provider: &str) -> Result<()> {
    let config = HubConfig::load(path)?;
    let sessions = SessionStore::open(&config.data_dir());
    let session = sessions.login(api_key, provider.parse()?).await?;
    println!("Logged in with {}", session.provider);
    Ok(())
}

async fn cmd_logout(path: &Option<PathBuf>) -> Result<()> {
    let config = HubConfig::load(path)?;
    let sessions = SessionStore::open(&config.data_dir());
    sessions.logout().await?;
    println!("Logged out");
    Ok(())
}

async fn cmd_scrape(url: &str) -> Result<()> {
    let result = Scraper::new().scrape(url).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_assistant(path: &Option<PathBuf>) -> Result<Arc<StudyAssistant>> {
    let config = HubConfig::load(path)?;
    let sessions = Arc::new(SessionStore::open(&config.data_dir()));
    let gateway = Arc::new(Gateway::new(sessions, config.gateway_config()));
    Ok(Arc::new(StudyAssistant::new(gateway)))
}

fn read_content(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let content = std::io::read_to_string(std::io::stdin())
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}
