//! CLI binary for cangalha.

use cangalha::llm::OpenAiClient;
use cangalha::platform::{Camera, ConsolePlatform, ConsoleSpeech, ImageFileCamera};
use cangalha::web::{SearchLookup, WebLookup};
use cangalha::{
    Assistant, AssistantConfig, Collaborators, HistoryStore, LocalStore, Origin, Session, Turn,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Cangalha: Portuguese voice assistant.
#[derive(Parser)]
#[command(name = "cangalha", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Interactive session, one utterance per line.
    Chat {
        /// Treat every line as spoken input.
        #[arg(long)]
        voice: bool,
    },

    /// Handle a single utterance.
    Ask {
        /// The utterance.
        #[arg(required = true)]
        text: Vec<String>,

        /// Treat the utterance as spoken input.
        #[arg(long)]
        voice: bool,
    },

    /// Print the conversation history.
    History {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete the conversation history.
    ClearHistory,

    /// Turn spoken replies on or off.
    Speak {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Identify the objects in an image.
    Describe {
        /// JPEG file.
        image: PathBuf,
    },

    /// Extract the text of a photographed document.
    Read {
        /// JPEG file.
        image: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cangalha=info,cangalha_search=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let data_dir = config.storage.resolved_dir();
    let store = Arc::new(LocalStore::open(&data_dir)?);
    info!(dir = %data_dir.display(), "storage opened");

    match cli.command.unwrap_or(Command::Chat { voice: false }) {
        Command::Chat { voice } => run_chat(&config, store, origin(voice)).await,
        Command::Ask { text, voice } => {
            let assistant = build_assistant(&config, store, None)?;
            report(assistant.handle(&text.join(" "), origin(voice)).await);
            Ok(())
        }
        Command::History { json } => print_history(&HistoryStore::new(store), json),
        Command::ClearHistory => {
            HistoryStore::new(store).clear()?;
            println!("Histórico limpo com sucesso");
            Ok(())
        }
        Command::Speak { state } => {
            let enabled = matches!(state, Toggle::On);
            Session::new(store).set_speak_enabled(enabled)?;
            println!("Fala {}", if enabled { "ativada" } else { "desativada" });
            Ok(())
        }
        Command::Describe { image } => run_camera(&config, store, image, "abrir câmera").await,
        Command::Read { image } => run_camera(&config, store, image, "ler documento").await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AssistantConfig> {
    if let Some(path) = path {
        return Ok(AssistantConfig::from_file(path)?);
    }
    let default_path = AssistantConfig::default_config_path();
    if default_path.is_file() {
        Ok(AssistantConfig::from_file(&default_path)?)
    } else {
        Ok(AssistantConfig::default())
    }
}

fn origin(voice: bool) -> Origin {
    if voice { Origin::Voice } else { Origin::Typed }
}

fn build_assistant(
    config: &AssistantConfig,
    store: Arc<LocalStore>,
    camera: Option<Arc<dyn Camera>>,
) -> anyhow::Result<Assistant> {
    let client = OpenAiClient::new(&config.completion)?;
    if !client.has_api_key() {
        warn!("no API key configured, set OPENAI_API_KEY or completion.api_key");
    }

    let web: Option<Arc<dyn WebLookup>> = match SearchLookup::new(config.search.clone()) {
        Ok(lookup) => Some(Arc::new(lookup)),
        Err(e) => {
            warn!(error = %e, "web search disabled");
            None
        }
    };

    let assistant = Assistant::new(
        config,
        Collaborators {
            platform: Arc::new(ConsolePlatform::new()),
            speech: Arc::new(ConsoleSpeech::new()),
            completion: Arc::new(client),
            store,
            web,
            camera,
        },
    );
    assistant.restore_theme();
    Ok(assistant)
}

async fn run_chat(
    config: &AssistantConfig,
    store: Arc<LocalStore>,
    origin: Origin,
) -> anyhow::Result<()> {
    println!("Cangalha v{}", env!("CARGO_PKG_VERSION"));
    println!("Diga \"ajuda\" para ver os comandos, \"sair\" para encerrar.\n");

    let assistant = build_assistant(config, store, None)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "sair" | "exit" | "quit") {
            break;
        }
        report(assistant.handle(&line, origin).await);
    }
    Ok(())
}

async fn run_camera(
    config: &AssistantConfig,
    store: Arc<LocalStore>,
    image: PathBuf,
    utterance: &str,
) -> anyhow::Result<()> {
    let camera: Arc<dyn Camera> = Arc::new(ImageFileCamera::new(image));
    let assistant = build_assistant(config, store, Some(camera))?;
    report(assistant.handle(utterance, Origin::Typed).await);
    Ok(())
}

fn report(turn: Turn) {
    match turn {
        Turn::Command(outcome) => info!(category = %outcome.category, "command handled"),
        Turn::Reply(reply) => info!(shape = ?reply.shape, assertive = reply.assertive, "replied"),
        Turn::Failed(e) => warn!(error = %e, "completion failed"),
        Turn::Dropped | Turn::Ignored => {}
    }
}

fn print_history(history: &HistoryStore, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", history.export()?);
        return Ok(());
    }
    if history.is_empty() {
        println!("Nenhuma conversa no histórico");
        return Ok(());
    }
    for entry in history.all() {
        println!(
            "[{}] Você: {}\n    Cangalha: {}\n",
            entry.timestamp.format("%d/%m/%Y %H:%M"),
            entry.user,
            entry.assistant
        );
    }
    Ok(())
}
