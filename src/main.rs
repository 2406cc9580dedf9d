use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sahayak::classify::{EmotionClassifier, LanguageClassifier};
use sahayak::preferences::PreferenceStore;
use sahayak::{Config, Daemon};

/// Sahayak - a wake-word voice assistant that listens for mood and language
#[derive(Parser)]
#[command(name = "sahayak", version, about)]
struct Cli {
    /// Port for the HTTP API
    #[arg(long, env = "SAHAYAK_PORT")]
    port: Option<u16>,

    /// Don't serve the HTTP API
    #[arg(long)]
    no_api: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Detect language and emotion of a sentence
    Classify {
        /// Text to classify
        text: String,
    },
    /// Arm the wake detector on startup
    Enable,
    /// Start in manual-wake mode
    Disable,
    /// Show preference and config locations
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,sahayak=info",
        1 => "info,sahayak=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Command::Classify { text }) = &cli.command {
        classify(text);
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let store = PreferenceStore::new(config.preferences_path());

    match cli.command {
        Some(Command::Enable) => {
            store.set_enabled(true)?;
            println!("Assistant enabled: \"{}\" will wake me", config.assistant.wake_phrase);
        }
        Some(Command::Disable) => {
            store.set_enabled(false)?;
            println!("Assistant disabled: manual wake only");
        }
        Some(Command::Status) => {
            let prefs = store.load();
            println!("Enabled:     {}", prefs.enabled);
            println!("Wake phrase: {}", config.assistant.wake_phrase);
            println!("Model:       {}", config.llm.model);
            println!("Backend key: {}", if config.llm.api_key.is_some() { "set" } else { "not set" });
            println!("Preferences: {}", store.path().display());
            if let Some(path) = sahayak::config::config_file_path() {
                println!("Config file: {}", path.display());
            }
        }
        Some(Command::Classify { .. }) | None => {
            Daemon::new(config, !cli.no_api).run().await?;
        }
    }

    Ok(())
}

fn classify(text: &str) {
    let language = LanguageClassifier::classify(text);
    let emotion = EmotionClassifier::classify(text);

    println!(
        "Language: {} ({}) score {}",
        language.value.name(),
        language.value.code(),
        language.score
    );
    println!(
        "Emotion:  {} - {} score {}",
        emotion.value,
        emotion.value.description(),
        emotion.score
    );
}
