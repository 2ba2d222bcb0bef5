use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use samvad_avatar::ClipIndex;
use samvad_core::config::{LoggingConfig, SamvadConfig, ServerConfig};
use samvad_core::types::Utterance;
use samvad_gateway::GatewayState;
use samvad_gloss::{GlossConverter, RuleTagger};
use samvad_media::{HttpSynthesizer, HttpTranscriber, Synthesizer, Transcriber};
use samvad_pipeline::{Pipeline, ProgressSink};
use samvad_transcreate::Transcreator;

#[derive(Parser)]
#[command(
    name = "samvad",
    about = "Real-time speech and text to Indian Sign Language translation gateway",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Force debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the WebSocket and HTTP gateway
    Serve {
        /// Port to listen on (default: 8790)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Convert a line of text to ISL gloss and print the result
    Convert {
        /// Text to convert
        text: String,

        /// Source language tag
        #[arg(short, long, default_value = "hi-IN")]
        language: String,
    },

    /// Run a recorded audio file through the full batch pipeline
    Process {
        /// Audio file to process
        file: String,

        /// Source language hint (omit for auto-detection)
        #[arg(short, long)]
        language: Option<String>,

        /// Write the result JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect or check the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Check the configuration and report problems
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config loads before logging so the logging section can take effect
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("samvad.json"));

    let mut config = SamvadConfig::load(&config_path)?;

    init_logging(config.logging.clone().unwrap_or_default(), cli.verbose);

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                match config.server.as_mut() {
                    Some(server) => server.port = port,
                    None => {
                        config.server = Some(ServerConfig {
                            port,
                            ..Default::default()
                        })
                    }
                }
            }

            let (warnings, errors) = config.validate();
            for warning in &warnings {
                tracing::warn!("{warning}");
            }
            if !errors.is_empty() {
                for error in &errors {
                    tracing::error!("{error}");
                }
                anyhow::bail!("Configuration has {} error(s)", errors.len());
            }

            let config = Arc::new(config);
            let (pipeline, transcriber) = build_pipeline(&config);
            let state = Arc::new(GatewayState::new(config.clone(), pipeline, transcriber));

            tracing::info!("Starting Samvad gateway on port {}", config.server_port());
            samvad_gateway::start_gateway(state).await?;
        }
        Commands::Convert { text, language } => {
            let (pipeline, _) = build_pipeline(&config);
            let result = pipeline
                .process_utterance(&Utterance::from_text(&text, &language))
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Process {
            file,
            language,
            output,
        } => {
            let audio = tokio::fs::read(&file).await?;
            let max_bytes = config.max_upload_bytes();
            if audio.len() > max_bytes {
                anyhow::bail!("File too large (max {}MB)", max_bytes / (1024 * 1024));
            }

            let (pipeline, _) = build_pipeline(&config);

            let (tx, mut rx) =
                tokio::sync::mpsc::unbounded_channel::<samvad_core::protocol::ProgressPayload>();
            let printer = tokio::spawn(async move {
                while let Some(update) = rx.recv().await {
                    eprintln!("[{:>3}%] {}", update.percent, update.message);
                }
            });

            let sink = ProgressSink::new(tx);
            let outcome = pipeline.run_media(audio, language.as_deref(), &sink).await;

            // Close the channel so the printer drains and exits before we report
            drop(sink);
            let _ = printer.await;

            let result = outcome?;
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &json).await?;
                    tracing::info!("Result written to {path}");
                }
                None => println!("{json}"),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if errors.is_empty() {
                    println!("Configuration OK ({} warnings)", warnings.len());
                } else {
                    anyhow::bail!("Configuration has {} error(s)", errors.len());
                }
            }
        },
    }

    Ok(())
}

/// RUST_LOG wins over the config file; `--verbose` forces debug level.
fn init_logging(logging: LoggingConfig, verbose: bool) {
    let mut directives = if verbose {
        "debug".to_string()
    } else {
        logging.level.clone().unwrap_or_else(|| "info".to_string())
    };
    for filter in &logging.filters {
        directives.push(',');
        directives.push_str(filter);
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));

    if logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// Build the shared pipeline and its collaborators from config.
///
/// The transcriber is returned separately because the gateway also feeds
/// stream chunks straight into it, outside the batch pipeline.
fn build_pipeline(config: &SamvadConfig) -> (Arc<Pipeline>, Arc<dyn Transcriber>) {
    let transcriber: Arc<dyn Transcriber> = Arc::new(HttpTranscriber::new(
        config.transcription.clone().unwrap_or_default(),
    ));
    let transcreator = Arc::new(Transcreator::from_config(
        &config.transcreation.clone().unwrap_or_default(),
    ));
    let clips = Arc::new(ClipIndex::build(
        config.clips_dir(),
        &config.clip_public_prefix(),
    ));
    tracing::info!(clips = clips.len(), "Sign clip index ready");
    let synthesizer: Arc<dyn Synthesizer> = Arc::new(HttpSynthesizer::new(
        config.synthesis.clone().unwrap_or_default(),
    ));

    // The rule tagger is always available; a model-backed tagger would slot
    // in here and the converter falls back to its static rules whenever the
    // analysis declines.
    let converter = GlossConverter::with_tagger(Arc::new(RuleTagger::new()));

    let pipeline = Pipeline::new(
        transcriber.clone(),
        transcreator,
        converter,
        clips,
        synthesizer,
        config,
    );
    (Arc::new(pipeline), transcriber)
}
