use clap::{Parser, Subcommand};
use scriptune::{CancellationToken, LoggingRenderer, PlaybackConfig, Session};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "scriptune")]
#[command(about = "Parse and play scriptune multi-track sheets")]
struct Cli {
    /// Log every scheduled tone and throttle decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a sheet and print the resulting tracks as YAML
    Check { input: PathBuf },

    /// Play a sheet, logging each tone (Ctrl-C stops playback)
    Play {
        input: PathBuf,

        /// YAML playback config (look-ahead-secs, throttle-tick-secs)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Master volume, 0.0 to 1.0
        #[arg(short, long, default_value = "1.0")]
        master_volume: f32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = run(cli.command).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), scriptune::ScriptuneError> {
    match command {
        Commands::Check { input } => {
            let source = std::fs::read_to_string(&input)?;
            println!("{}", scriptune::check(&source)?);
        }

        Commands::Play {
            input,
            config,
            master_volume,
        } => {
            let source = std::fs::read_to_string(&input)?;
            let config = match config {
                Some(path) => PlaybackConfig::load(path)?,
                None => PlaybackConfig::default(),
            };

            let session = Session::new(LoggingRenderer).with_config(config);
            session.set_master_volume(master_volume);

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupted, stopping playback");
                    on_interrupt.cancel();
                }
            });

            info!("Playing {}", input.display());
            let report = scriptune::play(&session, &source, &cancel).await?;
            if report.was_cancelled() {
                info!("playback stopped early");
            }
            print!("{}", report.to_yaml()?);
        }
    }

    Ok(())
}
