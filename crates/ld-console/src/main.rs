//! Lucky Draw operator console
//!
//! Usage:
//!   luckydraw run [CONFIG]        - Run a ceremony, commands on stdin
//!   luckydraw plan [CONFIG]       - Print each award's round schedule
//!   luckydraw validate CONFIG     - Check a configuration file
//!
//! Without a CONFIG the built-in demo (88 seats, three awards) is used.

mod input;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use ld_ceremony::{Ceremony, CeremonyDriver, CeremonyEvent, CeremonyTrace, DriverError};
use ld_draw::{CeremonyConfig, TimingProfile};

use crate::input::{HELP, Input, parse_line};

#[derive(Parser)]
#[command(name = "luckydraw", about = "Lucky draw ceremony console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ceremony, reading operator commands from stdin
    Run {
        /// Ceremony configuration (JSON or YAML)
        config: Option<PathBuf>,

        /// Fixed sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Timing profile (normal, brisk, instant)
        #[arg(long)]
        timing: Option<TimingProfile>,

        /// Event output format
        #[arg(long, value_enum, default_value = "text")]
        events: EventFormat,

        /// Print rolling preview frames in text mode
        #[arg(long)]
        show_preview: bool,

        /// Write the ceremony record here on quit
        #[arg(long)]
        trace: Option<PathBuf>,
    },
    /// Print the round schedule of every award
    Plan {
        config: Option<PathBuf>,
    },
    /// Check a configuration file
    Validate {
        config: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EventFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            timing,
            events,
            show_preview,
            trace,
        } => {
            let mut config = load_config(config.as_deref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(timing) = timing {
                config.timing = timing;
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("Failed to start runtime")?;
            runtime.block_on(run(config, events, show_preview, trace))
        }
        Commands::Plan { config } => plan(&load_config(config.as_deref())?),
        Commands::Validate { config } => {
            let config = load_config(Some(&config))?;
            println!(
                "ok: {} participants, {} awards, {} winners in total",
                config.roster.len(),
                config.awards.len(),
                config.total_target()
            );
            Ok(())
        }
    }
}

/// Read and validate a configuration file, or fall back to the demo
fn load_config(path: Option<&Path>) -> Result<CeremonyConfig> {
    match path {
        Some(path) => CeremonyConfig::load(path).with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let mut config = CeremonyConfig::demo();
            config.validate().context("Invalid demo configuration")?;
            Ok(config)
        }
    }
}

fn plan(config: &CeremonyConfig) -> Result<()> {
    for (name, rounds) in config.schedules() {
        let rounds: Vec<String> = rounds.iter().map(u32::to_string).collect();
        println!("{}: {}", name, rounds.join(" + "));
    }
    println!(
        "{} winners from {} participants",
        config.total_target(),
        config.roster.len()
    );
    Ok(())
}

async fn run(config: CeremonyConfig, format: EventFormat, show_preview: bool, trace_path: Option<PathBuf>) -> Result<()> {
    let ceremony = Ceremony::from_config(&config).context("Failed to build ceremony")?;
    let driver = CeremonyDriver::spawn(ceremony, config.timing_config());
    let printer = tokio::spawn(print_events(
        driver.subscribe(),
        format,
        show_preview,
        CeremonyTrace::new(config.title.clone()),
    ));
    let handle = driver.handle();

    log::info!("[Console] {} participants, {} awards", config.roster.len(), config.awards.len());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("! {}", e);
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Status => println!("{}", render::status(&handle.snapshot().await?)),
            Input::Board => println!("{}", render::board(&handle.snapshot().await?.standings)),
            Input::Command(command) => match handle.send(command).await {
                Ok(_) => {}
                Err(DriverError::Ceremony(e)) if e.is_recoverable() => eprintln!("! {}", e),
                Err(e) => return Err(e.into()),
            },
        }
    }

    let ceremony = driver.shutdown().await?;
    let trace = printer.await.context("Event printer failed")?;

    println!("{}", render::board(&ceremony.standings()));
    if let Some(path) = trace_path {
        tokio::fs::write(&path, trace.to_json()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("[Console] wrote {} events to {}", trace.len(), path.display());
    }
    Ok(())
}

async fn print_events(
    mut rx: broadcast::Receiver<CeremonyEvent>,
    format: EventFormat,
    show_preview: bool,
    mut trace: CeremonyTrace,
) -> CeremonyTrace {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::warn!("[Console] skipped {} events", missed);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        trace.record(&event);

        match format {
            EventFormat::Json => match serde_json::to_string(&event) {
                Ok(json) => println!("{}", json),
                Err(e) => log::warn!("[Console] cannot encode event: {}", e),
            },
            EventFormat::Text => {
                if let Some(line) = render::event_line(&event, show_preview) {
                    println!("{}", line);
                }
            }
        }
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_demo_used_without_a_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.roster.len(), 88);
        assert_eq!(config.total_target(), 19);
    }

    #[test]
    fn test_file_configs_come_back_normalized() {
        let file = write_config(
            ".yaml",
            "roster:\n  - name: Ann\nawards:\n  - name: Lucky\n    target_count: 1\n    batch_size: 0\n",
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.awards[0].batch_size, None);
    }

    #[test]
    fn test_invalid_file_names_the_path() {
        let file = write_config(".json", r#"{ "awards": [ { "name": "  ", "target_count": 1 } ] }"#);
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
        assert!(format!("{err:#}").contains("empty name"));
    }
}
