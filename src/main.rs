//! `modplay` command line tool
//!
//! - `modplay info <FILE> [--json]` prints the song header, samples and order
//! - `modplay render <FILE> -o <OUT.wav>` renders the song to a WAV file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use modplay::export::{export_to_wav, ExportConfig};
use modplay::{LoadSummary, MixingMode, ModFileLoader, ModPlayer, PlayerConfig, Standard};

#[derive(Parser)]
#[command(name = "modplay")]
#[command(about = "Amiga ProTracker MOD player", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print song metadata
    Info {
        /// Module file
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render a module to a 16-bit stereo WAV file
    Render {
        /// Module file
        file: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Video standard
        #[arg(long, value_enum)]
        standard: Option<StandardArg>,

        /// Speaker layout
        #[arg(long, value_enum)]
        mixing: Option<MixingArg>,

        /// Output sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Stop after this many seconds
        #[arg(long)]
        max_seconds: Option<f32>,

        /// Stop the first time the song loops
        #[arg(long)]
        stop_on_loop: bool,

        /// JSON player configuration; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StandardArg {
    Pal,
    Ntsc,
}

impl From<StandardArg> for Standard {
    fn from(arg: StandardArg) -> Self {
        match arg {
            StandardArg::Pal => Standard::Pal,
            StandardArg::Ntsc => Standard::Ntsc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MixingArg {
    Amiga,
    Stereo,
    Mono,
}

impl From<MixingArg> for MixingMode {
    fn from(arg: MixingArg) -> Self {
        match arg {
            MixingArg::Amiga => MixingMode::Amiga,
            MixingArg::Stereo => MixingMode::Stereo,
            MixingArg::Mono => MixingMode::Mono,
        }
    }
}

fn print_summary(summary: &LoadSummary) {
    println!("Title:     {}", summary.name);
    println!("Format:    {}", summary.format_tag);
    println!("Channels:  {}", summary.num_channels);
    println!("Positions: {}", summary.num_positions);
    println!("Restart:   {}", summary.restart_position);
    println!("Patterns:  {}", summary.num_patterns);
    if !summary.has_standard_notes {
        println!("Notes:     off the standard period table");
    }
    println!();
    println!(" #  Name                    Length Vol FT  Loop");
    for sample in summary.samples.iter().filter(|s| s.length > 0) {
        println!(
            "{:>2}  {:<22} {:>6} {:>3} {:>2} {:>6}+{}",
            sample.number,
            sample.name,
            sample.length,
            sample.volume,
            sample.fine_tune,
            sample.loop_offset,
            sample.loop_length
        );
    }
}

fn info(file: PathBuf, json: bool) -> Result<()> {
    let data = ModFileLoader::read(&file)?;
    let mut player = ModPlayer::new();
    let summary = player
        .load(&data)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render(
    file: PathBuf,
    output: PathBuf,
    standard: Option<StandardArg>,
    mixing: Option<MixingArg>,
    sample_rate: Option<u32>,
    max_seconds: Option<f32>,
    stop_on_loop: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut player_config = match config {
        Some(path) => PlayerConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PlayerConfig::default(),
    };
    if let Some(standard) = standard {
        player_config.standard = standard.into();
    }
    if let Some(mixing) = mixing {
        player_config.mixing_mode = mixing.into();
    }
    if let Some(rate) = sample_rate {
        player_config.sample_rate = rate;
    }

    let mut player = ModPlayer::with_config(player_config)?;
    let data = ModFileLoader::read(&file)?;
    let summary = player
        .load(&data)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    log::info!(
        "Rendering '{}' ({}, {} channels, {}, {} mixing, {} Hz)",
        summary.name,
        summary.format_tag,
        summary.num_channels,
        player_config.standard,
        player_config.mixing_mode,
        player_config.sample_rate
    );

    let export = ExportConfig {
        max_seconds,
        stop_on_loop,
    };
    let result = export_to_wav(&mut player, &output, export)
        .with_context(|| format!("Failed to render {}", output.display()))?;

    println!(
        "Wrote {} ({:.1}s{})",
        output.display(),
        result.seconds(),
        if result.looped { ", stopped at loop" } else { "" }
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Info { file, json } => info(file, json),
        Command::Render {
            file,
            output,
            standard,
            mixing,
            sample_rate,
            max_seconds,
            stop_on_loop,
            config,
        } => render(
            file,
            output,
            standard,
            mixing,
            sample_rate,
            max_seconds,
            stop_on_loop,
            config,
        ),
    }
}
