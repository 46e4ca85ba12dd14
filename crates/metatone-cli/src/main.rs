//! MetaTone CLI - From a drawing to a sung melody
//!
//! This binary provides commands for generating lyrics from an image,
//! composing them into a MIDI melody, rendering and voice-converting the
//! result, and inspecting MIDI files.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use metatone_cli::commands;
use metatone_cli::config::{load_config, ConfigOverrides};
use metatone_cli::logging;

/// MetaTone - Lyrics, melody and singing from a drawing
#[derive(Parser)]
#[command(name = "metatone")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: $METATONE_CONFIG, then ./metatone.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "metatone_backend_svc=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// SoundFont used for rendering
    #[arg(long, global = true)]
    soundfont: Option<PathBuf>,

    /// So-VITS-SVC repository directory
    #[arg(long, global = true)]
    svc_repo: Option<PathBuf>,

    /// So-VITS-SVC model checkpoint
    #[arg(long, global = true)]
    svc_model: Option<PathBuf>,

    /// So-VITS-SVC model config
    #[arg(long, global = true)]
    svc_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a title and lyrics for a drawing
    Lyrics {
        /// Path to the drawing (PNG)
        #[arg(short, long)]
        image: PathBuf,

        /// Session file to store the generated song in
        #[arg(long)]
        session: Option<PathBuf>,
    },

    /// Compose lyrics into a MIDI melody
    Compose {
        /// Lyrics text file
        #[arg(short, long)]
        lyrics: Option<PathBuf>,

        /// Session file to take the lyrics from when --lyrics is not given
        #[arg(long)]
        session: Option<PathBuf>,

        /// Output MIDI file
        #[arg(short, long)]
        out: PathBuf,

        /// Track name written to the MIDI file
        #[arg(long)]
        title: Option<String>,

        /// Print the note list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose, render and optionally voice-convert lyrics
    Sing {
        /// Lyrics text file
        #[arg(short, long)]
        lyrics: Option<PathBuf>,

        /// Session file to take the lyrics from when --lyrics is not given
        #[arg(long)]
        session: Option<PathBuf>,

        /// Output WAV file for the rough rendering
        #[arg(short, long)]
        out: PathBuf,

        /// Run voice conversion and write the result here (FLAC)
        #[arg(long)]
        convert: Option<PathBuf>,
    },

    /// Print the notes and lyrics of a MIDI file
    Inspect {
        /// MIDI file to read
        #[arg(short, long)]
        midi: PathBuf,

        /// Print the score as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check external tools and configured resources
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let global = cli.global;

    let overrides = ConfigOverrides {
        soundfont: global.soundfont,
        svc_repo: global.svc_repo,
        svc_model: global.svc_model,
        svc_config: global.svc_config,
    };
    let (config, config_source) = match load_config(global.config.as_deref(), &overrides) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            return ExitCode::from(1);
        }
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    logging::init(&logging::filter_directive(
        rust_log.as_deref(),
        global.log_level.as_deref(),
        global.verbose,
        &config.logging.level,
    ));
    if let Some(ref path) = config_source {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let result = match cli.command {
        Commands::Lyrics { image, session } => {
            commands::lyrics::run(&config, &image, session.as_deref())
        }
        Commands::Compose {
            lyrics,
            session,
            out,
            title,
            json,
        } => commands::compose::run(
            &config,
            lyrics.as_deref(),
            session.as_deref(),
            &out,
            title.as_deref(),
            json,
        ),
        Commands::Sing {
            lyrics,
            session,
            out,
            convert,
        } => commands::sing::run(
            &config,
            lyrics.as_deref(),
            session.as_deref(),
            &out,
            convert.as_deref(),
        ),
        Commands::Inspect { midi, json } => commands::inspect::run(&midi, json),
        Commands::Doctor => commands::doctor::run(&config, config_source.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
