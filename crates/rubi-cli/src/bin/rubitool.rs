use std::path::Path;

use clap::{Parser, Subcommand};

use rubi_cli::commands::{config_ops, doc_ops};

#[derive(Parser)]
#[command(name = "rubitool", about = "Reading annotation diagnostics")]
struct Cli {
    /// Write JSON trace logs to this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split text into literal and candidate runs
    Segment {
        /// Text to segment
        text: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Attach the engine to a text file and print the resulting markup
    Annotate {
        /// Dictionary file or asset directory
        dict_file: String,
        /// Text file, one paragraph per line
        file: String,
        /// Annotate every candidate before printing
        #[arg(long)]
        toggle_all: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(dir) = &cli.trace_dir {
        rubi_engine::trace_init::init_tracing(Path::new(dir));
    }

    match cli.command {
        Command::Segment { text, json } => doc_ops::segment(&text, json),
        Command::Annotate {
            dict_file,
            file,
            toggle_all,
        } => doc_ops::annotate(&dict_file, &file, toggle_all),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
