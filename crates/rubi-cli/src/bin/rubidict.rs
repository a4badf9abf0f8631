use clap::{Parser, Subcommand};

use rubi_cli::commands::dict_ops;

#[derive(Parser)]
#[command(name = "rubidict", about = "Reading dictionary build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a TSV source (surface, reading, optional cost) into a binary dictionary
    Compile {
        /// Input TSV file
        tsv_file: String,
        /// Output file
        output_file: String,
    },
    /// Show dictionary info
    Info {
        /// Dictionary file or asset directory
        dict_file: String,
    },
    /// Look up a surface in the dictionary (exact match)
    Lookup {
        /// Dictionary file or asset directory
        dict_file: String,
        /// Surface to look up
        surface: String,
    },
    /// Tokenize text with the dictionary analyzer
    Analyze {
        /// Dictionary file or asset directory
        dict_file: String,
        /// Text to analyze
        text: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            tsv_file,
            output_file,
        } => dict_ops::compile(&tsv_file, &output_file),
        Command::Info { dict_file } => dict_ops::info(&dict_file),
        Command::Lookup { dict_file, surface } => dict_ops::lookup(&dict_file, &surface),
        Command::Analyze {
            dict_file,
            text,
            json,
        } => dict_ops::analyze(&dict_file, &text, json),
    }
}
