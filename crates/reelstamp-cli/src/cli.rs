//! Command-line argument model

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use reelstamp_core::MinutesFormula;

#[derive(Debug, Parser)]
#[command(
    name = "reelstamp",
    version,
    about = "Parse, convert and subtract media/subtitle timestamps"
)]
pub struct Cli {
    /// Settings file (JSON). Defaults apply when omitted or missing.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Override the minutes formula from settings
    #[arg(long, global = true, value_enum, value_name = "FORMULA")]
    pub minutes_formula: Option<FormulaArg>,

    /// Print a JSON report instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse HH:MM:SS, HH:MM:SS.mmm or HH:MM:SS,mmm
    Parse {
        timestamp: String,
    },

    /// Build a timestamp from decimal seconds
    FromSeconds {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },

    /// Subtract RIGHT from LEFT
    Sub {
        left: String,
        right: String,
    },

    /// Print an FFmpeg trim filter for START..END
    Trim {
        start: String,
        end: String,

        /// Emit atrim/asetpts instead of trim/setpts
        #[arg(long)]
        audio: bool,

        /// Input stream label, e.g. 0:v
        #[arg(long, requires = "output")]
        input: Option<String>,

        /// Output stream label
        #[arg(long, requires = "input")]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormulaArg {
    Legacy,
    Conventional,
}

impl From<FormulaArg> for MinutesFormula {
    fn from(arg: FormulaArg) -> Self {
        match arg {
            FormulaArg::Legacy => MinutesFormula::Legacy,
            FormulaArg::Conventional => MinutesFormula::Conventional,
        }
    }
}
