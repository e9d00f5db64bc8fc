//! Command-line converter: SAS transport file in, CSV out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xpt2csv::{ReadOptions, TextMode, convert_path};

#[derive(Parser)]
#[command(
    name = "xpt2csv",
    version,
    about = "Convert SAS XPORT (XPT) transport files to CSV"
)]
struct Cli {
    /// Input transport file (defaults to standard input).
    input: Option<PathBuf>,

    /// Output CSV file (defaults to standard output).
    output: Option<PathBuf>,

    /// Decode unrecognized numeric formats as plain numbers instead of
    /// aborting.
    #[arg(long)]
    lenient_formats: bool,

    /// Recognize the legacy byte-pattern encodings for DATE/TIME/DATETIME
    /// columns.
    #[arg(long)]
    legacy_datetimes: bool,

    /// Character encoding handling.
    #[arg(long, value_enum, default_value_t = Encoding::Auto)]
    encoding: Encoding,

    /// Pivot for two-digit years: years at or above it are 19xx.
    #[arg(long, default_value_t = 69)]
    year_pivot: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Encoding {
    /// UTF-8, falling back to Latin-1 on the first invalid sequence.
    Auto,
    /// Strict UTF-8; invalid sequences abort the conversion.
    Utf8,
    /// Latin-1 (ISO-8859-1).
    Latin1,
}

impl Encoding {
    fn text_mode(self) -> TextMode {
        match self {
            Self::Auto => TextMode::Utf8Latin1,
            Self::Utf8 => TextMode::StrictUtf8,
            Self::Latin1 => TextMode::Latin1,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ReadOptions::from_env()
        .with_text_mode(cli.encoding.text_mode())
        .with_year_pivot(cli.year_pivot)
        .with_lenient_formats(cli.lenient_formats)
        .with_legacy_datetime_heuristics(cli.legacy_datetimes);

    match convert_path(cli.input.as_deref(), cli.output.as_deref(), &options) {
        Ok(document) => {
            for member in &document.members {
                tracing::debug!(
                    dataset = %member.dataset_name,
                    columns = member.names.len(),
                    rows = member.rows,
                    "converted member"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
