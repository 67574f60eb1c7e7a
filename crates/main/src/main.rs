use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use pitch_report::report::OUTPUT_FILE_NAME;
use pitch_report::{generate_report, ReportOptions};

/// Renders the Let's Watch project report to a PDF file.
///
/// Fonts are looked up in `--fonts-dir`, then the `PITCH_REPORT_FONTS_DIR`
/// environment variable, then `assets/fonts` next to the executable or the
/// crate, and finally a few common system families.
#[derive(Parser)]
#[command(author, version, about = "Render the Let's Watch project report")]
struct Cli {
    /// Path of the PDF to write.
    #[arg(short, long, value_name = "FILE", default_value = OUTPUT_FILE_NAME)]
    output: PathBuf,

    /// Directory holding the report font family.
    #[arg(long, value_name = "DIR")]
    fonts_dir: Option<PathBuf>,

    /// Log progress (`RUST_LOG` overrides).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = ReportOptions::new()
        .with_output(cli.output)
        .with_fonts_dir(cli.fonts_dir);

    match generate_report(&options) {
        Ok(outcome) => {
            println!(
                "PDF written: {} ({} pages)",
                outcome.path.display(),
                outcome.pages
            );
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(&err);
            std::process::exit(1);
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
