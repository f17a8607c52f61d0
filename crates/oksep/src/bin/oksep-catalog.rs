use std::path::PathBuf;
use std::process::ExitCode;

use oksep::catalog::{generate, CatalogWriter, COLOR_COUNT};
use oksep::error::report;
use oksep::log::Log;
use oksep::opt::{Options, Volume};

const USAGE: &str = "usage: oksep-catalog [--quiet|--verbose] [PATH]

Write all 2^24 sRGB colors with their luminance and lightness to PATH
(default colors.oksep).";

fn run() -> std::io::Result<()> {
    let mut path = None;
    let mut options = Options::default();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                Log::stderr(Volume::Regular).regular(USAGE);
                return Ok(());
            }
            "-q" | "--quiet" => options = Options::silent(),
            "-v" | "--verbose" => options = Options::with_detailed_log(),
            _ if path.is_none() && !arg.starts_with('-') => path = Some(PathBuf::from(arg)),
            _ => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("unexpected argument {}\n\n{}", arg, USAGE),
                ))
            }
        }
    }

    let path = path.unwrap_or_else(|| PathBuf::from("colors.oksep"));
    let mut log = Log::stderr(options.volume());

    let mut writer = CatalogWriter::create(&path)?;
    generate(&mut writer, |count| {
        log.detailed(format_args!(
            "{:>5.1}% of colors written",
            100.0 * count as f64 / COLOR_COUNT as f64
        ))
    })?;

    let count = writer.count();
    writer.finish()?;
    log.regular(format_args!("wrote {} colors to {}", count, path.display()));

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}
