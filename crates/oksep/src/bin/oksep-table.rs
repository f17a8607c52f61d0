use std::path::PathBuf;
use std::process::ExitCode;

use oksep::error::report;
use oksep::log::Log;
use oksep::opt::Options;
use oksep::table::LightnessTable;

const USAGE: &str = "usage: oksep-table [PATH]

Write the lightness table, one step and lightness per line, to PATH
(default lightness.tsv).";

fn run() -> std::io::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(arg) if arg == "-h" || arg == "--help" => {
            let mut log = Log::stderr(Options::default().volume());
            log.regular(USAGE);
            return Ok(());
        }
        Some(arg) => PathBuf::from(arg),
        None => PathBuf::from("lightness.tsv"),
    };

    if let Some(arg) = args.next() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unexpected argument {}\n\n{}", arg, USAGE),
        ));
    }

    let options = Options::default();
    let mut log = Log::stderr(options.volume());

    let table = LightnessTable::build(&options)?;
    table.save(&path)?;
    log.regular(format_args!(
        "wrote {} steps to {}",
        table.len(),
        path.display()
    ));

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
