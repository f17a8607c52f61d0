use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;

use oksep::catalog::{partition, CatalogReader};
use oksep::error::{report, InputError};
use oksep::log::Log;
use oksep::opt::{Options, Volume};
use oksep::search::Search;
use oksep::seen::BloomSet;
use oksep::table::LightnessTable;

const USAGE: &str = "usage: oksep [CATALOG] [OPTIONS]

Search for the minimum distance between OKHSL lightness levels on the
1000-step scale that guarantees the minimum contrast for all sRGB colors.
CATALOG defaults to colors.oksep.

Options:
  --table PATH     lightness table (default lightness.tsv)
  --distance N     initial distance (default 400)
  --contrast C     minimum contrast (default 4.5)
  --passes T       passing tests for a safe distance (default 1000000)
  --budget N       maximum number of tests (default unlimited)
  --seed S         seed for the random number generator
  --quiet          only print the result
  --verbose        also print progress";

/// The command line arguments.
struct Arguments {
    catalog: PathBuf,
    table: PathBuf,
    seed: Option<u64>,
    options: Options,
}

fn invalid(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

fn value<T: FromStr>(flag: &str, value: Option<String>) -> std::io::Result<T> {
    let value = value.ok_or_else(|| invalid(format!("{} requires a value", flag)))?;
    value
        .parse()
        .map_err(|_| invalid(format!("{} has invalid value {}", flag, value)))
}

/// Parse the command line arguments. This function returns `None` if the
/// user asked for help.
fn parse_args() -> std::io::Result<Option<Arguments>> {
    let mut catalog = None;
    let mut table = PathBuf::from("lightness.tsv");
    let mut seed = None;
    let mut builder = Options::builder();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--table" => table = value::<PathBuf>(&arg, args.next())?,
            "--distance" => {
                builder.initial_distance(value(&arg, args.next())?);
            }
            "--contrast" => {
                builder.min_contrast(value(&arg, args.next())?);
            }
            "--passes" => {
                builder.pass_target(value(&arg, args.next())?);
            }
            "--budget" => {
                builder.max_tests(Some(value(&arg, args.next())?));
            }
            "--seed" => seed = Some(value(&arg, args.next())?),
            "-q" | "--quiet" => {
                builder.volume(Volume::Silent);
            }
            "-v" | "--verbose" => {
                builder.volume(Volume::Detailed);
            }
            _ if catalog.is_none() && !arg.starts_with('-') => catalog = Some(PathBuf::from(arg)),
            _ => return Err(invalid(format!("unexpected argument {}\n\n{}", arg, USAGE))),
        }
    }

    Ok(Some(Arguments {
        catalog: catalog.unwrap_or_else(|| PathBuf::from("colors.oksep")),
        table,
        seed,
        options: builder.build(),
    }))
}

fn run() -> std::io::Result<()> {
    let Some(args) = parse_args()? else {
        Log::stderr(Volume::Regular).regular(USAGE);
        return Ok(());
    };

    // Fail fast on missing inputs, before any expensive work.
    for path in [&args.catalog, &args.table] {
        if !path.exists() {
            return Err(InputError::missing(path.as_path()).into());
        }
    }

    let options = &args.options;
    let mut log = Log::stderr(options.volume());

    let table = LightnessTable::load(&args.table, options.max_step())?;
    log.regular(format_args!(
        "loaded lightness table with {} steps from {}",
        table.len(),
        args.table.display()
    ));

    let buckets = partition(CatalogReader::open(&args.catalog)?)?;
    log.regular(format_args!(
        "partitioned {} colors into {} lightness levels",
        buckets.total(),
        buckets.len()
    ));

    let seed = args.seed.unwrap_or_else(rand::random);
    log.regular(format_args!(
        "searching from distance {} with seed {}",
        options.initial_distance(),
        seed
    ));

    let seen = BloomSet::new(options.pass_target(), options.false_positive_rate());
    let mut search = Search::new(&table, &buckets, options, seen);
    let outcome = search.run(&mut StdRng::seed_from_u64(seed), &mut log)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", outcome)?;
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
