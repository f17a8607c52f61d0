//! Utility module with oksep's errors.
//!
//! All errors implement [`std::error::Error`] and convert into
//! [`std::io::Error`], so that the command line tools can simply return
//! `std::io::Result<()>`.

use std::path::PathBuf;

use crate::Float;

/// An out-of-domain error.
///
/// This error indicates a numeric quantity outside its valid range. The
/// quantities checked by this crate include:
///
///   * `1..=21` for contrast ratios;
///   * `0..=1` for relative luminance;
///   * `0..=100` for the hundredths of a lightness [`Level`](crate::Level).
///
/// Since the lightness table only ever feeds valid values to the conversion
/// chain, this error signals a programming error more than bad input.
#[derive(Clone, Debug)]
pub struct DomainError {
    pub quantity: &'static str,
    pub value: Float,
    pub expected: std::ops::RangeInclusive<Float>,
}

impl DomainError {
    /// Create a new out-of-domain error.
    pub fn new(
        quantity: &'static str,
        value: Float,
        expected: std::ops::RangeInclusive<Float>,
    ) -> Self {
        Self {
            quantity,
            value,
            expected,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} does not fit into range {}..={}",
            self.quantity,
            self.value,
            self.expected.start(),
            self.expected.end()
        )
    }
}

impl std::error::Error for DomainError {}

impl From<DomainError> for std::io::Error {
    fn from(value: DomainError) -> Self {
        Self::new(std::io::ErrorKind::InvalidInput, value)
    }
}

// ====================================================================================================================

/// A malformed lightness table.
///
/// Each variant carries the one-based number of the offending line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableFormatError {
    /// A line that does not consist of a step and a lightness separated by
    /// whitespace.
    MalformedLine(usize),

    /// A step that is not an integer.
    MalformedStep(usize),

    /// A lightness that is not a floating point number or outside `0..=1`.
    MalformedLightness(usize),

    /// A step other than the next one in sequence.
    UnexpectedStep { line: usize, expected: usize },

    /// A table with fewer steps than required.
    MissingSteps { expected: usize, actual: usize },

    /// A table with more steps than required.
    SurplusSteps { line: usize, expected: usize },
}

impl std::fmt::Display for TableFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TableFormatError::*;

        match *self {
            MalformedLine(line) => write!(
                f,
                "lightness table line {} should have a step and a lightness but does not",
                line
            ),
            MalformedStep(line) => write!(
                f,
                "lightness table line {} should start with an integer step but does not",
                line
            ),
            MalformedLightness(line) => write!(
                f,
                "lightness table line {} should end with a lightness in 0..=1 but does not",
                line
            ),
            UnexpectedStep { line, expected } => write!(
                f,
                "lightness table line {} should have step {} but does not",
                line, expected
            ),
            MissingSteps { expected, actual } => write!(
                f,
                "lightness table should have {} steps but has {}",
                expected, actual
            ),
            SurplusSteps { line, expected } => write!(
                f,
                "lightness table should have {} steps but line {} adds another",
                expected, line
            ),
        }
    }
}

impl std::error::Error for TableFormatError {}

// ====================================================================================================================

/// The kinds of errors while accessing the color catalog or lightness table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputErrorKind {
    /// The file does not exist.
    Missing(PathBuf),
    /// Reading or writing failed.
    Io,
    /// The color catalog does not start with the expected magic bytes.
    BadMagic,
    /// The color catalog ends in the middle of a record.
    Truncated,
    /// The color catalog contains a record with an invalid level or
    /// luminance.
    BadRecord(u64),
    /// The lightness table is malformed.
    Table(TableFormatError),
}

/// An error while accessing the color catalog or lightness table.
#[derive(Debug)]
pub struct InputError {
    kind: InputErrorKind,
    source: Option<std::io::Error>,
}

impl InputError {
    /// Create a new error for a missing file.
    pub fn missing<P: Into<PathBuf>>(path: P) -> Self {
        InputErrorKind::Missing(path.into()).into()
    }

    /// Get the error kind.
    pub fn kind(&self) -> &InputErrorKind {
        &self.kind
    }

    /// Determine whether this error is due to a missing file.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, InputErrorKind::Missing(_))
    }
}

impl From<InputErrorKind> for InputError {
    fn from(kind: InputErrorKind) -> Self {
        Self { kind, source: None }
    }
}

impl From<TableFormatError> for InputError {
    fn from(value: TableFormatError) -> Self {
        InputErrorKind::Table(value).into()
    }
}

impl From<std::io::Error> for InputError {
    fn from(value: std::io::Error) -> Self {
        Self {
            kind: InputErrorKind::Io,
            source: Some(value),
        }
    }
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InputErrorKind::*;

        match self.kind {
            Missing(ref path) => write!(f, "could not find input file {}", path.display()),
            Io => f.write_str("could not read or write input file"),
            BadMagic => f.write_str("color catalog should start with magic bytes but does not"),
            Truncated => f.write_str("color catalog ends in the middle of a record"),
            BadRecord(index) => write!(f, "color catalog record {} is malformed", index),
            Table(_) => f.write_str("lightness table is malformed"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            InputErrorKind::Table(ref error) => Some(error),
            _ => self.source.as_ref().map(|e| e as _),
        }
    }
}

impl From<InputError> for std::io::Error {
    fn from(value: InputError) -> Self {
        use InputErrorKind::*;

        match value.kind {
            Missing(_) => Self::new(std::io::ErrorKind::NotFound, value),
            Io => match value.source {
                Some(error) => error,
                None => Self::other(value),
            },
            BadMagic | Truncated | BadRecord(_) | Table(_) => {
                Self::new(std::io::ErrorKind::InvalidData, value)
            }
        }
    }
}

// ====================================================================================================================

/// An error terminating the separation search without a result.
///
/// Contrast failures are *not* errors; they merely raise the distance under
/// test. The search only fails when it runs out of distances or tests.
#[derive(Clone, Debug)]
pub enum SearchError {
    /// The distance has outgrown the scale, leaving no pair of steps to test.
    Infeasible {
        distance: usize,
        max_step: usize,
        total_run: u64,
    },

    /// The search used up its test budget before reaching a verdict.
    BudgetExhausted { distance: usize, total_run: u64 },

    /// Some quantity escaped its domain.
    Domain(DomainError),
}

impl From<DomainError> for SearchError {
    fn from(value: DomainError) -> Self {
        Self::Domain(value)
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SearchError::*;

        match *self {
            Infeasible {
                distance,
                max_step,
                total_run,
            } => write!(
                f,
                "no separation up to {} steps is safe; gave up at distance {} after {} tests",
                max_step, distance, total_run
            ),
            BudgetExhausted {
                distance,
                total_run,
            } => write!(
                f,
                "test budget of {} exhausted at distance {}",
                total_run, distance
            ),
            Domain(ref error) => error.fmt(f),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Self::Domain(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<SearchError> for std::io::Error {
    fn from(value: SearchError) -> Self {
        Self::other(value)
    }
}

// ====================================================================================================================

/// Write the error, including any sources, to the given writer.
///
/// # Errors
///
/// This function fails if writing fails.
pub fn write_report<W, E>(mut writer: W, error: &E) -> std::io::Result<()>
where
    W: std::io::Write,
    E: std::error::Error,
{
    writeln!(writer, "ERROR: {}", error)?;

    let mut error: &dyn std::error::Error = error;
    while let Some(inner) = error.source() {
        writeln!(writer, "    {}", inner)?;
        error = inner;
    }

    Ok(())
}

/// Report the error, including any sources, on standard error.
pub fn report<E: std::error::Error>(error: &E) {
    let _ = write_report(std::io::stderr().lock(), error);
}
