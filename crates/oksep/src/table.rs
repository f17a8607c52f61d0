//! The lightness table.
//!
//! The table maps each step of a discrete scale to the OKHSL lightness of the
//! neutral color whose contrast against a reference color grows exponentially
//! with the step. For the default options, that is 1001 steps from white at
//! step 0, with contrast 1, to black at step 1000, with contrast 21 against
//! white. Exponential growth makes equal step differences correspond to equal
//! contrast ratios, i.e., spacing is perceptually uniform.
//!
//! Building the table is cheap, but it still is persisted as a plain text
//! artifact with one `step<TAB>lightness` line per step, so that other tools
//! can use the very same scale.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::{
    luminance_for_contrast, round_lightness, xyz_from_luminance, xyz_to_okhsl_lightness, Level,
};
use crate::error::{DomainError, InputError, TableFormatError};
use crate::opt::Options;
use crate::Float;

/// Compute the OKHSL lightness for the given step.
fn lightness_for_step(step: usize, options: &Options) -> Result<Float, DomainError> {
    let fraction = step as Float / options.max_step() as Float;
    // exp(ln(c)) may overshoot c by an ulp.
    let contrast = (options.max_contrast().ln() * fraction)
        .exp()
        .min(options.max_contrast());
    let luminance = luminance_for_contrast(options.reference_luminance(), contrast)?;
    let raw = xyz_to_okhsl_lightness(&xyz_from_luminance(luminance));
    Ok(round_lightness(raw))
}

/// A table mapping scale steps to OKHSL lightness rounded to two decimals.
///
/// For a light reference color, which is the default, lightness is
/// non-increasing with the step.
#[derive(Clone, Debug, PartialEq)]
pub struct LightnessTable {
    values: Vec<Float>,
}

impl LightnessTable {
    /// Build the lightness table for the given options.
    ///
    /// # Errors
    ///
    /// This function fails with a [`DomainError`] if the options produce a
    /// reference luminance or contrast ratio outside its domain.
    pub fn build(options: &Options) -> Result<Self, DomainError> {
        let values = (0..=options.max_step())
            .map(|step| lightness_for_step(step, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Get the number of steps, which is one more than the largest step.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Determine whether the table is empty, which it never is when built.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the largest step.
    pub fn max_step(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Get the lightness for the given step.
    pub fn get(&self, step: usize) -> Option<Float> {
        self.values.get(step).copied()
    }

    /// Get the lightness level for the given step.
    pub fn level(&self, step: usize) -> Option<Level> {
        self.get(step).map(Level::from_lightness)
    }

    /// Iterate over the lightness values in step order.
    pub fn iter(&self) -> impl Iterator<Item = Float> + '_ {
        self.values.iter().copied()
    }

    /// Write this table as text.
    ///
    /// # Errors
    ///
    /// This method fails if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for (step, lightness) in self.values.iter().enumerate() {
            writeln!(writer, "{}\t{:.2}", step, lightness)?;
        }
        writer.flush()
    }

    /// Read a table with the given largest step from text.
    ///
    /// Blank lines are ignored. All other lines must have a step and a
    /// lightness, with the steps counting up from zero.
    ///
    /// # Errors
    ///
    /// This function fails with an [`InputError`] if reading fails or the
    /// text is malformed.
    pub fn read_from<R: BufRead>(reader: R, max_step: usize) -> Result<Self, InputError> {
        let mut values = Vec::with_capacity(max_step + 1);

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(step), Some(lightness), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(TableFormatError::MalformedLine(number).into());
            };

            let step = step
                .parse::<usize>()
                .map_err(|_| TableFormatError::MalformedStep(number))?;
            if max_step < values.len() {
                return Err(TableFormatError::SurplusSteps {
                    line: number,
                    expected: max_step + 1,
                }
                .into());
            }
            if step != values.len() {
                return Err(TableFormatError::UnexpectedStep {
                    line: number,
                    expected: values.len(),
                }
                .into());
            }

            let lightness = lightness
                .parse::<Float>()
                .map_err(|_| TableFormatError::MalformedLightness(number))?;
            if !(0.0..=1.0).contains(&lightness) {
                return Err(TableFormatError::MalformedLightness(number).into());
            }

            values.push(lightness);
        }

        if values.len() != max_step + 1 {
            return Err(TableFormatError::MissingSteps {
                expected: max_step + 1,
                actual: values.len(),
            }
            .into());
        }

        Ok(Self { values })
    }

    /// Load the table from the file with the given path.
    ///
    /// # Errors
    ///
    /// This function fails with a missing input error if the file does not
    /// exist and with another [`InputError`] if reading or parsing fails.
    pub fn load<P: AsRef<Path>>(path: P, max_step: usize) -> Result<Self, InputError> {
        let path = path.as_ref();
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(InputError::missing(path))
            }
            Err(error) => return Err(error.into()),
        };

        Self::read_from(BufReader::new(file), max_step)
    }

    /// Save the table to the file with the given path.
    ///
    /// # Errors
    ///
    /// This method fails if creating or writing the file fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

impl std::ops::Index<usize> for LightnessTable {
    type Output = Float;

    fn index(&self, step: usize) -> &Self::Output {
        &self.values[step]
    }
}
