//! The color catalog.
//!
//! The catalog holds every 24-bit sRGB color together with its relative
//! luminance and its quantized OKHSL lightness. Since there are 2^24 such
//! colors, the catalog is generated once and then persisted in a compact
//! binary format:
//!
//!   * 8 magic bytes `OKSEPCAT`, followed by
//!   * one 12-byte record per color, consisting of the red, green, and blue
//!     components as bytes, the lightness [`Level`] as byte, and the
//!     luminance as little-endian 64-bit float.
//!
//! The search does not use the catalog directly but groups the colors into
//! [`ColorBuckets`] by lightness level.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::{from_24bit, srgb_to_xyz, xyz_to_okhsl_lightness, Level};
use crate::error::{InputError, InputErrorKind};
use crate::Float;

/// The magic bytes starting a binary color catalog.
pub const MAGIC: &[u8; 8] = b"OKSEPCAT";

/// The size of a binary record in bytes.
const RECORD_SIZE: usize = 12;

/// The number of 24-bit colors.
pub const COLOR_COUNT: u64 = 1 << 24;

/// A catalog color.
///
/// Each color combines 24-bit sRGB coordinates with the corresponding
/// relative luminance `y` and quantized OKHSL lightness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub y: Float,
    pub level: Level,
}

impl Color {
    /// Create a new color from its parts.
    pub const fn new(r: u8, g: u8, b: u8, y: Float, level: Level) -> Self {
        Self { r, g, b, y, level }
    }

    /// Create a new color from its 24-bit sRGB coordinates.
    ///
    /// This function converts the coordinates to XYZ to determine the
    /// luminance and further to Oklab and OKHSL to determine the lightness.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let xyz = srgb_to_xyz(&from_24bit(r, g, b));
        let y = xyz[1].clamp(0.0, 1.0);
        let level = Level::from_lightness(xyz_to_okhsl_lightness(&xyz));
        Self { r, g, b, y, level }
    }

    /// Get the color's code `0xRRGGBB`.
    #[inline]
    pub fn code(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Get the color's coordinates.
    #[inline]
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ====================================================================================================================

/// A writer of binary color catalogs.
#[derive(Debug)]
pub struct CatalogWriter<W: Write> {
    writer: W,
    count: u64,
}

impl<W: Write> CatalogWriter<W> {
    /// Create a new catalog writer, which immediately writes the magic bytes.
    ///
    /// # Errors
    ///
    /// This function fails if writing fails.
    pub fn new(mut writer: W) -> std::io::Result<Self> {
        writer.write_all(MAGIC)?;
        Ok(Self { writer, count: 0 })
    }

    /// Write the color.
    ///
    /// # Errors
    ///
    /// This method fails if writing fails.
    pub fn write(&mut self, color: &Color) -> std::io::Result<()> {
        let mut record = [0; RECORD_SIZE];
        record[0] = color.r;
        record[1] = color.g;
        record[2] = color.b;
        record[3] = color.level.hundredths();
        record[4..].copy_from_slice(&(color.y as f64).to_le_bytes());
        self.writer.write_all(&record)?;
        self.count += 1;
        Ok(())
    }

    /// Get the number of colors written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Flush the writer and return it.
    ///
    /// # Errors
    ///
    /// This method fails if flushing fails.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl CatalogWriter<BufWriter<std::fs::File>> {
    /// Create a new catalog file with the given path.
    ///
    /// # Errors
    ///
    /// This function fails if creating the file fails.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::new(BufWriter::new(std::fs::File::create(path)?))
    }
}

/// Generate the exhaustive catalog with all 2^24 colors.
///
/// The callback is invoked after each complete red plane with the
/// number of colors written so far.
///
/// # Errors
///
/// This function fails if writing fails.
pub fn generate<W, F>(writer: &mut CatalogWriter<W>, mut progress: F) -> std::io::Result<()>
where
    W: Write,
    F: FnMut(u64),
{
    for r in 0..=u8::MAX {
        for g in 0..=u8::MAX {
            for b in 0..=u8::MAX {
                writer.write(&Color::from_rgb(r, g, b))?;
            }
        }
        progress(writer.count());
    }

    Ok(())
}

// ====================================================================================================================

/// A reader of binary color catalogs.
///
/// The reader is an iterator over the catalog's colors. It stops after the
/// first error.
#[derive(Debug)]
pub struct CatalogReader<R: Read> {
    reader: R,
    index: u64,
    done: bool,
}

impl<R: Read> CatalogReader<R> {
    /// Create a new catalog reader, which immediately reads and validates the
    /// magic bytes.
    ///
    /// # Errors
    ///
    /// This function fails if reading fails or the magic bytes are wrong.
    pub fn new(mut reader: R) -> Result<Self, InputError> {
        let mut magic = [0; 8];
        match reader.read_exact(&mut magic) {
            Ok(()) => (),
            Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(InputErrorKind::BadMagic.into())
            }
            Err(error) => return Err(error.into()),
        }

        if &magic != MAGIC {
            return Err(InputErrorKind::BadMagic.into());
        }

        Ok(Self {
            reader,
            index: 0,
            done: false,
        })
    }

    /// Fill the buffer with the next record. This method returns `Ok(false)`
    /// if the catalog ended cleanly before the record.
    fn fill(&mut self, record: &mut [u8; RECORD_SIZE]) -> Result<bool, InputError> {
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.reader.read(&mut record[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => return Err(InputErrorKind::Truncated.into()),
                Ok(n) => filled += n,
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => (),
                Err(error) => return Err(error.into()),
            }
        }
        Ok(true)
    }

    fn decode(&self, record: &[u8; RECORD_SIZE]) -> Result<Color, InputError> {
        let level =
            Level::new(record[3]).map_err(|_| InputErrorKind::BadRecord(self.index))?;

        let mut bytes = [0; 8];
        bytes.copy_from_slice(&record[4..]);
        let y = f64::from_le_bytes(bytes);
        if !(0.0..=1.0).contains(&y) {
            return Err(InputErrorKind::BadRecord(self.index).into());
        }

        Ok(Color::new(record[0], record[1], record[2], y as Float, level))
    }
}

impl CatalogReader<BufReader<std::fs::File>> {
    /// Open the catalog file with the given path.
    ///
    /// # Errors
    ///
    /// This function fails with a missing input error if the file does not
    /// exist and with another [`InputError`] if opening the file or reading
    /// the magic bytes fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => Self::new(BufReader::with_capacity(1 << 20, file)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(InputError::missing(path))
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl<R: Read> Iterator for CatalogReader<R> {
    type Item = Result<Color, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = [0; RECORD_SIZE];
        let result = match self.fill(&mut record) {
            Ok(false) => {
                self.done = true;
                return None;
            }
            Ok(true) => self.decode(&record),
            Err(error) => Err(error),
        };

        self.index += 1;
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl<R: Read> std::iter::FusedIterator for CatalogReader<R> {}

// ====================================================================================================================

/// The catalog's colors grouped by lightness level.
///
/// Every catalog color belongs to exactly one bucket, the one for its level.
/// All colors are retained in memory, so that picking a random color from a
/// bucket takes constant time.
#[derive(Clone, Debug)]
pub struct ColorBuckets {
    buckets: Vec<Vec<Color>>,
    total: usize,
}

impl Default for ColorBuckets {
    fn default() -> Self {
        Self {
            buckets: vec![Vec::new(); Level::COUNT],
            total: 0,
        }
    }
}

impl ColorBuckets {
    /// Add the color to the bucket for its level.
    pub fn insert(&mut self, color: Color) {
        self.buckets[color.level.index()].push(color);
        self.total += 1;
    }

    /// Get the colors with the given level.
    pub fn bucket(&self, level: Level) -> &[Color] {
        &self.buckets[level.index()]
    }

    /// Pick a color with the given level uniformly at random. This method
    /// returns `None` if there are no such colors.
    pub fn sample<R: Rng + ?Sized>(&self, level: Level, rng: &mut R) -> Option<&Color> {
        self.bucket(level).choose(rng)
    }

    /// Get the number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }

    /// Determine whether all buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Get the total number of colors across all buckets.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Iterate over the non-empty buckets in level order.
    pub fn iter(&self) -> impl Iterator<Item = (Level, &[Color])> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, colors)| !colors.is_empty())
            .filter_map(|(index, colors)| {
                Level::new(index as u8)
                    .ok()
                    .map(|level| (level, colors.as_slice()))
            })
    }
}

impl FromIterator<Color> for ColorBuckets {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        let mut buckets = Self::default();
        for color in iter {
            buckets.insert(color);
        }
        buckets
    }
}

/// Partition the colors into buckets by lightness level.
///
/// This function consumes the colors in one pass and stops at the first
/// error.
///
/// # Errors
///
/// This function fails with the first error produced by the colors.
pub fn partition<I, E>(colors: I) -> Result<ColorBuckets, E>
where
    I: IntoIterator<Item = Result<Color, E>>,
{
    let mut buckets = ColorBuckets::default();
    for color in colors {
        buckets.insert(color?);
    }
    Ok(buckets)
}

#[cfg(test)]
mod test {
    use super::{partition, CatalogReader, CatalogWriter, Color, ColorBuckets, MAGIC};
    use crate::core::Level;
    use crate::error::{InputError, InputErrorKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_colors() -> Vec<Color> {
        vec![
            Color::from_rgb(0, 0, 0),
            Color::from_rgb(255, 255, 255),
            Color::from_rgb(128, 128, 128),
            Color::from_rgb(255, 202, 0),
            Color::from_rgb(49, 120, 234),
            Color::from_rgb(127, 128, 128),
        ]
    }

    #[test]
    fn test_from_rgb() {
        let black = Color::from_rgb(0, 0, 0);
        assert_eq!(black.y, 0.0);
        assert_eq!(black.level, Level::BLACK);

        let white = Color::from_rgb(255, 255, 255);
        assert!((white.y - 1.0).abs() < 1e-9);
        assert_eq!(white.level, Level::WHITE);

        let yellow = Color::from_rgb(255, 202, 0);
        assert_eq!(yellow.level.hundredths(), 84);
        assert_eq!(yellow.code(), 0xffca00);
        assert_eq!(yellow.to_string(), "#ffca00");

        let blue = Color::from_rgb(49, 120, 234);
        assert_eq!(blue.level.hundredths(), 53);
    }

    #[test]
    fn test_round_trip() {
        let colors = sample_colors();
        let mut writer = CatalogWriter::new(Vec::new()).unwrap();
        for color in colors.iter() {
            writer.write(color).unwrap();
        }
        assert_eq!(writer.count(), 6);

        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 8 + 6 * 12);
        assert_eq!(&bytes[..8], MAGIC);

        let reader = CatalogReader::new(bytes.as_slice()).unwrap();
        let also_colors = reader.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(colors, also_colors);
    }

    #[test]
    fn test_malformed() {
        let error = CatalogReader::new(b"NOTACAT!".as_slice()).unwrap_err();
        assert_eq!(error.kind(), &InputErrorKind::BadMagic);

        let error = CatalogReader::new(b"OKS".as_slice()).unwrap_err();
        assert_eq!(error.kind(), &InputErrorKind::BadMagic);

        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        let mut reader = CatalogReader::new(bytes.as_slice()).unwrap();
        let error = reader.next().unwrap().unwrap_err();
        assert_eq!(error.kind(), &InputErrorKind::Truncated);
        assert!(reader.next().is_none());

        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 101]);
        bytes.extend_from_slice(&0.5_f64.to_le_bytes());
        let mut reader = CatalogReader::new(bytes.as_slice()).unwrap();
        let error = reader.next().unwrap().unwrap_err();
        assert_eq!(error.kind(), &InputErrorKind::BadRecord(0));
    }

    #[test]
    fn test_partition() {
        let colors = sample_colors();
        let buckets = partition(colors.iter().copied().map(Ok::<_, InputError>)).unwrap();

        // Every color lands in exactly one bucket, the one for its level.
        assert_eq!(buckets.total(), colors.len());
        let mut count = 0;
        for (level, bucket) in buckets.iter() {
            for color in bucket {
                assert_eq!(color.level, level);
                count += 1;
            }
        }
        assert_eq!(count, colors.len());

        // The blue and the slightly darker mid gray share a bucket.
        let blue = Color::from_rgb(49, 120, 234).level;
        assert_eq!(Color::from_rgb(127, 128, 128).level, blue);
        assert_eq!(buckets.bucket(blue).len(), 2);
        assert_eq!(buckets.len(), 5);
    }

    #[test]
    fn test_partition_error() {
        let colors = vec![
            Ok(Color::from_rgb(1, 2, 3)),
            Err(InputError::from(InputErrorKind::Truncated)),
            Ok(Color::from_rgb(4, 5, 6)),
        ];
        let error = partition(colors).unwrap_err();
        assert_eq!(error.kind(), &InputErrorKind::Truncated);
    }

    #[test]
    fn test_sample() {
        let buckets = sample_colors().into_iter().collect::<ColorBuckets>();
        let mut rng = StdRng::seed_from_u64(42);

        let blue = Color::from_rgb(49, 120, 234).level;
        let mut codes = std::collections::HashSet::new();
        for _ in 0..100 {
            let color = buckets.sample(blue, &mut rng).unwrap();
            assert_eq!(color.level, blue);
            codes.insert(color.code());
        }
        assert_eq!(codes.len(), 2);

        let empty = Level::new(1).unwrap();
        assert!(buckets.bucket(empty).is_empty());
        assert!(buckets.sample(empty, &mut rng).is_none());
    }
}
