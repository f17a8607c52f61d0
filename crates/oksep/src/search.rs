//! The adaptive search for the minimum safe lightness separation.
//!
//! The search maintains a hypothesis, the *distance* in scale steps that
//! separates any two colors with sufficient contrast. It tests the hypothesis
//! by drawing a random step, looking up the lightness levels for that step and
//! the step one distance further, picking a random color from each level's
//! bucket, and comparing the pair's contrast against the minimum. Once enough
//! pairs pass at the current distance, the search declares that distance
//! safe. When a pair fails, the search raises the distance by one and starts
//! over with a clean slate.
//!
//! Since pairs are drawn at random, success is statistical evidence, not
//! proof, that the distance is safe. Results only repeat across runs if the
//! random number generator is seeded.

use std::io::Write;

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::catalog::{Color, ColorBuckets};
use crate::core::{contrast_ratio, Level};
use crate::error::SearchError;
use crate::log::Log;
use crate::opt::Options;
use crate::seen::{PairKey, SeenSet};
use crate::table::LightnessTable;
use crate::Float;

/// The reason for declaring a distance safe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The configured number of pairs passed.
    PassTarget,
    /// All pairs that could be drawn at the distance seem to have been drawn
    /// and passed, even though they are fewer than the pass target.
    Exhausted,
}

/// A pair of colors failing the contrast requirement.
#[derive(Clone, Debug, PartialEq)]
pub struct ContrastFailure {
    pub distance: usize,
    pub steps: [usize; 2],
    pub levels: [Level; 2],
    pub colors: [Color; 2],
    pub contrast: Float,
    pub min_contrast: Float,
}

impl std::fmt::Display for ContrastFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [step1, step2] = self.steps;
        let [level1, level2] = self.levels;
        let [color1, color2] = &self.colors;

        write!(
            f,
            "distance {:>4}: {} (step {}, L {}) vs {} (step {}, L {}) has contrast {:.3} < {}",
            self.distance,
            color1,
            step1,
            level1,
            color2,
            step2,
            level2,
            self.contrast,
            self.min_contrast
        )
    }
}

/// The result of a successful search.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// The minimum safe distance.
    pub distance: usize,
    /// The reason for declaring the distance safe.
    pub verdict: Verdict,
    /// The number of passing tests at the final distance.
    pub passes: u64,
    /// The number of tests across all distances.
    pub total_run: u64,
    /// The failures that raised the distance, in order.
    pub failures: Vec<ContrastFailure>,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "minimum safe distance is {} steps: {} of {} tests passed at that distance ",
            self.distance, self.passes, self.total_run
        )?;

        match self.verdict {
            Verdict::PassTarget => f.write_str("(pass target reached)"),
            Verdict::Exhausted => f.write_str("(no untested pairs left)"),
        }
    }
}

/// A progress report.
struct Progress {
    distance: usize,
    passes: u64,
    total_run: u64,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "distance {:>4}: {} passes, {} tests total",
            self.distance, self.passes, self.total_run
        )
    }
}

/// A report on a distance without any drawable pairs.
struct Barren(usize);

impl std::fmt::Display for Barren {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "distance {:>4}: no drawable pairs", self.0)
    }
}

// ====================================================================================================================

/// The outcome of a single draw.
enum Draw {
    /// The draw hit an empty bucket or an already tested pair.
    Wasted,
    /// The pair passed.
    Pass,
    /// The pair failed.
    Fail(Box<ContrastFailure>),
}

/// The search's mutable state.
#[derive(Debug)]
struct SearchState<S> {
    distance: usize,
    passes: u64,
    total_run: u64,
    tested: u64,
    wasted: u64,
    seen: S,
}

impl<S: SeenSet> SearchState<S> {
    /// Move on to the next distance. This also resets the counters and
    /// replaces the seen-set, since pairs seen at one distance have no
    /// bearing on the next.
    fn escalate(&mut self) {
        self.distance += 1;
        self.passes = 0;
        self.tested = 0;
        self.wasted = 0;
        self.seen = self.seen.renewed();
    }
}

/// The adaptive separation search.
///
/// The lightness table and color buckets are only read, so that several
/// searches may share them.
#[derive(Debug)]
pub struct Search<'a, S: SeenSet> {
    table: &'a LightnessTable,
    buckets: &'a ColorBuckets,
    options: &'a Options,
    state: SearchState<S>,
}

impl<'a, S: SeenSet> Search<'a, S> {
    /// Create a new search starting at the configured initial distance.
    ///
    /// The seen-set must be empty; it is renewed, not cleared, whenever the
    /// distance changes.
    pub fn new(
        table: &'a LightnessTable,
        buckets: &'a ColorBuckets,
        options: &'a Options,
        seen: S,
    ) -> Self {
        Self {
            table,
            buckets,
            options,
            state: SearchState {
                distance: options.initial_distance(),
                passes: 0,
                total_run: 0,
                tested: 0,
                wasted: 0,
                seen,
            },
        }
    }

    /// Get the current distance.
    pub fn distance(&self) -> usize {
        self.state.distance
    }

    /// Get the number of tests so far.
    pub fn total_run(&self) -> u64 {
        self.state.total_run
    }

    /// Create the distribution of first steps for the current distance.
    fn steps(&self) -> Result<Uniform<usize>, SearchError> {
        let max_step = self.table.max_step();
        let infeasible = || SearchError::Infeasible {
            distance: self.state.distance,
            max_step,
            total_run: self.state.total_run,
        };

        let last = max_step
            .checked_sub(self.state.distance)
            .ok_or_else(infeasible)?;
        Uniform::new_inclusive(0, last).map_err(|_| infeasible())
    }

    /// Draw and test one pair of colors at the current distance.
    fn draw<R: Rng + ?Sized>(&mut self, step1: usize, rng: &mut R) -> Draw {
        let step2 = step1 + self.state.distance;
        let (Some(level1), Some(level2)) = (self.table.level(step1), self.table.level(step2))
        else {
            return Draw::Wasted;
        };

        let buckets = self.buckets;
        let (Some(color1), Some(color2)) = (buckets.sample(level1, rng), buckets.sample(level2, rng))
        else {
            return Draw::Wasted;
        };

        let key = PairKey::new(color1, color2);
        if self.state.seen.contains(&key) {
            return Draw::Wasted;
        }
        self.state.seen.insert(&key);

        let contrast = contrast_ratio(color1.y, color2.y);
        if self.options.min_contrast() <= contrast {
            Draw::Pass
        } else {
            Draw::Fail(Box::new(ContrastFailure {
                distance: self.state.distance,
                steps: [step1, step2],
                levels: [level1, level2],
                colors: [*color1, *color2],
                contrast,
                min_contrast: self.options.min_contrast(),
            }))
        }
    }

    /// Run the search.
    ///
    /// Each test draws a pair of colors whose lightness levels are one
    /// distance apart. If the pair fails, the distance increases by one.
    /// Otherwise, the search ends once the pass target has been reached at the
    /// current distance. It also ends if the configured number of consecutive
    /// draws is wasted on empty buckets or already tested pairs. The distance
    /// then is safe by exhaustion if at least one pair has been tested at it;
    /// otherwise the search moves on to the next distance.
    ///
    /// # Errors
    ///
    /// This method fails if the distance exceeds the scale or the test budget
    /// runs out.
    pub fn run<R, W>(&mut self, rng: &mut R, log: &mut Log<W>) -> Result<Outcome, SearchError>
    where
        R: Rng + ?Sized,
        W: Write,
    {
        let mut failures = Vec::new();

        'distances: loop {
            let steps = self.steps()?;

            loop {
                if let Some(limit) = self.options.max_tests() {
                    if limit <= self.state.total_run {
                        return Err(SearchError::BudgetExhausted {
                            distance: self.state.distance,
                            total_run: self.state.total_run,
                        });
                    }
                }

                let step1 = steps.sample(rng);
                match self.draw(step1, rng) {
                    Draw::Wasted => {
                        self.state.wasted += 1;
                        if self.state.wasted < self.options.stall_limit() {
                            continue;
                        }

                        if 0 < self.state.tested {
                            return Ok(self.outcome(Verdict::Exhausted, failures));
                        }

                        log.regular(Barren(self.state.distance));
                        self.state.escalate();
                        continue 'distances;
                    }
                    Draw::Pass => {
                        self.record_test(log);
                        self.state.passes += 1;
                        if self.state.passes == self.options.pass_target() {
                            return Ok(self.outcome(Verdict::PassTarget, failures));
                        }
                    }
                    Draw::Fail(failure) => {
                        self.record_test(log);
                        log.regular(&failure);
                        failures.push(*failure);
                        self.state.escalate();
                        continue 'distances;
                    }
                }
            }
        }
    }

    fn record_test<W: Write>(&mut self, log: &mut Log<W>) {
        self.state.total_run += 1;
        self.state.tested += 1;
        self.state.wasted = 0;

        if self.state.total_run % self.options.progress_interval() == 0 {
            log.detailed(Progress {
                distance: self.state.distance,
                passes: self.state.passes,
                total_run: self.state.total_run,
            });
        }
    }

    fn outcome(&self, verdict: Verdict, failures: Vec<ContrastFailure>) -> Outcome {
        Outcome {
            distance: self.state.distance,
            verdict,
            passes: self.state.passes,
            total_run: self.state.total_run,
            failures,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Search, Verdict};
    use crate::catalog::{Color, ColorBuckets};
    use crate::core::Level;
    use crate::error::SearchError;
    use crate::log::Log;
    use crate::opt::{Options, Volume};
    use crate::seen::{BloomSet, ExactSet, PairKey, SeenSet};
    use crate::table::LightnessTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    /// An exact seen-set that counts inserts of keys it already holds.
    /// Renewed sets share the counters with their predecessors.
    struct RecordingSet {
        keys: ExactSet,
        inserts: Rc<Cell<u64>>,
        repeats: Rc<Cell<u64>>,
    }

    impl SeenSet for RecordingSet {
        fn insert(&mut self, key: &PairKey) {
            self.inserts.set(self.inserts.get() + 1);
            if self.keys.contains(key) {
                self.repeats.set(self.repeats.get() + 1);
            }
            self.keys.insert(key);
        }

        fn contains(&self, key: &PairKey) -> bool {
            self.keys.contains(key)
        }

        fn renewed(&self) -> Self {
            Self {
                keys: self.keys.renewed(),
                inserts: Rc::clone(&self.inserts),
                repeats: Rc::clone(&self.repeats),
            }
        }
    }

    fn at_level(r: u8, g: u8, b: u8, level: Level) -> Color {
        Color {
            level,
            ..Color::from_rgb(r, g, b)
        }
    }

    fn silent() -> Log<Vec<u8>> {
        Log::new(Volume::Silent, Vec::new())
    }

    #[test]
    fn test_pass_target() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = [
            at_level(255, 255, 255, Level::WHITE),
            at_level(0, 0, 0, Level::BLACK),
            at_level(1, 1, 1, Level::BLACK),
            at_level(2, 2, 2, Level::BLACK),
            at_level(0, 0, 1, Level::BLACK),
        ]
        .into_iter()
        .collect::<ColorBuckets>();

        // At distance 1000, the only pair of steps is 0 and 1000.
        let options = Options::builder()
            .initial_distance(1_000)
            .pass_target(3)
            .build();
        let mut search = Search::new(&table, &buckets, &options, ExactSet::new());
        let outcome = search
            .run(&mut StdRng::seed_from_u64(7), &mut silent())
            .unwrap();

        assert_eq!(outcome.distance, 1_000);
        assert_eq!(outcome.verdict, Verdict::PassTarget);
        assert_eq!(outcome.passes, 3);
        assert_eq!(outcome.total_run, 3);
        assert_eq!(search.total_run(), 3);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_exhausted() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = [
            at_level(255, 255, 255, Level::WHITE),
            at_level(0, 0, 0, Level::BLACK),
        ]
        .into_iter()
        .collect::<ColorBuckets>();

        let options = Options::builder()
            .initial_distance(1_000)
            .pass_target(10)
            .stall_limit(100)
            .build();
        let mut search = Search::new(&table, &buckets, &options, BloomSet::new(10, 0.01));
        let outcome = search
            .run(&mut StdRng::seed_from_u64(7), &mut silent())
            .unwrap();

        assert_eq!(outcome.distance, 1_000);
        assert_eq!(outcome.verdict, Verdict::Exhausted);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.total_run, 1);
    }

    #[test]
    fn test_infeasible() {
        // The same gray at every level never has any contrast.
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = (0..=100)
            .map(|hundredths| at_level(128, 128, 128, Level::new(hundredths).unwrap()))
            .collect::<ColorBuckets>();

        let options = Options::builder().initial_distance(998).build();
        let mut search = Search::new(&table, &buckets, &options, ExactSet::new());
        let error = search
            .run(&mut StdRng::seed_from_u64(7), &mut silent())
            .unwrap_err();

        match error {
            SearchError::Infeasible {
                distance,
                max_step,
                total_run,
            } => {
                assert_eq!(distance, 1_001);
                assert_eq!(max_step, 1_000);
                assert_eq!(total_run, 3);
            }
            error => panic!("unexpected error {:?}", error),
        }
        assert_eq!(search.distance(), 1_001);
    }

    #[test]
    fn test_barren_distances() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = ColorBuckets::default();

        let options = Options::builder()
            .initial_distance(999)
            .stall_limit(10)
            .build();
        let mut search = Search::new(&table, &buckets, &options, ExactSet::new());
        let mut log = Log::new(Volume::Regular, Vec::new());
        let error = search
            .run(&mut StdRng::seed_from_u64(7), &mut log)
            .unwrap_err();

        assert!(matches!(
            error,
            SearchError::Infeasible {
                distance: 1_001,
                total_run: 0,
                ..
            }
        ));

        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(
            text,
            "distance  999: no drawable pairs\ndistance 1000: no drawable pairs\n"
        );
    }

    #[test]
    fn test_budget() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = (0..=100)
            .map(|hundredths| at_level(128, 128, 128, Level::new(hundredths).unwrap()))
            .collect::<ColorBuckets>();

        let options = Options::builder()
            .initial_distance(1)
            .max_tests(Some(3))
            .build();
        let mut search = Search::new(&table, &buckets, &options, ExactSet::new());
        let error = search
            .run(&mut StdRng::seed_from_u64(7), &mut silent())
            .unwrap_err();

        assert!(matches!(
            error,
            SearchError::BudgetExhausted {
                distance: 4,
                total_run: 3
            }
        ));
    }

    #[test]
    fn test_failure_report() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = (0..=100)
            .map(|hundredths| at_level(128, 128, 128, Level::new(hundredths).unwrap()))
            .collect::<ColorBuckets>();

        let options = Options::builder()
            .initial_distance(1_000)
            .max_tests(Some(1))
            .build();
        let mut search = Search::new(&table, &buckets, &options, ExactSet::new());
        let mut log = Log::new(Volume::Regular, Vec::new());
        let _ = search.run(&mut StdRng::seed_from_u64(7), &mut log);

        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(
            text,
            "distance 1000: #808080 (step 0, L 1.00) vs #808080 (step 1000, L 0.00) \
            has contrast 1.000 < 4.5\n"
        );
    }

    #[test]
    fn test_no_repeated_pairs() {
        let table = LightnessTable::build(&Options::default()).unwrap();
        let buckets = [
            at_level(10, 10, 10, Level::new(10).unwrap()),
            at_level(128, 128, 128, Level::new(50).unwrap()),
            at_level(130, 126, 129, Level::new(50).unwrap()),
            at_level(240, 240, 240, Level::new(90).unwrap()),
        ]
        .into_iter()
        .collect::<ColorBuckets>();

        let options = Options::builder()
            .initial_distance(380)
            .pass_target(5)
            .stall_limit(5_000)
            .build();

        for seed in 0..5 {
            let inserts = Rc::new(Cell::new(0));
            let repeats = Rc::new(Cell::new(0));
            let seen = RecordingSet {
                keys: ExactSet::new(),
                inserts: Rc::clone(&inserts),
                repeats: Rc::clone(&repeats),
            };

            let mut search = Search::new(&table, &buckets, &options, seen);
            let outcome = search
                .run(&mut StdRng::seed_from_u64(seed), &mut silent())
                .unwrap();

            assert_eq!(repeats.get(), 0, "seed {} tested a pair twice", seed);
            assert_eq!(inserts.get(), outcome.total_run, "seed {}", seed);
            assert!(0 < outcome.total_run, "seed {}", seed);
        }
    }
}
