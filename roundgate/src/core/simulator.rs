//! Simulated incremental progress.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::core::error::TrackerError;
use crate::core::registry::Task;
use crate::core::strategy::VerificationStrategy;
use crate::core::types::{MAX_PROGRESS, Phase, RoundContext};

/// Inclusive increment range for a phase. Ranges widen so later rounds close
/// the gap faster; they do not guarantee completion by the last round.
pub fn increment_range(phase: Phase) -> RangeInclusive<u32> {
    match phase {
        Phase::Initial => 10..=25,
        Phase::Core => 15..=30,
        Phase::Polish => 20..=35,
        Phase::Final => 30..=50,
    }
}

/// Source of per-task increments.
pub trait IncrementSource {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Uniform draws from a `StdRng`, reproducible when seeded.
#[derive(Debug, Clone)]
pub struct RandomIncrements {
    rng: StdRng,
}

impl RandomIncrements {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl IncrementSource for RandomIncrements {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

/// Always the same increment, whatever the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIncrement(pub u32);

impl IncrementSource for FixedIncrement {
    fn draw(&mut self, _range: RangeInclusive<u32>) -> u32 {
        self.0
    }
}

/// Adds a phase-dependent increment to each task, capped at 100.
#[derive(Debug, Clone)]
pub struct ProgressSimulator<I: IncrementSource = RandomIncrements> {
    source: I,
}

impl<I: IncrementSource> ProgressSimulator<I> {
    pub fn new(source: I) -> Self {
        Self { source }
    }
}

impl ProgressSimulator<RandomIncrements> {
    /// Seeded simulator, or entropy-backed when `seed` is `None`.
    pub fn with_seed(seed: Option<u64>) -> Self {
        let source = match seed {
            Some(seed) => RandomIncrements::seeded(seed),
            None => RandomIncrements::from_entropy(),
        };
        Self::new(source)
    }
}

impl<I: IncrementSource> VerificationStrategy for ProgressSimulator<I> {
    fn evaluate(&mut self, task: &Task, ctx: &RoundContext) -> Result<u32, TrackerError> {
        let increment = self.source.draw(increment_range(ctx.phase));
        let next = (u32::from(task.progress) + increment).min(u32::from(MAX_PROGRESS));
        debug!(
            task = %task.name,
            round = ctx.index,
            phase = %ctx.phase,
            increment,
            progress = next,
            "simulated progress"
        );
        Ok(next)
    }

    fn name(&self) -> &'static str {
        "simulate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(progress: u8) -> Task {
        Task {
            name: "t".to_string(),
            progress,
            required: 100,
            forced: false,
        }
    }

    #[test]
    fn fixed_increment_adds_and_caps() {
        let mut sim = ProgressSimulator::new(FixedIncrement(50));
        let ctx = RoundContext::new(1);
        assert_eq!(sim.evaluate(&task(0), &ctx), Ok(50));
        assert_eq!(sim.evaluate(&task(80), &ctx), Ok(100));
        assert_eq!(sim.evaluate(&task(100), &ctx), Ok(100));
    }

    #[test]
    fn random_draws_stay_within_phase_range() {
        let mut sim = ProgressSimulator::with_seed(Some(11));
        for round in 1..=12 {
            let ctx = RoundContext::new(round);
            let range = increment_range(ctx.phase);
            for _ in 0..50 {
                let value = sim.evaluate(&task(0), &ctx).expect("evaluate");
                assert!(range.contains(&value), "round {round}: {value} not in {range:?}");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_sequence() {
        let ctx = RoundContext::new(5);
        let mut first = ProgressSimulator::with_seed(Some(42));
        let mut second = ProgressSimulator::with_seed(Some(42));
        let a: Vec<u32> = (0..20)
            .map(|_| first.evaluate(&task(0), &ctx).expect("a"))
            .collect();
        let b: Vec<u32> = (0..20)
            .map(|_| second.evaluate(&task(0), &ctx).expect("b"))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn ranges_widen_across_phases() {
        let phases = [Phase::Initial, Phase::Core, Phase::Polish, Phase::Final];
        for pair in phases.windows(2) {
            let (earlier, later) = (increment_range(pair[0]), increment_range(pair[1]));
            assert!(later.start() >= earlier.start());
            assert!(later.end() >= earlier.end());
        }
    }
}
