//! Occupancy value object and the denoiser that keeps the displayed player
//! count from regressing on a single bogus low reading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shown instead of "0/0" while no usable reading exists.
pub const OCCUPANCY_PLACEHOLDER: &str = "?/?";

/// Consecutive low readings needed before a drop to 0 or 1 players is believed.
pub const LOW_STREAK_TO_ACCEPT: u32 = 2;

/// Readings with at most this many taken slots are suspect.
const SUSPECT_TAKEN_MAX: u32 = 1;

/// Taken / total slots of a lobby as reported by the feed.
///
/// `taken <= total` is expected but not enforced; the feed does not guarantee it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupancy {
    pub taken: u32,
    pub total: u32,
}

impl Occupancy {
    pub fn new(taken: u32, total: u32) -> Self {
        Self { taken, total }
    }

    /// A reading with no slot total carries no information (absent fields).
    pub fn is_unknown(&self) -> bool {
        self.total == 0
    }

    fn is_suspect_low(&self) -> bool {
        self.taken <= SUSPECT_TAKEN_MAX
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.taken, self.total)
    }
}

/// What the denoiser did with one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenoiseOutcome {
    /// Reading became the confirmed value.
    Accepted,
    /// Reading repeated the confirmed value.
    Unchanged,
    /// Low reading held back; the confirmed value keeps being displayed.
    Suppressed { streak: u32 },
    /// Reading had no slot total and was dropped.
    Ignored,
}

/// Per-lobby occupancy smoothing.
///
/// - `taken >= 2` is accepted immediately and resets the low streak.
/// - `taken <= 1` is accepted on cold start, otherwise only after
///   [`LOW_STREAK_TO_ACCEPT`] consecutive low readings.
/// - A reading equal to the confirmed value resets the streak and changes nothing.
/// - A reading with `total == 0` is ignored whatever its `taken` count, since
///   the feed reports `0` for absent slot fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyDenoiser {
    confirmed: Option<Occupancy>,
    low_streak: u32,
}

impl OccupancyDenoiser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, reading: Occupancy) -> DenoiseOutcome {
        if reading.is_unknown() {
            return DenoiseOutcome::Ignored;
        }

        if self.confirmed == Some(reading) {
            self.low_streak = 0;
            return DenoiseOutcome::Unchanged;
        }

        if !reading.is_suspect_low() || self.confirmed.is_none() {
            self.accept(reading);
            return DenoiseOutcome::Accepted;
        }

        self.low_streak += 1;
        if self.low_streak >= LOW_STREAK_TO_ACCEPT {
            self.accept(reading);
            DenoiseOutcome::Accepted
        } else {
            DenoiseOutcome::Suppressed {
                streak: self.low_streak,
            }
        }
    }

    fn accept(&mut self, reading: Occupancy) {
        self.confirmed = Some(reading);
        self.low_streak = 0;
    }

    pub fn confirmed(&self) -> Option<Occupancy> {
        self.confirmed
    }

    pub fn low_streak(&self) -> u32 {
        self.low_streak
    }

    /// Text to display: the confirmed value, or the placeholder.
    pub fn display(&self) -> String {
        match self.confirmed {
            Some(occupancy) => occupancy.to_string(),
            None => OCCUPANCY_PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(denoiser: &mut OccupancyDenoiser, readings: &[(u32, u32)]) -> Vec<String> {
        readings
            .iter()
            .map(|&(taken, total)| {
                denoiser.observe(Occupancy::new(taken, total));
                denoiser.display()
            })
            .collect()
    }

    #[test]
    fn single_low_reading_is_ignored() {
        let mut denoiser = OccupancyDenoiser::new();
        let shown = feed(&mut denoiser, &[(10, 12), (1, 12), (10, 12)]);
        assert_eq!(shown, vec!["10/12", "10/12", "10/12"]);
        assert_eq!(denoiser.low_streak(), 0);
    }

    #[test]
    fn two_consecutive_low_readings_are_believed() {
        let mut denoiser = OccupancyDenoiser::new();
        let shown = feed(&mut denoiser, &[(10, 12), (1, 12), (1, 12)]);
        assert_eq!(shown, vec!["10/12", "10/12", "1/12"]);
        assert_eq!(denoiser.confirmed(), Some(Occupancy::new(1, 12)));
    }

    #[test]
    fn streak_counts_distinct_low_values() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(8, 10));
        assert_eq!(
            denoiser.observe(Occupancy::new(1, 10)),
            DenoiseOutcome::Suppressed { streak: 1 }
        );
        assert_eq!(
            denoiser.observe(Occupancy::new(0, 10)),
            DenoiseOutcome::Accepted
        );
        assert_eq!(denoiser.display(), "0/10");
    }

    #[test]
    fn repeating_confirmed_value_is_idempotent() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(6, 12));
        for _ in 0..5 {
            assert_eq!(
                denoiser.observe(Occupancy::new(6, 12)),
                DenoiseOutcome::Unchanged
            );
            assert_eq!(denoiser.confirmed(), Some(Occupancy::new(6, 12)));
            assert_eq!(denoiser.low_streak(), 0);
        }
    }

    #[test]
    fn repeating_confirmed_low_value_does_not_grow_streak() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(1, 12));
        denoiser.observe(Occupancy::new(1, 12));
        denoiser.observe(Occupancy::new(1, 12));
        assert_eq!(denoiser.low_streak(), 0);
        assert_eq!(denoiser.display(), "1/12");
    }

    #[test]
    fn cold_start_accepts_low_reading() {
        let mut denoiser = OccupancyDenoiser::new();
        assert_eq!(
            denoiser.observe(Occupancy::new(1, 12)),
            DenoiseOutcome::Accepted
        );
        assert_eq!(denoiser.display(), "1/12");
    }

    #[test]
    fn cold_start_with_empty_reading_shows_placeholder() {
        let mut denoiser = OccupancyDenoiser::new();
        assert_eq!(
            denoiser.observe(Occupancy::new(0, 0)),
            DenoiseOutcome::Ignored
        );
        assert_eq!(denoiser.display(), OCCUPANCY_PLACEHOLDER);

        denoiser.observe(Occupancy::new(0, 0));
        assert_eq!(denoiser.display(), OCCUPANCY_PLACEHOLDER);

        denoiser.observe(Occupancy::new(3, 12));
        assert_eq!(denoiser.display(), "3/12");
    }

    #[test]
    fn empty_reading_does_not_touch_streak() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(9, 12));
        denoiser.observe(Occupancy::new(1, 12));
        denoiser.observe(Occupancy::new(0, 0));
        assert_eq!(denoiser.low_streak(), 1);
        assert_eq!(denoiser.display(), "9/12");
    }

    #[test]
    fn good_reading_after_low_resets_streak() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(9, 12));
        denoiser.observe(Occupancy::new(1, 12));
        denoiser.observe(Occupancy::new(7, 12));
        assert_eq!(denoiser.low_streak(), 0);
        denoiser.observe(Occupancy::new(1, 12));
        assert_eq!(denoiser.display(), "7/12");
    }

    #[test]
    fn reading_without_total_is_ignored_even_when_full() {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(Occupancy::new(10, 12));

        assert_eq!(denoiser.observe(Occupancy::new(5, 0)), DenoiseOutcome::Ignored);
        assert_eq!(denoiser.confirmed(), Some(Occupancy::new(10, 12)));
        assert_eq!(denoiser.low_streak(), 0);
    }
}
