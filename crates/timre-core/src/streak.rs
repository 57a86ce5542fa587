//! Completion history and the streaks derived from it.
//!
//! The history is the only source of truth: current and longest streak are
//! recomputed from it on every read and never stored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::day::DayId;

/// Days on which the user completed (or saved) their goals, in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionHistory {
    days: Vec<DayId>,
}

impl CompletionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> &[DayId] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn contains(&self, day: &DayId) -> bool {
        self.days.contains(day)
    }

    /// Append `day` unless it is already recorded. Returns whether it was
    /// added.
    pub fn insert(&mut self, day: DayId) -> bool {
        if self.contains(&day) {
            return false;
        }
        self.days.push(day);
        true
    }

    /// Consecutive days ending at `today`. Zero if `today` is missing.
    pub fn current_streak(&self, today: DayId) -> u32 {
        let recorded: HashSet<&DayId> = self.days.iter().collect();
        let mut streak = 0;
        let mut cursor = today;
        while recorded.contains(&cursor) {
            streak += 1;
            let prev = cursor.pred();
            if prev == cursor {
                break;
            }
            cursor = prev;
        }
        streak
    }

    /// Longest run of consecutive days anywhere in the history.
    pub fn longest_streak(&self) -> u32 {
        let mut sorted = self.days.clone();
        sorted.sort();

        let mut iter = sorted.iter();
        let Some(mut prev) = iter.next() else {
            return 0;
        };
        let mut longest = 1;
        let mut run = 1;
        for day in iter {
            match prev.days_until(day) {
                0 => {}
                1 => {
                    run += 1;
                    longest = longest.max(run);
                }
                _ => run = 1,
            }
            prev = day;
        }
        longest
    }

    /// History of `count` consecutive days ending at `today`, used to migrate
    /// a stored streak counter. Stops early at the earliest representable
    /// date so no day is recorded twice.
    pub fn synthesize(count: u32, today: DayId) -> Self {
        let mut days = Vec::new();
        let mut cursor = today;
        for _ in 0..count {
            days.push(cursor);
            let prev = cursor.pred();
            if prev == cursor {
                break;
            }
            cursor = prev;
        }
        Self { days }
    }
}

impl FromIterator<DayId> for CompletionHistory {
    fn from_iter<I: IntoIterator<Item = DayId>>(iter: I) -> Self {
        let mut history = Self::new();
        for day in iter {
            history.insert(day);
        }
        history
    }
}
