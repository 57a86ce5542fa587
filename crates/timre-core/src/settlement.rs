//! Day settlement: deciding whether the streak survives today.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a day was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every recurring goal was met.
    StreakMaintained,
    /// Goals were missed but a saver covered the day.
    SaverUsed,
    /// Goals were missed and no saver was spent.
    StreakBroken,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::StreakMaintained => "streak_maintained",
            Outcome::SaverUsed => "saver_used",
            Outcome::StreakBroken => "streak_broken",
        }
    }

    /// Whether today counts toward the streak.
    pub fn keeps_streak(&self) -> bool {
        !matches!(self, Outcome::StreakBroken)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `complete_day` reports back. Streak lengths are not included;
/// callers re-derive them from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDayResult {
    pub success: bool,
    #[serde(rename = "message")]
    pub outcome: Outcome,
    pub savers_earned: u32,
    pub new_saver_count: u32,
}

/// Inputs to the settlement decision.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInput {
    pub all_goals_complete: bool,
    pub use_saver: bool,
    /// Today is already in the completion history.
    pub today_counted: bool,
    pub saver_count: u32,
    /// Savers earned from today's intentions, already zeroed if today was
    /// settled before.
    pub earned: u32,
    pub max_savers: u32,
}

/// The decided settlement: result plus whether today joins the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub result: CompleteDayResult,
    pub append_today: bool,
}

/// Apply the settlement table.
///
/// Earned savers are banked on every outcome. A saver is only consumed when
/// goals were missed and one was available before today's accrual. A day
/// that is already counted is never paid for twice, and a broken outcome
/// leaves the history as it is.
pub fn settle(input: SettlementInput) -> Settlement {
    let banked = input
        .saver_count
        .saturating_add(input.earned)
        .min(input.max_savers);

    let (outcome, new_saver_count) = if input.all_goals_complete {
        (Outcome::StreakMaintained, banked)
    } else if input.use_saver && input.saver_count > 0 {
        let consumed = if input.today_counted { 0 } else { 1 };
        (Outcome::SaverUsed, banked.saturating_sub(consumed))
    } else {
        (Outcome::StreakBroken, banked)
    };

    Settlement {
        result: CompleteDayResult {
            success: outcome.keeps_streak(),
            outcome,
            savers_earned: input.earned,
            new_saver_count,
        },
        append_today: outcome.keeps_streak() && !input.today_counted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(all: bool, use_saver: bool, savers: u32, earned: u32) -> SettlementInput {
        SettlementInput {
            all_goals_complete: all,
            use_saver,
            today_counted: false,
            saver_count: savers,
            earned,
            max_savers: 7,
        }
    }

    #[test]
    fn all_complete_maintains_and_banks() {
        let s = settle(input(true, true, 3, 2));
        assert_eq!(s.result.outcome, Outcome::StreakMaintained);
        assert!(s.result.success);
        assert!(s.append_today);
        assert_eq!(s.result.new_saver_count, 5);
    }

    #[test]
    fn banked_savers_are_capped() {
        let s = settle(input(true, false, 6, 2));
        assert_eq!(s.result.new_saver_count, 7);
    }

    #[test]
    fn saver_consumed_net_of_earned() {
        let s = settle(input(false, true, 2, 1));
        assert_eq!(s.result.outcome, Outcome::SaverUsed);
        assert!(s.append_today);
        assert_eq!(s.result.new_saver_count, 2);
        assert_eq!(s.result.savers_earned, 1);
    }

    #[test]
    fn saver_consumed_after_cap() {
        let s = settle(input(false, true, 7, 2));
        assert_eq!(s.result.new_saver_count, 6);
    }

    #[test]
    fn saver_requires_existing_balance() {
        // Savers earned today cannot rescue today.
        let s = settle(input(false, true, 0, 2));
        assert_eq!(s.result.outcome, Outcome::StreakBroken);
        assert!(!s.append_today);
        assert_eq!(s.result.new_saver_count, 2);
    }

    #[test]
    fn broken_streak_still_banks() {
        let s = settle(input(false, false, 4, 1));
        assert_eq!(s.result.outcome, Outcome::StreakBroken);
        assert!(!s.result.success);
        assert_eq!(s.result.new_saver_count, 5);
    }

    #[test]
    fn counted_day_is_not_paid_twice() {
        let s = settle(SettlementInput {
            today_counted: true,
            ..input(false, true, 3, 0)
        });
        assert_eq!(s.result.outcome, Outcome::SaverUsed);
        assert!(s.result.success);
        assert_eq!(s.result.new_saver_count, 3);
        assert!(!s.append_today);
    }

    #[test]
    fn counted_day_without_saver_reports_broken() {
        let s = settle(SettlementInput {
            today_counted: true,
            ..input(false, false, 0, 0)
        });
        assert_eq!(s.result.outcome, Outcome::StreakBroken);
        assert!(!s.result.success);
        assert_eq!(s.result.new_saver_count, 0);
        assert!(!s.append_today);
    }

    #[test]
    fn counted_day_with_empty_balance_reports_broken() {
        let s = settle(SettlementInput {
            today_counted: true,
            ..input(false, true, 0, 0)
        });
        assert_eq!(s.result.outcome, Outcome::StreakBroken);
        assert_eq!(s.result.new_saver_count, 0);
    }

    #[test]
    fn result_wire_names() {
        let s = settle(input(true, false, 0, 1));
        let json = serde_json::to_value(s.result).unwrap();
        assert_eq!(json["message"], "streak_maintained");
        assert_eq!(json["saversEarned"], 1);
        assert_eq!(json["newSaverCount"], 1);
    }
}
