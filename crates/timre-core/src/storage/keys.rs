//! The engine's persisted key space.

use std::fmt;

/// Every key the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    Bedtime,
    UserEmail,
    /// Pre-history streak counter, read once for migration.
    LegacyCurrentStreak,
    /// Pre-history longest streak, only cleared on reset.
    LegacyLongestStreak,
    StreakSavers,
    LastOpenedDate,
    DayStarted,
    RecurringGoals,
    DailyIntentions,
    Use24HourFormat,
    CompletionHistory,
    OnboardingCompleted,
    /// Effective day of the last settlement, guards saver accrual.
    LastSettledDate,
}

impl StorageKey {
    pub const ALL: [StorageKey; 13] = [
        StorageKey::Bedtime,
        StorageKey::UserEmail,
        StorageKey::LegacyCurrentStreak,
        StorageKey::LegacyLongestStreak,
        StorageKey::StreakSavers,
        StorageKey::LastOpenedDate,
        StorageKey::DayStarted,
        StorageKey::RecurringGoals,
        StorageKey::DailyIntentions,
        StorageKey::Use24HourFormat,
        StorageKey::CompletionHistory,
        StorageKey::OnboardingCompleted,
        StorageKey::LastSettledDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Bedtime => "@timre_bedtime",
            StorageKey::UserEmail => "@timre_userEmail",
            StorageKey::LegacyCurrentStreak => "@timre_currentStreak",
            StorageKey::LegacyLongestStreak => "@timre_longestStreak",
            StorageKey::StreakSavers => "@timre_streakSavers",
            StorageKey::LastOpenedDate => "@timre_lastOpenedDate",
            StorageKey::DayStarted => "@timre_dayStarted",
            StorageKey::RecurringGoals => "@timre_recurringGoals",
            StorageKey::DailyIntentions => "@timre_dailyIntentions",
            StorageKey::Use24HourFormat => "@timre_use24HourFormat",
            StorageKey::CompletionHistory => "@timre_completionHistory",
            StorageKey::OnboardingCompleted => "@timre_onboarding_completed",
            StorageKey::LastSettledDate => "@timre_lastSettledDate",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
