//! Recurring daily goals: app time limits and habit checkboxes.
//!
//! Goal identity persists across days. Only the daily progress (`used` for
//! app goals, `completed` for both kinds) is reset at rollover.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::LimitsConfig;

/// Stable goal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub u64);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A daily screen-time budget for one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppGoal {
    pub id: GoalId,
    pub name: String,
    /// Daily limit in minutes
    #[serde(rename = "limit")]
    pub limit_minutes: u32,
    /// Minutes used today
    #[serde(rename = "used")]
    pub used_minutes: u32,
    pub color: String,
    pub completed: bool,
}

impl AppGoal {
    /// Whether today's usage is within the limit.
    pub fn on_track(&self) -> bool {
        self.used_minutes <= self.limit_minutes
    }

    /// Minutes left under the limit, never negative.
    pub fn minutes_saved(&self) -> u32 {
        self.limit_minutes.saturating_sub(self.used_minutes)
    }
}

/// A daily yes/no habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitGoal {
    pub id: GoalId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub completed: bool,
}

/// A recurring goal, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurringGoal {
    App(AppGoal),
    Habit(HabitGoal),
}

impl RecurringGoal {
    pub fn id(&self) -> GoalId {
        match self {
            RecurringGoal::App(g) => g.id,
            RecurringGoal::Habit(g) => g.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RecurringGoal::App(g) => &g.name,
            RecurringGoal::Habit(g) => &g.name,
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            RecurringGoal::App(g) => g.completed,
            RecurringGoal::Habit(g) => g.completed,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RecurringGoal::App(_) => "app",
            RecurringGoal::Habit(_) => "habit",
        }
    }

    /// Clear the day's progress, keeping identity and settings.
    pub fn reset_for_new_day(&mut self) {
        match self {
            RecurringGoal::App(g) => {
                g.completed = false;
                g.used_minutes = 0;
            }
            RecurringGoal::Habit(g) => g.completed = false,
        }
    }

    /// Re-derive app completion from usage. Habits are untouched.
    pub fn refresh_completion(&mut self) {
        match self {
            RecurringGoal::App(g) => g.completed = g.on_track(),
            RecurringGoal::Habit(_) => {}
        }
    }

    /// Merge the present fields of `update`. Limit and usage only apply to
    /// app goals.
    pub fn apply(&mut self, update: &GoalUpdate, limits: &LimitsConfig) {
        let name = update
            .name
            .as_deref()
            .and_then(|n| normalize_name(n, limits.max_goal_name_length));
        match self {
            RecurringGoal::App(g) => {
                if let Some(name) = name {
                    g.name = name;
                }
                if let Some(color) = &update.color {
                    g.color = color.clone();
                }
                if let Some(limit) = update.limit_minutes {
                    g.limit_minutes = normalize_limit(limit, limits);
                }
                if let Some(used) = update.used_minutes {
                    g.used_minutes = used.min(limits.max_time_minutes);
                }
                if let Some(completed) = update.completed {
                    g.completed = completed;
                }
            }
            RecurringGoal::Habit(g) => {
                if let Some(name) = name {
                    g.name = name;
                }
                if let Some(color) = &update.color {
                    g.color = Some(color.clone());
                }
                if let Some(completed) = update.completed {
                    g.completed = completed;
                }
            }
        }
    }
}

/// Input for creating a goal. The engine assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewGoal {
    App {
        name: String,
        #[serde(rename = "limit")]
        limit_minutes: u32,
        color: String,
    },
    Habit {
        name: String,
        #[serde(default)]
        color: Option<String>,
    },
}

impl NewGoal {
    /// Build the goal, or `None` if the name is blank.
    pub fn into_goal(self, id: GoalId, limits: &LimitsConfig) -> Option<RecurringGoal> {
        match self {
            NewGoal::App {
                name,
                limit_minutes,
                color,
            } => Some(RecurringGoal::App(AppGoal {
                id,
                name: normalize_name(&name, limits.max_goal_name_length)?,
                limit_minutes: normalize_limit(limit_minutes, limits),
                used_minutes: 0,
                color,
                completed: false,
            })),
            NewGoal::Habit { name, color } => Some(RecurringGoal::Habit(HabitGoal {
                id,
                name: normalize_name(&name, limits.max_goal_name_length)?,
                color,
                completed: false,
            })),
        }
    }
}

/// Partial update for an existing goal. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "limit")]
    pub limit_minutes: Option<u32>,
    #[serde(rename = "used")]
    pub used_minutes: Option<u32>,
    pub completed: Option<bool>,
}

impl GoalUpdate {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

fn normalize_name(name: &str, max_len: usize) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

fn normalize_limit(limit: u32, limits: &LimitsConfig) -> u32 {
    if limit == 0 {
        limits.default_time_limit_minutes
    } else {
        limit.min(limits.max_time_minutes)
    }
}

/// Goal set used on first launch and after a reset.
pub fn default_goals() -> Vec<RecurringGoal> {
    vec![
        RecurringGoal::App(AppGoal {
            id: GoalId(1),
            name: "Instagram".into(),
            limit_minutes: 30,
            used_minutes: 0,
            color: "#e4405f".into(),
            completed: false,
        }),
        RecurringGoal::App(AppGoal {
            id: GoalId(2),
            name: "TikTok".into(),
            limit_minutes: 45,
            used_minutes: 0,
            color: "#00f2ea".into(),
            completed: false,
        }),
        RecurringGoal::Habit(HabitGoal {
            id: GoalId(3),
            name: "Meditate 10 min".into(),
            color: None,
            completed: false,
        }),
    ]
}

/// Minutes saved today across all app goals.
pub fn time_saved(goals: &[RecurringGoal]) -> u32 {
    goals
        .iter()
        .map(|g| match g {
            RecurringGoal::App(app) => app.minutes_saved(),
            RecurringGoal::Habit(_) => 0,
        })
        .sum()
}
