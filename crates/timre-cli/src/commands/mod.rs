pub mod config;
pub mod day;
pub mod goal;
pub mod intention;
pub mod onboarding;
pub mod reset;
pub mod settings;
pub mod status;

use timre_core::{Config, DayStateEngine, RecurringGoal, SqliteStore, SystemClock};

pub type Engine = DayStateEngine<SqliteStore, SystemClock>;

/// Open the engine on the default database without running the rollover.
pub fn open_engine_raw() -> Result<Engine, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = SqliteStore::open_default()?;
    Ok(DayStateEngine::load(store, SystemClock, config))
}

/// Open the engine the way an app launch does: a due rollover runs first.
pub fn open_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let mut engine = open_engine_raw()?;
    if engine.ensure_today()? {
        eprintln!("New day: goals and intentions reset for {}", engine.effective_today());
    }
    Ok(engine)
}

/// One-line rendering of a goal.
pub fn format_goal(goal: &RecurringGoal) -> String {
    match goal {
        RecurringGoal::App(app) => format!(
            "[{}] {:>14}  {}  {}/{} min",
            if app.completed { "x" } else { " " },
            app.id,
            app.name,
            app.used_minutes,
            app.limit_minutes
        ),
        RecurringGoal::Habit(habit) => format!(
            "[{}] {:>14}  {}",
            if habit.completed { "x" } else { " " },
            habit.id,
            habit.name
        ),
    }
}
