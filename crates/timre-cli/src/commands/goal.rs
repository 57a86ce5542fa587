use clap::Subcommand;
use timre_core::{GoalId, GoalUpdate, NewGoal};

use super::{format_goal, open_engine};

const DEFAULT_APP_COLOR: &str = "#6366f1";

#[derive(Subcommand)]
pub enum GoalAction {
    /// List recurring goals
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add an app screen-time goal
    AddApp {
        /// App name
        name: String,
        /// Daily limit in minutes (0 uses the configured default)
        #[arg(long, default_value_t = 0)]
        limit: u32,
        /// Display color
        #[arg(long, default_value = DEFAULT_APP_COLOR)]
        color: String,
    },
    /// Add a habit goal
    AddHabit {
        /// Habit name
        name: String,
        /// Display color
        #[arg(long)]
        color: Option<String>,
    },
    /// Update fields of a goal
    Update {
        /// Goal ID
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Daily limit in minutes (app goals)
        #[arg(long)]
        limit: Option<u32>,
        /// Minutes used today (app goals)
        #[arg(long)]
        used: Option<u32>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: u64,
    },
    /// Record minutes used today on an app goal
    Log {
        /// Goal ID
        id: u64,
        /// Total minutes used so far today
        minutes: u32,
    },
    /// Toggle a habit goal
    Toggle {
        /// Goal ID
        id: u64,
    },
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    match action {
        GoalAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.goals())?);
            } else {
                for goal in engine.goals() {
                    println!("{}", format_goal(goal));
                }
            }
        }
        GoalAction::AddApp { name, limit, color } => {
            let new_goal = NewGoal::App {
                name,
                limit_minutes: limit,
                color,
            };
            match engine.add_goal(new_goal)? {
                Some(id) => println!("Goal added: {id}"),
                None => return Err("goal name must not be empty".into()),
            }
        }
        GoalAction::AddHabit { name, color } => {
            match engine.add_goal(NewGoal::Habit { name, color })? {
                Some(id) => println!("Goal added: {id}"),
                None => return Err("goal name must not be empty".into()),
            }
        }
        GoalAction::Update {
            id,
            name,
            color,
            limit,
            used,
            completed,
        } => {
            let update = GoalUpdate {
                name,
                color,
                limit_minutes: limit,
                used_minutes: used,
                completed,
            };
            require(engine.update_goal(GoalId(id), &update)?, id)?;
            println!("Goal updated: {id}");
        }
        GoalAction::Delete { id } => {
            require(engine.delete_goal(GoalId(id))?, id)?;
            println!("Goal deleted: {id}");
        }
        GoalAction::Log { id, minutes } => {
            require(engine.log_usage(GoalId(id), minutes)?, id)?;
            if let Some(goal) = engine.goal(GoalId(id)) {
                println!("{}", format_goal(goal));
            }
        }
        GoalAction::Toggle { id } => {
            require(engine.toggle_habit(GoalId(id))?, id)?;
            if let Some(goal) = engine.goal(GoalId(id)) {
                println!("{}", format_goal(goal));
            }
        }
    }
    Ok(())
}

fn require(found: bool, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    if found {
        Ok(())
    } else {
        Err(format!("no matching goal: {id}").into())
    }
}
