use clap::Subcommand;

use super::{open_engine, open_engine_raw};

#[derive(Subcommand)]
pub enum DayAction {
    /// Report whether a new effective day has begun
    Check,
    /// Force the new-day reset now
    Start,
    /// Mark the morning check-in as done
    Begin,
    /// Settle today and update the streak
    Complete {
        /// Spend a streak saver if goals were missed
        #[arg(long)]
        use_saver: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: DayAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DayAction::Check => {
            let engine = open_engine_raw()?;
            println!("today: {}", engine.effective_today());
            println!("last opened: {}", engine.last_opened_date());
            println!("new day: {}", engine.is_new_day());
        }
        DayAction::Start => {
            let mut engine = open_engine_raw()?;
            engine.start_new_day()?;
            println!("New day started: {}", engine.effective_today());
        }
        DayAction::Begin => {
            let mut engine = open_engine()?;
            engine.set_day_started(true)?;
            println!("Day begun: {}", engine.effective_today());
        }
        DayAction::Complete { use_saver, json } => {
            let mut engine = open_engine()?;
            let result = engine.complete_day(use_saver)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Outcome: {}", result.outcome);
                println!("Savers earned: {}", result.savers_earned);
                println!("Savers: {}", result.new_saver_count);
                println!(
                    "Streak: {} (longest {})",
                    engine.current_streak(),
                    engine.longest_streak()
                );
            }
        }
    }
    Ok(())
}
