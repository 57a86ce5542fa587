use clap::{Subcommand, ValueEnum};
use timre_core::Bedtime;

use super::open_engine;

#[derive(Clone, Copy, ValueEnum)]
pub enum ClockFormat {
    #[value(name = "12")]
    TwelveHour,
    #[value(name = "24")]
    TwentyFourHour,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Set bedtime (HH:MM, 24-hour)
    Bedtime {
        /// Bedtime, e.g. "22:30"
        time: String,
    },
    /// Set the account email
    Email {
        email: String,
    },
    /// Choose 12- or 24-hour display
    ClockFormat {
        #[arg(value_enum)]
        format: ClockFormat,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    match action {
        SettingsAction::Show { json } => {
            let settings = engine.settings();
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
            } else {
                println!("bedtime: {}", settings.formatted_bedtime());
                println!(
                    "clock format: {}",
                    if settings.use_24_hour_format { "24h" } else { "12h" }
                );
                println!("email: {}", settings.user_email);
                println!("onboarding completed: {}", settings.onboarding_completed);
            }
        }
        SettingsAction::Bedtime { time } => {
            let bedtime = Bedtime::parse(&time)?;
            engine.set_bedtime(bedtime)?;
            println!("Bedtime: {}", engine.settings().formatted_bedtime());
        }
        SettingsAction::Email { email } => {
            engine.set_user_email(&email)?;
            println!("ok");
        }
        SettingsAction::ClockFormat { format } => {
            engine.set_use_24_hour_format(matches!(format, ClockFormat::TwentyFourHour))?;
            println!("Bedtime: {}", engine.settings().formatted_bedtime());
        }
    }
    Ok(())
}
