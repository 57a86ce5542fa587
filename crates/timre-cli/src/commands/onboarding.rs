use clap::Subcommand;

use super::{open_engine, open_engine_raw};

#[derive(Subcommand)]
pub enum OnboardingAction {
    /// Print whether onboarding has been completed
    Status,
    /// Mark onboarding as completed
    Complete,
}

pub fn run(action: OnboardingAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        OnboardingAction::Status => {
            let engine = open_engine_raw()?;
            println!("{}", engine.settings().onboarding_completed);
        }
        OnboardingAction::Complete => {
            let mut engine = open_engine()?;
            engine.complete_onboarding()?;
            println!("onboarding completed");
        }
    }
    Ok(())
}
