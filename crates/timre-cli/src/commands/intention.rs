use clap::Subcommand;
use timre_core::IntentionId;

use super::open_engine;

#[derive(Subcommand)]
pub enum IntentionAction {
    /// List today's intentions
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add an intention for today
    Add {
        /// Intention text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Toggle an intention
    Toggle {
        /// Intention ID
        id: u64,
    },
    /// Delete an intention
    Delete {
        /// Intention ID
        id: u64,
    },
}

pub fn run(action: IntentionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    match action {
        IntentionAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.intentions())?);
            } else {
                for intention in engine.intentions() {
                    let mark = if intention.completed { "x" } else { " " };
                    println!("[{mark}] {:>14}  {}", intention.id, intention.text);
                }
                println!("Savers earned today: {}", engine.savers_earned_today());
            }
        }
        IntentionAction::Add { text } => {
            if !engine.can_add_intention() {
                return Err(format!(
                    "at most {} intentions per day",
                    engine.config().limits.max_intentions
                )
                .into());
            }
            match engine.add_intention(&text.join(" "))? {
                Some(id) => println!("Intention added: {id}"),
                None => return Err("intention text must not be empty".into()),
            }
        }
        IntentionAction::Toggle { id } => {
            if !engine.toggle_intention(IntentionId(id))? {
                return Err(format!("no matching intention: {id}").into());
            }
            println!("Savers earned today: {}", engine.savers_earned_today());
        }
        IntentionAction::Delete { id } => {
            if !engine.delete_intention(IntentionId(id))? {
                return Err(format!("no matching intention: {id}").into());
            }
            println!("Intention deleted: {id}");
        }
    }
    Ok(())
}
