use super::{format_goal, open_engine};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let summary = engine.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Day: {}", summary.effective_day);
    println!(
        "Streak: {} (longest {})",
        summary.current_streak, summary.longest_streak
    );
    println!(
        "Savers: {}/{}",
        summary.streak_savers, summary.max_streak_savers
    );
    if !summary.day_started {
        println!("Morning check-in pending (timre day begin)");
    }

    println!("Goals:");
    for goal in &summary.goals {
        println!("  {}", format_goal(goal));
    }

    if summary.intentions.is_empty() {
        println!("Intentions: none");
    } else {
        println!("Intentions:");
        for intention in &summary.intentions {
            let mark = if intention.completed { "x" } else { " " };
            println!("  [{mark}] {:>14}  {}", intention.id, intention.text);
        }
    }

    println!("Time saved: {} min", summary.time_saved_minutes);
    println!(
        "Evening review: {} (bedtime {})",
        if summary.evening_review_open { "open" } else { "closed" },
        engine.settings().formatted_bedtime()
    );
    Ok(())
}
