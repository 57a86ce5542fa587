use super::open_engine_raw;

pub fn run(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        return Err("refusing to delete all data without --yes".into());
    }
    let mut engine = open_engine_raw()?;
    engine.reset_all_data()?;
    tracing::info!("all tracking data removed");
    println!("All data reset");
    Ok(())
}
