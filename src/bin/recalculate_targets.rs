//! Re-derive stored calorie and macro targets for every profile
//! Usage: cargo run --bin recalculate_targets -- [--dry-run]

use snapcal::config::Config;
use snapcal::db::{migrations, Database};
use snapcal::models::Profile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = std::env::args().any(|a| a == "--dry-run");

    let config = Config::from_env()?;
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;

        let ids = Profile::list_ids(conn)?;
        println!("Found {} profiles", ids.len());

        let mut changed = 0;
        for id in &ids {
            let Some(profile) = Profile::get(conn, id)? else {
                continue;
            };
            let before = profile.targets;

            let updated = match profile.recalculate() {
                Ok(p) => p,
                Err(e) => {
                    println!("  {}: skipped ({})", id, e);
                    continue;
                }
            };

            if updated.targets == before {
                continue;
            }
            changed += 1;
            println!(
                "  {}: {} kcal / {}p / {}c / {}f -> {} kcal / {}p / {}c / {}f",
                id,
                before.calories,
                before.protein,
                before.carbs,
                before.fat,
                updated.targets.calories,
                updated.targets.protein,
                updated.targets.carbs,
                updated.targets.fat,
            );

            if !dry_run {
                Profile::update_targets(conn, id, &updated.targets)?;
            }
        }

        if dry_run {
            println!("\n{} profiles would change (dry run)", changed);
        } else {
            println!("\nUpdated {} profiles", changed);
        }
        Ok(())
    })?;

    Ok(())
}
