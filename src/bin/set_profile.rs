//! Utility to store the user profile and print the plan it produces
//!
//! Usage: set_profile <weight_kg> <height_cm> <age|YYYY-MM-DD> <male|female> <lose|maintain|gain> [target_weight_kg]

use chrono::Local;
use tracing_subscriber::EnvFilter;

use easymeal::tools::profile::{set_profile, ProfileInput};

const USAGE: &str =
    "Usage: set_profile <weight_kg> <height_cm> <age|YYYY-MM-DD> <male|female> <lose|maintain|gain> [target_weight_kg]";

fn parse_number(name: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("Invalid {}: {}", name, value))
}

fn parse_args(args: &[String]) -> Result<ProfileInput, String> {
    if args.len() < 5 || args.len() > 6 {
        return Err(USAGE.to_string());
    }

    let (age, birthday) = match args[2].parse::<u32>() {
        Ok(age) => (Some(age), None),
        Err(_) => (None, Some(args[2].clone())),
    };
    let target_weight_kg = match args.get(5) {
        Some(v) => Some(parse_number("target weight", v)?),
        None => None,
    };

    Ok(ProfileInput {
        weight_kg: parse_number("weight", &args[0])?,
        target_weight_kg,
        height_cm: parse_number("height", &args[1])?,
        age,
        birthday,
        gender: args[3].clone(),
        goal: args[4].clone(),
    })
}

/// Log filter for this tool: `RUST_LOG` plus `easymeal=info`
fn log_filter() -> Result<EnvFilter, Box<dyn std::error::Error>> {
    Ok(EnvFilter::from_default_env().add_directive("easymeal=info".parse()?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the plan, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(log_filter()?)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = parse_args(&args)?;

    let db_path = easymeal::config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", db_path.display());

    let database = easymeal::db::Database::new(&db_path)?;
    database.with_conn(easymeal::db::migrations::run_migrations)?;

    let saved = set_profile(&database, &input, Local::now().date_naive())?;
    let plan = &saved.plan;
    println!("Profile saved:");
    println!("  Goal: {}", saved.profile.goal.as_str());
    println!("  BMR: {:.1} kcal", plan.bmr);
    println!("  Daily target: {} kcal", plan.daily_calorie_target);
    println!(
        "  Protein {:.1} g | Fat {:.1} g | Carbs {:.1} g",
        plan.protein_g, plan.fat_g, plan.carbs_g
    );
    for slot in &plan.slot_targets {
        println!("  {:<10} {} kcal", slot.slot.as_str(), slot.calories);
    }
    println!("  Steps goal: {}", plan.steps_goal);
    println!("  Water goal: {:.1} L", plan.water_goal_liters);
    println!("  Weeks to target: {}", plan.weeks_to_target);

    Ok(())
}
