//! # Seed Data Generator
//!
//! Populates the database with demo data for one household, for
//! development against a realistic dataset.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p hearth-db --bin seed
//!
//! # Specify database path
//! cargo run -p hearth-db --bin seed -- --db ./data/hearth.db
//!
//! # Specify how many weeks of meals to generate
//! cargo run -p hearth-db --bin seed -- --weeks 8
//! ```

use std::env;

use chrono::{Duration, NaiveDate, Utc};
use hearth_core::types::{NewCarpoolEvent, NewChecklist, NewChecklistItem, NewMeal};
use hearth_db::{Database, DbConfig};

/// Checklists for the demo household: (title, category, items).
const CHECKLISTS: &[(&str, &str, &[&str])] = &[
    (
        "Weekly Groceries",
        "Shopping",
        &["milk", "bread", "eggs", "butter", "apples", "pasta"],
    ),
    (
        "Camping Trip",
        "Travel",
        &["tent", "sleeping bags", "flashlight", "first aid kit", "marshmallows"],
    ),
    (
        "School Morning",
        "Routine",
        &["lunch boxes", "homework folders", "water bottles"],
    ),
];

/// Rotating dinner menu used to generate meal history.
const DINNERS: &[&str] = &[
    "Beef tacos",
    "Spaghetti bolognese",
    "Roast chicken",
    "Vegetable stir fry",
    "Homemade pizza",
    "Lentil soup",
    "Fish and chips",
];

/// Carpool destinations: (description, destination, notes).
const CARPOOLS: &[(&str, &str, Option<&str>)] = &[
    ("Soccer practice dropoff", "Lincoln Field", Some("cleats in the trunk")),
    ("Piano lesson pickup", "Ms. Harmon's studio", None),
    ("Swim meet", "Community pool", Some("bring towels")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./hearth_dev.db");
    let mut weeks: i64 = 4;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--weeks" | "-w" => {
                if i + 1 < args.len() {
                    weeks = args[i + 1].parse().unwrap_or(4);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Hearth Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./hearth_dev.db)");
                println!("  -w, --weeks <N>     Weeks of meal history to generate (default: 4)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Hearth Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Weeks of meals: {}", weeks);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // One demo household; rerunning against an existing file is a no-op
    let users = db.users();
    if users.get_by_email("demo@hearth.local").await?.is_some() {
        println!("⚠ Demo user already exists, skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let owner = users.create("demo@hearth.local", Some("Demo Family")).await?;
    println!("✓ Created demo user #{}", owner.id);

    for (title, category, items) in CHECKLISTS {
        db.checklists()
            .create(
                owner.id,
                &NewChecklist {
                    title: title.to_string(),
                    category: Some(category.to_string()),
                    items: items
                        .iter()
                        .map(|text| NewChecklistItem {
                            text: text.to_string(),
                            is_required: true,
                        })
                        .collect(),
                },
            )
            .await?;
    }
    println!("✓ Created {} checklists", CHECKLISTS.len());

    let today: NaiveDate = Utc::now().date_naive();
    let mut meal_count = 0;
    for week in 0..weeks {
        for (day, dinner) in DINNERS.iter().enumerate() {
            let date = today + Duration::days(week * 7 + day as i64);
            db.meals()
                .create(
                    owner.id,
                    &NewMeal {
                        name: dinner.to_string(),
                        meal_time: Some("Dinner".to_string()),
                        details: None,
                        planned_date: date,
                    },
                )
                .await?;
            meal_count += 1;
        }
    }
    println!("✓ Created {} meals", meal_count);

    for (idx, (description, destination, notes)) in CARPOOLS.iter().enumerate() {
        db.carpool_events()
            .create(
                owner.id,
                &NewCarpoolEvent {
                    description: description.to_string(),
                    destination: destination.to_string(),
                    drop_off_time: Utc::now() + Duration::days(idx as i64 + 1),
                    notes: notes.map(str::to_string),
                },
            )
            .await?;
    }
    println!("✓ Created {} carpool events", CARPOOLS.len());

    println!();
    println!("Done. Demo data ready in {}", db_path);

    Ok(())
}
