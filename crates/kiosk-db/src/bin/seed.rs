//! # Demo Menu Seeder
//!
//! Populates a database with a small demo menu for local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kiosk.db
//! cargo run -p kiosk-db --bin seed
//!
//! # Specify database path
//! cargo run -p kiosk-db --bin seed -- --db ./data/kiosk.db
//! ```
//!
//! Skips seeding when the menu already has items.

use chrono::Utc;
use kiosk_core::{NewMenuAddon, NewMenuItem};
use kiosk_db::{Database, DbConfig};
use std::env;

/// (name, description, price, tags, featured, add-ons as (name, delta, required))
type SeedItem = (
    &'static str,
    &'static str,
    i64,
    &'static [&'static str],
    bool,
    &'static [(&'static str, i64, bool)],
);

const MENU: &[SeedItem] = &[
    (
        "Classic Burger",
        "Beef patty, lettuce, tomato, house sauce",
        899,
        &["burger", "beef"],
        true,
        &[("Bacon", 150, false), ("Extra Cheese", 100, false), ("Gluten-free Bun", 120, false)],
    ),
    (
        "Veggie Burger",
        "Black bean patty with avocado",
        849,
        &["burger", "vegetarian"],
        false,
        &[("Avocado", 175, false), ("Vegan Cheese", 125, false)],
    ),
    (
        "Chicken Wrap",
        "Grilled chicken, greens, yogurt dressing",
        799,
        &["wrap", "chicken"],
        false,
        &[("Spicy Sauce", 0, false), ("Double Chicken", 300, false)],
    ),
    (
        "Fries",
        "Crispy salted fries",
        349,
        &["side"],
        false,
        &[("Large", 100, false), ("Cheese Sauce", 90, false), ("No Salt", 0, false)],
    ),
    (
        "Garden Salad",
        "Mixed greens, cucumber, cherry tomato",
        649,
        &["salad", "vegetarian"],
        false,
        &[("Dressing: Ranch", 0, true), ("Dressing: Vinaigrette", 0, true), ("Grilled Chicken", 250, false)],
    ),
    (
        "Lemonade",
        "Fresh squeezed",
        299,
        &["drink"],
        false,
        &[("Large", 80, false), ("No Ice", 0, false)],
    ),
    (
        "Iced Coffee",
        "Cold brew over ice",
        399,
        &["drink", "coffee"],
        true,
        &[("Oat Milk", 60, false), ("Extra Shot", 90, false), ("Vanilla Syrup", 50, false)],
    ),
    (
        "Chocolate Brownie",
        "Warm, with a fudge center",
        449,
        &["dessert"],
        false,
        &[("Ice Cream Scoop", 150, false)],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kiosk.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kiosk Demo Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kiosk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Kiosk Demo Menu Seeder");
    println!("======================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Menu already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut created = 0;
    for (offset, (name, description, price, tags, featured, addons)) in MENU.iter().enumerate() {
        let item = NewMenuItem {
            name: name.to_string(),
            description: Some(description.to_string()),
            price: *price,
            image_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_featured: *featured,
            is_available: Some(true),
            addons: addons
                .iter()
                .map(|(addon, delta, required)| NewMenuAddon {
                    name: addon.to_string(),
                    price_delta: *delta,
                    is_required: *required,
                    max_select: Some(1),
                })
                .collect(),
        };

        // Distinct timestamps keep the listing in declaration order.
        let now = Utc::now().timestamp_millis() + offset as i64;

        match db.menu().create(&item, now).await {
            Ok(stored) => {
                println!("  + {} ({}, {} add-ons)", stored.name, stored.price(), stored.addons.len());
                created += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Seeded {} menu items", created);

    db.close().await;

    Ok(())
}
