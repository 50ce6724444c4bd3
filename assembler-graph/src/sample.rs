//! Built-in recipe subset for trying the calculator without a recipe table

use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::models::RecipeRow;
use crate::raw_materials::RawMaterials;

/// Recipes as (item, output per cycle, seconds per cycle, ingredients)
const RECIPES: &[(&str, f64, f64, &[(&str, f64)])] = &[
    // Military science
    (
        "military_science_pack",
        2.0,
        10.0,
        &[("grenade", 1.0), ("piercing_rounds_magazine", 1.0), ("wall", 2.0)],
    ),
    ("grenade", 1.0, 8.0, &[("coal", 10.0), ("iron_plate", 5.0)]),
    (
        "piercing_rounds_magazine",
        1.0,
        3.0,
        &[("copper_plate", 5.0), ("firearm_magazine", 1.0), ("steel_plate", 1.0)],
    ),
    ("firearm_magazine", 1.0, 1.0, &[("iron_plate", 4.0)]),
    ("wall", 1.0, 0.5, &[("stone_brick", 5.0)]),
    // Automation and logistic science
    (
        "automation_science_pack",
        1.0,
        5.0,
        &[("copper_plate", 1.0), ("iron_gear_wheel", 1.0)],
    ),
    ("iron_gear_wheel", 1.0, 0.5, &[("iron_plate", 2.0)]),
    ("copper_cable", 2.0, 0.5, &[("copper_plate", 1.0)]),
    (
        "electronic_circuit",
        1.0,
        0.5,
        &[("copper_cable", 3.0), ("iron_plate", 1.0)],
    ),
    (
        "inserter",
        1.0,
        0.5,
        &[("electronic_circuit", 1.0), ("iron_gear_wheel", 1.0), ("iron_plate", 1.0)],
    ),
    (
        "transport_belt",
        2.0,
        0.5,
        &[("iron_gear_wheel", 1.0), ("iron_plate", 1.0)],
    ),
    (
        "logistic_science_pack",
        1.0,
        6.0,
        &[("inserter", 1.0), ("transport_belt", 1.0)],
    ),
    // Circuits and modules
    (
        "advanced_circuit",
        1.0,
        6.0,
        &[("copper_cable", 4.0), ("electronic_circuit", 2.0), ("plastic_bar", 2.0)],
    ),
    (
        "processing_unit",
        1.0,
        10.0,
        &[("advanced_circuit", 2.0), ("electronic_circuit", 20.0), ("sulfuric_acid", 5.0)],
    ),
    (
        "productivity_module",
        1.0,
        15.0,
        &[("advanced_circuit", 5.0), ("electronic_circuit", 5.0)],
    ),
];

const RAW_MATERIALS: &[&str] = &[
    "steel_plate",
    "iron_plate",
    "copper_plate",
    "coal",
    "stone",
    "stone_brick",
    "petroleum_gas",
    "heavy_oil",
    "plastic_bar",
    "sulfuric_acid",
    "water",
    "battery",
    "electric_engine_unit",
];

pub fn recipe_rows() -> Vec<RecipeRow> {
    RECIPES
        .iter()
        .flat_map(|(item, output_quantity, cycle_duration, ingredients)| {
            ingredients.iter().map(move |(ingredient, quantity)| {
                RecipeRow::new(item, ingredient, *quantity, *output_quantity, *cycle_duration)
            })
        })
        .collect()
}

pub fn raw_materials() -> RawMaterials {
    RAW_MATERIALS.iter().collect()
}

/// Replace the stored recipes with the built-in subset. Returns the number of recipes.
pub fn load_sample_data(conn: &Connection) -> Result<usize> {
    db::replace_recipe_rows(conn, &recipe_rows())?;
    Ok(RECIPES.len())
}
