//! Immutable item -> recipe lookup built from tabular recipe rows

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::db;
use crate::error::{CalcError, Result};
use crate::models::{Recipe, RecipeRow};
use crate::rates::RateMap;
use crate::raw_materials::RawMaterials;
use crate::table;

/// All known recipes, keyed by the item they produce.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: HashMap<String, Recipe>,
}

impl RecipeCatalog {
    /// Group rows into recipes, one per item, keeping ingredient row order.
    ///
    /// Every row of an item must agree on output quantity and cycle duration,
    /// and all quantities must be positive.
    pub fn from_rows<I>(rows: I, origin: &str) -> Result<Self>
    where
        I: IntoIterator<Item = RecipeRow>,
    {
        let mut grouped: HashMap<String, (f64, f64, Vec<(String, f64)>)> = HashMap::new();

        for (index, row) in rows.into_iter().enumerate() {
            let at = || format!("{} (row {}, item '{}')", origin, index + 1, row.item);

            if row.item.is_empty() {
                return Err(CalcError::data_source(at(), "missing item name"));
            }
            if row.ingredient.is_empty() {
                return Err(CalcError::data_source(at(), "missing ingredient name"));
            }
            if !(row.output_quantity.is_finite() && row.output_quantity > 0.0) {
                return Err(CalcError::data_source(
                    at(),
                    format!("output quantity must be positive, got {}", row.output_quantity),
                ));
            }
            if !(row.cycle_duration.is_finite() && row.cycle_duration > 0.0) {
                return Err(CalcError::data_source(
                    at(),
                    format!("cycle duration must be positive, got {}", row.cycle_duration),
                ));
            }
            if !(row.quantity.is_finite() && row.quantity > 0.0) {
                return Err(CalcError::data_source(
                    at(),
                    format!(
                        "quantity of '{}' must be positive, got {}",
                        row.ingredient, row.quantity
                    ),
                ));
            }

            match grouped.get_mut(&row.item) {
                Some((output_quantity, cycle_duration, ingredients)) => {
                    if *output_quantity != row.output_quantity {
                        return Err(CalcError::data_source(
                            at(),
                            format!(
                                "output quantity {} disagrees with earlier row ({})",
                                row.output_quantity, output_quantity
                            ),
                        ));
                    }
                    if *cycle_duration != row.cycle_duration {
                        return Err(CalcError::data_source(
                            at(),
                            format!(
                                "cycle duration {} disagrees with earlier row ({})",
                                row.cycle_duration, cycle_duration
                            ),
                        ));
                    }
                    if ingredients.iter().any(|(name, _)| *name == row.ingredient) {
                        return Err(CalcError::data_source(
                            at(),
                            format!("ingredient '{}' listed twice", row.ingredient),
                        ));
                    }
                    ingredients.push((row.ingredient, row.quantity));
                }
                None => {
                    grouped.insert(
                        row.item,
                        (
                            row.output_quantity,
                            row.cycle_duration,
                            vec![(row.ingredient, row.quantity)],
                        ),
                    );
                }
            }
        }

        let recipes = grouped
            .into_iter()
            .map(|(item, (output_quantity, cycle_duration, ingredients))| {
                let recipe = Recipe::new(item.clone(), output_quantity, cycle_duration, ingredients);
                (item, recipe)
            })
            .collect::<HashMap<_, _>>();

        info!(recipes = recipes.len(), origin, "recipe catalog built");
        Ok(RecipeCatalog { recipes })
    }

    /// Load every recipe row stored in the database.
    pub fn from_database(conn: &Connection) -> Result<Self> {
        let rows = db::load_recipe_rows(conn)?;
        Self::from_rows(rows, "recipe database")
    }

    /// Load a comma or tab separated recipe table from disk.
    pub fn from_table_file(path: &Path) -> Result<Self> {
        let rows = table::read_recipe_table(path)?;
        Self::from_rows(rows, &path.display().to_string())
    }

    pub fn get(&self, item: &str) -> Result<&Recipe> {
        self.recipes.get(item).ok_or_else(|| CalcError::UnknownItem {
            item: item.to_string(),
        })
    }

    pub fn contains(&self, item: &str) -> bool {
        self.recipes.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Item names in sorted order
    pub fn items(&self) -> Vec<&str> {
        let mut items: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        items.sort_unstable();
        items
    }

    pub fn cycle_duration(&self, item: &str, speed: f64) -> Result<f64> {
        self.get(item)?.cycle_duration(speed)
    }

    /// Production units needed to output `throughput` of `item` per second.
    /// Linear in `throughput`.
    pub fn units_required(&self, item: &str, throughput: f64, speed: f64) -> Result<f64> {
        self.get(item)?.units_required(throughput, speed)
    }

    /// Raw materials consumed to craft a single `item`, expressed in terms of
    /// the given raw material set.
    pub fn raw_material_counts(&self, item: &str, raw: &RawMaterials) -> Result<RateMap> {
        let mut path = Vec::new();
        self.raw_counts_on_path(item, raw, &mut path)
    }

    fn raw_counts_on_path(
        &self,
        item: &str,
        raw: &RawMaterials,
        path: &mut Vec<String>,
    ) -> Result<RateMap> {
        if let Some(start) = path.iter().position(|seen| seen == item) {
            let mut chain = path[start..].to_vec();
            chain.push(item.to_string());
            return Err(CalcError::CyclicDependency { chain });
        }

        let recipe = self.get(item)?;
        path.push(item.to_string());

        let mut counts = RateMap::new();
        for (ingredient, quantity) in recipe.ingredients() {
            let share = if raw.contains(ingredient) {
                RateMap::single(ingredient, *quantity)
            } else {
                self.raw_counts_on_path(ingredient, raw, path)?
                    .scaled(*quantity)
            };
            counts = counts + share;
        }

        path.pop();
        Ok(counts.scaled(1.0 / recipe.output_quantity()))
    }

    /// For each non-raw ingredient of `item`, the number of units needed to
    /// keep one unit crafting `item` continuously supplied.
    ///
    /// All units are assumed to share the same speed factor.
    pub fn ingredient_units_per_unit(
        &self,
        item: &str,
        speed: f64,
        raw: &RawMaterials,
    ) -> Result<Vec<(String, f64)>> {
        let recipe = self.get(item)?;
        let cycle = recipe.cycle_duration(speed)?;

        let mut counts = Vec::new();
        for (ingredient, quantity) in recipe.ingredients() {
            if raw.contains(ingredient) {
                continue;
            }
            let throughput = quantity / cycle;
            let units = self.units_required(ingredient, throughput, speed)?;
            counts.push((ingredient.clone(), units));
        }
        Ok(counts)
    }
}
