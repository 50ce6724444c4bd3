//! Data models for recipes and resolved production chains

use crate::error::{CalcError, Result};

/// One row of a tabular recipe source: a single ingredient of a single recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRow {
    pub item: String,
    pub ingredient: String,
    pub quantity: f64,        // consumed per cycle
    pub output_quantity: f64, // produced per cycle
    pub cycle_duration: f64,  // seconds at speed 1.0
}

impl RecipeRow {
    pub fn new(
        item: &str,
        ingredient: &str,
        quantity: f64,
        output_quantity: f64,
        cycle_duration: f64,
    ) -> Self {
        RecipeRow {
            item: item.to_string(),
            ingredient: ingredient.to_string(),
            quantity,
            output_quantity,
            cycle_duration,
        }
    }
}

/// How one item is crafted: output per cycle, cycle time and ingredients.
///
/// Ingredients keep the order they were declared in, which fixes the child
/// order of every resolved tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    item: String,
    output_quantity: f64,
    cycle_duration: f64,
    ingredients: Vec<(String, f64)>,
}

impl Recipe {
    pub(crate) fn new(
        item: String,
        output_quantity: f64,
        cycle_duration: f64,
        ingredients: Vec<(String, f64)>,
    ) -> Self {
        Recipe {
            item,
            output_quantity,
            cycle_duration,
            ingredients,
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn output_quantity(&self) -> f64 {
        self.output_quantity
    }

    /// Cycle duration at reference speed (a hand-crafting player).
    pub fn reference_cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    pub fn ingredients(&self) -> &[(String, f64)] {
        &self.ingredients
    }

    /// Time taken to run the recipe once on a unit with the given speed factor.
    ///
    /// This is the time for one cycle, not for a single item: a recipe that
    /// yields two copper cables per cycle still takes the full cycle.
    pub fn cycle_duration(&self, speed: f64) -> Result<f64> {
        check_speed(speed)?;
        Ok(self.cycle_duration / speed)
    }

    /// Number of production units needed to sustain `throughput` items per second.
    pub fn units_required(&self, throughput: f64, speed: f64) -> Result<f64> {
        Ok(throughput * self.cycle_duration(speed)? / self.output_quantity)
    }
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x{} in {}s from ",
            self.item, self.output_quantity, self.cycle_duration
        )?;
        for (i, (ingredient, quantity)) in self.ingredients.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} x{}", ingredient, quantity)?;
        }
        Ok(())
    }
}

pub(crate) fn check_speed(speed: f64) -> Result<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(CalcError::InvalidSpeed { speed })
    }
}

/// One occurrence of an item in a resolved production tree
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionNode {
    pub item: String,
    pub throughput: f64, // items per second this node must output
    pub units: f64,      // zero for raw material leaves
    pub ingredients: Vec<ProductionNode>,
}

impl ProductionNode {
    pub(crate) fn raw(item: &str, throughput: f64) -> Self {
        ProductionNode {
            item: item.to_string(),
            throughput,
            units: 0.0,
            ingredients: Vec::new(),
        }
    }

    /// Leaves are raw materials. Every recipe has at least one ingredient, so
    /// a node without children was produced by the raw-material rule.
    pub fn is_raw_material(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Depth-first pre-order walk over this node and all descendants.
    pub fn walk(&self, visit: &mut impl FnMut(&ProductionNode)) {
        visit(self);
        for ingredient in &self.ingredients {
            ingredient.walk(visit);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}
