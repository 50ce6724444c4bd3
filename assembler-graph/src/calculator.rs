//! Production chain calculator logic

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::RecipeCatalog;
use crate::error::{CalcError, Result};
use crate::graph::MergedGraph;
use crate::models::{ProductionNode, check_speed};
use crate::rates::RateMap;
use crate::raw_materials::RawMaterials;

/// Resolves items into production trees against one catalog, raw material
/// set and machine speed.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    catalog: &'a RecipeCatalog,
    raw: &'a RawMaterials,
    speed: f64,
}

/// Items on the branch currently being resolved, root first.
#[derive(Default)]
struct ActivePath {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ActivePath {
    fn enter(&mut self, item: &str) -> Result<()> {
        if !self.members.insert(item.to_string()) {
            let start = self.order.iter().position(|seen| seen == item).unwrap_or(0);
            let mut chain = self.order[start..].to_vec();
            chain.push(item.to_string());
            return Err(CalcError::CyclicDependency { chain });
        }
        self.order.push(item.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(item) = self.order.pop() {
            self.members.remove(&item);
        }
    }
}

impl<'a> TreeBuilder<'a> {
    pub fn new(catalog: &'a RecipeCatalog, raw: &'a RawMaterials, speed: f64) -> Result<Self> {
        check_speed(speed)?;
        Ok(TreeBuilder {
            catalog,
            raw,
            speed,
        })
    }

    /// Build the tree of production units needed to output `throughput`
    /// items per second of `item`.
    pub fn resolve(&self, item: &str, throughput: f64) -> Result<ProductionNode> {
        if !(throughput.is_finite() && throughput >= 0.0) {
            return Err(CalcError::InvalidThroughput { throughput });
        }
        let mut path = ActivePath::default();
        self.resolve_on_path(item, throughput, &mut path)
    }

    fn resolve_on_path(
        &self,
        item: &str,
        throughput: f64,
        path: &mut ActivePath,
    ) -> Result<ProductionNode> {
        // Raw materials stop the walk even when a recipe exists
        if self.raw.contains(item) {
            return Ok(ProductionNode::raw(item, throughput));
        }

        path.enter(item)?;

        let recipe = self.catalog.get(item)?;
        let cycle = recipe.cycle_duration(self.speed)?;
        let units = recipe.units_required(throughput, self.speed)?;
        debug!(item, throughput, units, "resolved recipe");

        let mut ingredients = Vec::with_capacity(recipe.ingredients().len());
        for (ingredient, quantity) in recipe.ingredients() {
            let required = units * quantity / cycle;
            ingredients.push(self.resolve_on_path(ingredient, required, path)?);
        }

        path.leave();

        Ok(ProductionNode {
            item: item.to_string(),
            throughput,
            units,
            ingredients,
        })
    }
}

/// Calculate the production tree for `item` at `throughput` items per second.
pub fn calculate_production_chain(
    catalog: &RecipeCatalog,
    raw: &RawMaterials,
    item: &str,
    throughput: f64,
    speed: f64,
) -> Result<ProductionNode> {
    TreeBuilder::new(catalog, raw, speed)?.resolve(item, throughput)
}

/// Sum the throughput of every raw material leaf in the tree.
pub fn total_raw_input_throughput(node: &ProductionNode) -> RateMap {
    if node.is_raw_material() {
        RateMap::single(&node.item, node.throughput)
    } else {
        node.ingredients.iter().map(total_raw_input_throughput).sum()
    }
}

/// Total production units over the whole tree
pub fn total_units(node: &ProductionNode) -> f64 {
    node.units
        + node
            .ingredients
            .iter()
            .map(total_units)
            .sum::<f64>()
}

/// Format a production tree as an indented listing
pub fn format_production_chain(node: &ProductionNode, indent: usize) -> String {
    let mut output = String::new();
    let prefix = "  ".repeat(indent);

    if node.is_raw_material() {
        output.push_str(&format!(
            "{}-> {} @ {:.3}/s (input)\n",
            prefix, node.item, node.throughput
        ));
    } else {
        output.push_str(&format!(
            "{}{:.2}x {} @ {:.3}/s\n",
            prefix, node.units, node.item, node.throughput
        ));
        for ingredient in &node.ingredients {
            output.push_str(&format_production_chain(ingredient, indent + 1));
        }
    }

    output
}

/// Summary of a production chain calculation
#[derive(Debug)]
pub struct ChainSummary {
    pub target: String,
    pub throughput: f64,
    pub speed: f64,
    pub units: Vec<(String, f64)>,
    pub raw_inputs: RateMap,
    pub total_units: f64,
}

/// Generate a summary of the production chain
pub fn summarize_chain(node: &ProductionNode, speed: f64) -> ChainSummary {
    let merged = MergedGraph::merge(node);

    let units = merged
        .nodes()
        .filter(|(_, totals)| totals.units > 0.0)
        .map(|(item, totals)| (item.to_string(), totals.units))
        .collect();

    ChainSummary {
        target: node.item.clone(),
        throughput: node.throughput,
        speed,
        units,
        raw_inputs: total_raw_input_throughput(node),
        total_units: merged.total_units(),
    }
}

impl std::fmt::Display for ChainSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Production Summary ===")?;
        writeln!(
            f,
            "Target: {} @ {:.3}/s ({:.1}/min), speed {}",
            self.target,
            self.throughput,
            self.throughput * 60.0,
            self.speed
        )?;
        writeln!(f)?;

        writeln!(f, "Machines required:")?;
        for (item, units) in &self.units {
            writeln!(f, "  {:.2}x {}", units, item)?;
        }
        writeln!(f, "  {:.2} total", self.total_units)?;
        writeln!(f)?;

        writeln!(f, "Inputs required:")?;
        for (item, rate) in self.raw_inputs.iter() {
            writeln!(f, "  {} @ {:.3}/s ({:.1}/min)", item, rate, rate * 60.0)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeRow;
    use crate::sample;

    fn military_tree() -> ProductionNode {
        let catalog = RecipeCatalog::from_rows(sample::recipe_rows(), "sample").unwrap();
        let raw = sample::raw_materials();
        calculate_production_chain(&catalog, &raw, "military_science_pack", 150.0 / 60.0, 1.25)
            .unwrap()
    }

    fn node(item: &str, units: f64, throughput: f64, ingredients: Vec<ProductionNode>) -> ProductionNode {
        ProductionNode {
            item: item.to_string(),
            throughput,
            units,
            ingredients,
        }
    }

    fn leaf(item: &str, throughput: f64) -> ProductionNode {
        node(item, 0.0, throughput, Vec::new())
    }

    #[test]
    fn military_science_pack_tree() {
        let expected = node(
            "military_science_pack",
            10.0,
            2.5,
            vec![
                node(
                    "grenade",
                    8.0,
                    1.25,
                    vec![leaf("coal", 12.5), leaf("iron_plate", 6.25)],
                ),
                node(
                    "piercing_rounds_magazine",
                    3.0,
                    1.25,
                    vec![
                        leaf("copper_plate", 6.25),
                        node("firearm_magazine", 1.0, 1.25, vec![leaf("iron_plate", 5.0)]),
                        leaf("steel_plate", 1.25),
                    ],
                ),
                node("wall", 1.0, 2.5, vec![leaf("stone_brick", 12.5)]),
            ],
        );
        assert_eq!(military_tree(), expected);
    }

    #[test]
    fn military_science_pack_raw_inputs() {
        let expected: RateMap = [
            ("coal", 12.5),
            ("iron_plate", 11.25),
            ("copper_plate", 6.25),
            ("steel_plate", 1.25),
            ("stone_brick", 12.5),
        ]
        .into_iter()
        .collect();
        assert_eq!(total_raw_input_throughput(&military_tree()), expected);
    }

    #[test]
    fn raw_material_resolves_to_leaf() {
        let catalog = RecipeCatalog::default();
        let raw = sample::raw_materials();
        for throughput in [0.0, 0.3, 12.0] {
            let tree = calculate_production_chain(&catalog, &raw, "coal", throughput, 0.75).unwrap();
            assert_eq!(tree, leaf("coal", throughput));
        }
    }

    #[test]
    fn raw_membership_overrides_existing_recipe() {
        let catalog = RecipeCatalog::from_rows(sample::recipe_rows(), "sample").unwrap();
        let mut raw = sample::raw_materials();
        raw.insert("electronic_circuit");

        let tree = calculate_production_chain(&catalog, &raw, "inserter", 1.0, 1.0).unwrap();
        let circuit = &tree.ingredients[0];
        assert_eq!(circuit.item, "electronic_circuit");
        assert!(circuit.is_raw_material());
        assert_eq!(circuit.units, 0.0);
        assert_eq!(circuit.throughput, 1.0);
    }

    #[test]
    fn zero_throughput_keeps_shape() {
        let catalog = RecipeCatalog::from_rows(sample::recipe_rows(), "sample").unwrap();
        let raw = sample::raw_materials();
        let zero =
            calculate_production_chain(&catalog, &raw, "military_science_pack", 0.0, 1.25).unwrap();

        assert_eq!(zero.node_count(), military_tree().node_count());
        zero.walk(&mut |n| {
            assert_eq!(n.units, 0.0);
            assert_eq!(n.throughput, 0.0);
        });
    }

    #[test]
    fn unknown_ingredient_fails_whole_resolution() {
        let rows = vec![RecipeRow::new("gadget", "unobtainium", 1.0, 1.0, 1.0)];
        let catalog = RecipeCatalog::from_rows(rows, "test").unwrap();
        let err = calculate_production_chain(&catalog, &RawMaterials::default(), "gadget", 1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, CalcError::UnknownItem { item } if item == "unobtainium"));
    }

    #[test]
    fn cycle_is_reported_with_chain() {
        let rows = vec![
            RecipeRow::new("a", "b", 1.0, 1.0, 1.0),
            RecipeRow::new("b", "c", 1.0, 1.0, 1.0),
            RecipeRow::new("c", "b", 1.0, 1.0, 1.0),
        ];
        let catalog = RecipeCatalog::from_rows(rows, "test").unwrap();
        let err = calculate_production_chain(&catalog, &RawMaterials::default(), "a", 1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, CalcError::CyclicDependency { chain } if chain == ["b", "c", "b"]));
    }

    #[test]
    fn raw_material_breaks_cycle() {
        let rows = vec![
            RecipeRow::new("a", "b", 1.0, 1.0, 1.0),
            RecipeRow::new("b", "a", 1.0, 1.0, 1.0),
        ];
        let catalog = RecipeCatalog::from_rows(rows, "test").unwrap();
        let raw: RawMaterials = ["a"].into_iter().collect();
        let tree = calculate_production_chain(&catalog, &raw, "b", 1.0, 1.0).unwrap();
        assert_eq!(tree.ingredients, vec![leaf("a", 1.0)]);
    }

    #[test]
    fn shared_ingredient_on_sibling_branches_is_not_a_cycle() {
        let catalog = RecipeCatalog::from_rows(sample::recipe_rows(), "sample").unwrap();
        let raw = sample::raw_materials();
        // iron_gear_wheel is needed by both inserter and transport_belt
        let tree =
            calculate_production_chain(&catalog, &raw, "logistic_science_pack", 1.0, 0.75).unwrap();
        assert!(tree.node_count() > 5);
    }

    #[test]
    fn rejects_bad_inputs() {
        let catalog = RecipeCatalog::default();
        let raw = RawMaterials::default();
        assert!(matches!(
            TreeBuilder::new(&catalog, &raw, 0.0),
            Err(CalcError::InvalidSpeed { .. })
        ));
        let builder = TreeBuilder::new(&catalog, &raw, 1.0).unwrap();
        assert!(matches!(
            builder.resolve("coal", -1.0),
            Err(CalcError::InvalidThroughput { .. })
        ));
        assert!(builder.resolve("coal", f64::INFINITY).is_err());
    }

    #[test]
    fn resolve_is_idempotent() {
        assert_eq!(military_tree(), military_tree());
    }

    #[test]
    fn summary_lists_machines_and_inputs() {
        let tree = military_tree();
        let summary = summarize_chain(&tree, 1.25);
        assert_eq!(summary.total_units, 23.0);
        assert_eq!(summary.units.len(), 5);
        assert_eq!(summary.raw_inputs.get("coal"), Some(12.5));

        let text = summary.to_string();
        assert!(text.contains("Target: military_science_pack @ 2.500/s (150.0/min)"));
        assert!(text.contains("  10.00x military_science_pack"));
        assert!(text.contains("  iron_plate @ 11.250/s"));
    }

    #[test]
    fn format_indents_ingredients() {
        let text = format_production_chain(&military_tree(), 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "10.00x military_science_pack @ 2.500/s");
        assert_eq!(lines[1], "  8.00x grenade @ 1.250/s");
        assert_eq!(lines[2], "    -> coal @ 12.500/s (input)");
        assert_eq!(lines.len(), military_tree().node_count());
    }

    #[test]
    fn total_units_sums_tree() {
        assert_eq!(total_units(&military_tree()), 23.0);
    }
}
