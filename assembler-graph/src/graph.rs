//! Combined production graph: one node per item instead of one per occurrence

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::models::ProductionNode;
use crate::rates::RateMap;

/// Totals accumulated for one item across every place it occurs in a tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedNode {
    pub item: String,
    pub units: f64,
    pub throughput: f64,
}

/// A production tree with each item collapsed into a single node.
///
/// Unit counts and throughputs are extensive, so the totals for an item are
/// the sums over its occurrences. Which consumer asked for which share is
/// not kept; use the tree for per-branch numbers.
///
/// Edges point from an item to each of its ingredients.
#[derive(Debug, Clone, Default)]
pub struct MergedGraph {
    graph: DiGraph<MergedNode, ()>,
    index: BTreeMap<String, NodeIndex>,
}

impl MergedGraph {
    pub fn merge(root: &ProductionNode) -> Self {
        let mut graph = MergedGraph::default();
        graph.add_tree(root);
        graph
    }

    fn add_tree(&mut self, node: &ProductionNode) -> NodeIndex {
        let id = self.node_index(&node.item);
        let entry = &mut self.graph[id];
        entry.units += node.units;
        entry.throughput += node.throughput;

        for ingredient in &node.ingredients {
            let child = self.add_tree(ingredient);
            self.graph.update_edge(id, child, ());
        }
        id
    }

    fn node_index(&mut self, item: &str) -> NodeIndex {
        if let Some(&id) = self.index.get(item) {
            return id;
        }
        let id = self.graph.add_node(MergedNode {
            item: item.to_string(),
            ..MergedNode::default()
        });
        self.index.insert(item.to_string(), id);
        id
    }

    /// The underlying petgraph, with nodes in first-visit order
    pub fn graph(&self) -> &DiGraph<MergedNode, ()> {
        &self.graph
    }

    /// Nodes in item order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &MergedNode)> {
        self.index
            .iter()
            .map(move |(item, &id)| (item.as_str(), &self.graph[id]))
    }

    pub fn node(&self, item: &str) -> Option<&MergedNode> {
        self.index.get(item).map(|&id| &self.graph[id])
    }

    /// Edges as `(item, ingredient)` pairs, each present once, in item order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].item.as_str(),
                    self.graph[edge.target()].item.as_str(),
                )
            })
            .collect();
        edges.sort_unstable();
        edges.into_iter()
    }

    pub fn has_edge(&self, item: &str, ingredient: &str) -> bool {
        match (self.index.get(item), self.index.get(ingredient)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn total_units(&self) -> f64 {
        self.graph.node_weights().map(|node| node.units).sum()
    }

    /// Items that nothing in the graph is made from, with their total throughput.
    pub fn inputs(&self) -> RateMap {
        self.index
            .iter()
            .filter(|(_, id)| {
                self.graph
                    .neighbors_directed(**id, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|(item, &id)| (item.as_str(), self.graph[id].throughput))
            .collect()
    }
}

/// Graphs are equal when they hold the same items, totals and links,
/// whatever order the tree was walked in.
impl PartialEq for MergedGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges().eq(other.edges())
    }
}

impl From<&ProductionNode> for MergedGraph {
    fn from(root: &ProductionNode) -> Self {
        MergedGraph::merge(root)
    }
}

impl std::fmt::Display for MergedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Combined Machines ===")?;
        for (item, node) in self.nodes() {
            if node.units > 0.0 {
                writeln!(f, "  {:.2}x {} @ {:.3}/s", node.units, item, node.throughput)?;
            } else {
                writeln!(f, "  {} @ {:.3}/s (input)", item, node.throughput)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Links:")?;
        for (item, ingredient) in self.edges() {
            writeln!(f, "  {} <- {}", item, ingredient)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{calculate_production_chain, total_raw_input_throughput};
    use crate::catalog::RecipeCatalog;
    use crate::models::RecipeRow;
    use crate::raw_materials::RawMaterials;
    use crate::sample;

    fn node(item: &str, units: f64, throughput: f64, ingredients: Vec<ProductionNode>) -> ProductionNode {
        ProductionNode {
            item: item.to_string(),
            throughput,
            units,
            ingredients,
        }
    }

    #[test]
    fn diamond_sums_shared_item() {
        // top needs left and right, both need gear, gear needs plate
        let rows = vec![
            RecipeRow::new("top", "left", 1.0, 1.0, 1.0),
            RecipeRow::new("top", "right", 2.0, 1.0, 1.0),
            RecipeRow::new("left", "gear", 1.0, 1.0, 2.0),
            RecipeRow::new("right", "gear", 3.0, 1.0, 1.0),
            RecipeRow::new("gear", "plate", 2.0, 1.0, 0.5),
        ];
        let catalog = RecipeCatalog::from_rows(rows, "diamond").unwrap();
        let raw: RawMaterials = ["plate"].into_iter().collect();
        let tree = calculate_production_chain(&catalog, &raw, "top", 1.0, 1.0).unwrap();

        let left_gear = &tree.ingredients[0].ingredients[0];
        let right_gear = &tree.ingredients[1].ingredients[0];
        let graph = MergedGraph::merge(&tree);

        let gear = graph.node("gear").unwrap();
        assert_eq!(gear.units, left_gear.units + right_gear.units);
        assert_eq!(gear.throughput, left_gear.throughput + right_gear.throughput);

        assert!(graph.has_edge("left", "gear"));
        assert!(graph.has_edge("right", "gear"));
        // two gear -> plate tree edges collapse into one
        assert!(graph.has_edge("gear", "plate"));
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.node_count(), 5);
    }

    #[test]
    fn repeated_edges_collapse() {
        let tree = node(
            "a",
            1.0,
            1.0,
            vec![
                node("b", 0.0, 1.0, vec![]),
                node("c", 2.0, 1.0, vec![node("b", 0.0, 0.5, vec![])]),
                node("b", 0.0, 2.0, vec![]),
            ],
        );
        let graph = MergedGraph::from(&tree);
        let edges: Vec<(&str, &str)> = graph.edges().collect();
        assert_eq!(edges, [("a", "b"), ("a", "c"), ("c", "b")]);
        assert_eq!(graph.node("b").unwrap().throughput, 3.5);
        assert_eq!(graph.node("a").unwrap().units, 1.0);
        assert_eq!(graph.total_units(), 3.0);
    }

    #[test]
    fn military_graph_totals() {
        let catalog = RecipeCatalog::from_rows(sample::recipe_rows(), "sample").unwrap();
        let raw = sample::raw_materials();
        let tree =
            calculate_production_chain(&catalog, &raw, "military_science_pack", 2.5, 1.25).unwrap();
        let graph = MergedGraph::merge(&tree);

        // iron_plate feeds both grenade and firearm_magazine
        let iron = graph.node("iron_plate").unwrap();
        assert_eq!(iron.throughput, 11.25);
        assert_eq!(iron.units, 0.0);
        assert_eq!(graph.node_count(), 10);
        assert_eq!(graph.total_units(), 23.0);
        assert_eq!(graph.inputs(), total_raw_input_throughput(&tree));
    }

    #[test]
    fn merge_ignores_child_order() {
        let a = node(
            "x",
            1.0,
            1.0,
            vec![node("y", 0.0, 1.0, vec![]), node("z", 1.0, 2.0, vec![node("y", 0.0, 4.0, vec![])])],
        );
        let b = node(
            "x",
            1.0,
            1.0,
            vec![node("z", 1.0, 2.0, vec![node("y", 0.0, 4.0, vec![])]), node("y", 0.0, 1.0, vec![])],
        );
        assert_eq!(MergedGraph::merge(&a), MergedGraph::merge(&b));
    }

    #[test]
    fn display_lists_inputs_and_links() {
        let tree = node("a", 2.0, 1.0, vec![node("b", 0.0, 3.0, vec![])]);
        let text = MergedGraph::merge(&tree).to_string();
        assert!(text.contains("  2.00x a @ 1.000/s"));
        assert!(text.contains("  b @ 3.000/s (input)"));
        assert!(text.contains("  a <- b"));
    }
}
