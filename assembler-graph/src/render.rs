//! Graphviz DOT output for production trees and combined graphs

use std::fmt::{self, Write};

use petgraph::visit::{EdgeRef, IntoNodeReferences, NodeIndexable, NodeRef};
use tracing::warn;

use crate::graph::MergedGraph;
use crate::icons::IconProvider;
use crate::models::ProductionNode;

const INDENT: &str = "  ";

/// Node label: unit count in bold (omitted for inputs) above the output rate.
fn label(item: &str, units: f64, throughput: f64) -> String {
    let mut label = format!("<{}", escape(item));
    if units != 0.0 {
        label.push_str(&format!("<br/><b>{:.1}</b>", units));
    }
    label.push_str(&format!("<br/>{:.2}/s>", throughput));
    label
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Extra attributes for the icon; empty without a provider or on failure.
fn icon_attributes(icons: Option<&dyn IconProvider>, item: &str) -> String {
    let Some(icons) = icons else {
        return String::new();
    };
    match icons.icon(item) {
        Ok(path) => format!(
            ", image=\"{}\", imagepos=\"tc\", labelloc=\"b\"",
            escape(&path.display().to_string())
        ),
        Err(e) => {
            warn!(item, error = %e, "rendering without icon");
            String::new()
        }
    }
}

fn header(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "digraph production {{")?;
    writeln!(out, "{}label=\"{}\";", INDENT, escape(title))?;
    writeln!(out, "{}labelloc=\"t\";", INDENT)?;
    writeln!(out, "{}rankdir=\"TB\";", INDENT)?;
    writeln!(out, "{}node [shape=box, style=\"dashed\"];", INDENT)
}

/// One DOT node per tree occurrence, so shared items appear repeatedly.
pub fn tree_to_dot(
    root: &ProductionNode,
    title: &str,
    icons: Option<&dyn IconProvider>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    header(&mut out, title)?;
    let mut next_id = 0;
    add_tree_node(&mut out, root, icons, &mut next_id)?;
    writeln!(out, "}}")?;
    Ok(out)
}

fn add_tree_node(
    out: &mut String,
    node: &ProductionNode,
    icons: Option<&dyn IconProvider>,
    next_id: &mut usize,
) -> Result<usize, fmt::Error> {
    let id = *next_id;
    *next_id += 1;

    writeln!(
        out,
        "{}n{} [label={}{}];",
        INDENT,
        id,
        label(&node.item, node.units, node.throughput),
        icon_attributes(icons, &node.item)
    )?;

    for ingredient in &node.ingredients {
        let child = add_tree_node(out, ingredient, icons, next_id)?;
        writeln!(out, "{}n{} -> n{};", INDENT, id, child)?;
    }
    Ok(id)
}

/// One DOT node per item, with combined totals.
pub fn merged_to_dot(
    merged: &MergedGraph,
    title: &str,
    icons: Option<&dyn IconProvider>,
) -> Result<String, fmt::Error> {
    let g = merged.graph();
    let mut out = String::new();
    header(&mut out, title)?;

    for node in g.node_references() {
        let totals = node.weight();
        writeln!(
            out,
            "{}n{} [label={}{}];",
            INDENT,
            g.to_index(node.id()),
            label(&totals.item, totals.units, totals.throughput),
            icon_attributes(icons, &totals.item)
        )?;
    }
    for edge in g.edge_references() {
        writeln!(
            out,
            "{}n{} -> n{};",
            INDENT,
            g.to_index(edge.source()),
            g.to_index(edge.target())
        )?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconError;
    use std::path::PathBuf;

    struct FixedIcons;

    impl IconProvider for FixedIcons {
        fn icon(&self, item: &str) -> Result<PathBuf, IconError> {
            if item == "coal" {
                Ok(PathBuf::from("cache/coal.png"))
            } else {
                Err(IconError::Status {
                    url: format!("http://icons/{item}.png"),
                    status: 404,
                })
            }
        }
    }

    fn tree() -> ProductionNode {
        let coal = |throughput| ProductionNode {
            item: "coal".into(),
            throughput,
            units: 0.0,
            ingredients: vec![],
        };
        ProductionNode {
            item: "grenade".into(),
            throughput: 1.25,
            units: 8.0,
            ingredients: vec![coal(12.5), coal(1.0)],
        }
    }

    #[test]
    fn tree_has_node_per_occurrence() {
        let dot = tree_to_dot(&tree(), "grenades", None).unwrap();
        assert!(dot.starts_with("digraph production {"));
        assert!(dot.contains("n0 [label=<grenade<br/><b>8.0</b><br/>1.25/s>];"));
        assert!(dot.contains("n1 [label=<coal<br/>12.50/s>];"));
        assert!(dot.contains("n2 [label=<coal<br/>1.00/s>];"));
        assert!(dot.contains("n0 -> n1;"));
        assert!(dot.contains("n0 -> n2;"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn merged_has_node_per_item() {
        let graph = MergedGraph::merge(&tree());
        let dot = merged_to_dot(&graph, "grenades", None).unwrap();
        assert!(dot.contains("n0 [label=<grenade<br/><b>8.0</b><br/>1.25/s>];"));
        assert!(dot.contains("n1 [label=<coal<br/>13.50/s>];"));
        assert_eq!(dot.matches(" -> ").count(), 1);
        assert!(dot.contains("n0 -> n1;"));
    }

    #[test]
    fn icon_failures_only_drop_the_image() {
        let dot = tree_to_dot(&tree(), "grenades", Some(&FixedIcons)).unwrap();
        assert!(dot.contains("image=\"cache/coal.png\""));
        assert!(dot.contains("n0 [label=<grenade<br/><b>8.0</b><br/>1.25/s>];"));
    }
}
