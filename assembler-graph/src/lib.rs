//! Assembling machine dependency calculator
//!
//! Given a target item, an output rate and a machine tier, works out how
//! many production units every ingredient in the item's recipe tree needs
//! and how fast each ingredient must flow, down to a chosen set of raw
//! inputs. Results come as a per-occurrence tree or as a combined graph
//! with one node per item.

pub mod aliases;
pub mod calculator;
pub mod catalog;
pub mod db;
pub mod error;
pub mod graph;
pub mod icons;
pub mod models;
pub mod rates;
pub mod raw_materials;
pub mod render;
pub mod sample;
pub mod table;
pub mod tier;

pub use calculator::{
    TreeBuilder, calculate_production_chain, summarize_chain, total_raw_input_throughput,
};
pub use catalog::RecipeCatalog;
pub use error::{CalcError, Result};
pub use graph::{MergedGraph, MergedNode};
pub use models::{ProductionNode, Recipe, RecipeRow};
pub use rates::RateMap;
pub use raw_materials::RawMaterials;
pub use tier::MachineTier;
