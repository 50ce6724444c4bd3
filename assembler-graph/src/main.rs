//! Assembling machine graph calculator
//!
//! Works out how many assembling machines are needed to craft an item at a
//! given rate, along with the flow rate of every intermediate ingredient.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use assembler_graph::aliases::canonical_item_name;
use assembler_graph::icons::{IconCache, IconProvider};
use assembler_graph::{
    MachineTier, MergedGraph, RateMap, RawMaterials, RecipeCatalog, TreeBuilder, calculator, db,
    render, sample, table,
};

#[derive(Parser)]
#[command(name = "amg")]
#[command(about = "Assembling machines needed to craft a Factorio item at a given rate")]
#[command(after_help = "Rates are assumed to be limited only by the machines: belts and \
inserters are treated as never being the bottleneck.")]
struct Cli {
    /// Path to the SQLite recipe database
    #[arg(short, long, env = "AMG_DATABASE", default_value = "recipes.db", global = true)]
    database: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a recipe table (.csv/.tsv), or every table under a directory
    Import {
        /// Table file or directory
        path: PathBuf,

        /// Clear existing recipes before import
        #[arg(long)]
        clear: bool,
    },

    /// Calculate the machines needed to craft an item
    Calc {
        /// Item to craft, snake_case (e.g. "utility_science_pack") or a shorthand like "bluescience"
        item: String,

        /// Target rate in items per minute
        #[arg(short, long, default_value = "60")]
        rate: f64,

        /// Assembling machine tier (0 = by hand)
        #[arg(short = 'm', long, value_enum, default_value = "1")]
        assembling_machine: MachineTier,

        /// Crafting speed overriding the machine tier (e.g. with speed modules)
        #[arg(long)]
        speed: Option<f64>,

        /// Items treated as inputs rather than crafted
        #[arg(short, long, env = "AMG_RAW_MATERIALS", default_value = "raw_materials.txt")]
        inputs_file: PathBuf,

        /// Read recipes from this table instead of the database
        #[arg(short = 'f', long)]
        recipes_file: Option<PathBuf>,

        /// Add up all machines making each item into one node
        #[arg(short, long)]
        combine_assemblers: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Attach item icons to DOT output, downloading missing ones
        #[arg(long)]
        icons: bool,

        #[arg(long, env = "AMG_ICON_CACHE", default_value = "cache")]
        icon_cache: PathBuf,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Raw materials needed to craft one of an item
    RawCounts {
        item: String,

        #[arg(short, long, env = "AMG_RAW_MATERIALS", default_value = "raw_materials.txt")]
        inputs_file: PathBuf,

        #[arg(short = 'f', long)]
        recipes_file: Option<PathBuf>,
    },

    /// Combined raw input rates for several items crafted at the same rate
    Totals {
        items: Vec<String>,

        /// Rate of each item in items per minute
        #[arg(short, long, default_value = "12")]
        rate: f64,

        #[arg(short = 'm', long, value_enum, default_value = "2")]
        assembling_machine: MachineTier,

        #[arg(short, long, env = "AMG_RAW_MATERIALS", default_value = "raw_materials.txt")]
        inputs_file: PathBuf,

        #[arg(short = 'f', long)]
        recipes_file: Option<PathBuf>,
    },

    /// Show a recipe and the machines each ingredient needs to keep one machine busy
    Recipe {
        item: String,

        #[arg(short = 'm', long, value_enum, default_value = "1")]
        assembling_machine: MachineTier,

        #[arg(short, long, env = "AMG_RAW_MATERIALS", default_value = "raw_materials.txt")]
        inputs_file: PathBuf,

        #[arg(short = 'f', long)]
        recipes_file: Option<PathBuf>,
    },

    /// List all items with a recipe
    ListItems,

    /// Initialize empty database with schema
    Init,

    /// Load a built-in recipe subset for testing (without a recipe table)
    LoadSample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Import { path, clear } => {
            let conn = open_database(&cli.database)?;
            if clear {
                println!("Replacing existing recipes...");
            }

            let stats = table::import_to_database(&conn, &path, clear)
                .with_context(|| format!("importing {}", path.display()))?;
            println!("{}", stats);
        }

        Commands::Calc {
            item,
            rate,
            assembling_machine,
            speed,
            inputs_file,
            recipes_file,
            combine_assemblers,
            format,
            icons,
            icon_cache,
            output,
        } => {
            let catalog = load_catalog(&cli.database, recipes_file.as_deref())?;
            let raw = load_raw_materials(&inputs_file)?;
            let item = canonical_item_name(&item);
            let throughput = rate / 60.0;
            let speed = speed.unwrap_or(assembling_machine.crafting_speed());
            info!(%item, throughput, speed, "calculating");

            let tree = TreeBuilder::new(&catalog, &raw, speed)?.resolve(&item, throughput)?;

            let text = match format {
                OutputFormat::Text => {
                    let mut text = if combine_assemblers {
                        MergedGraph::merge(&tree).to_string()
                    } else {
                        format!(
                            "Production chain:\n\n{}",
                            calculator::format_production_chain(&tree, 0)
                        )
                    };
                    text.push('\n');
                    text.push_str(&calculator::summarize_chain(&tree, speed).to_string());
                    text
                }
                OutputFormat::Dot => {
                    let title = format!(
                        "Assemblers required to make {} {} per minute",
                        rate, item
                    );
                    let cache = icons.then(|| IconCache::new(icon_cache));
                    let provider = cache.as_ref().map(|cache| cache as &dyn IconProvider);
                    if combine_assemblers {
                        render::merged_to_dot(&MergedGraph::merge(&tree), &title, provider)?
                    } else {
                        render::tree_to_dot(&tree, &title, provider)?
                    }
                }
            };

            match output {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", text),
            }
        }

        Commands::RawCounts {
            item,
            inputs_file,
            recipes_file,
        } => {
            let catalog = load_catalog(&cli.database, recipes_file.as_deref())?;
            let raw = load_raw_materials(&inputs_file)?;
            let item = canonical_item_name(&item);

            let counts = catalog.raw_material_counts(&item, &raw)?;
            println!("Raw materials for one {}:", item);
            for (material, count) in counts.iter() {
                println!("  {:.3}x {}", count, material);
            }
        }

        Commands::Totals {
            items,
            rate,
            assembling_machine,
            inputs_file,
            recipes_file,
        } => {
            if items.is_empty() {
                bail!("give at least one item");
            }
            let catalog = load_catalog(&cli.database, recipes_file.as_deref())?;
            let raw = load_raw_materials(&inputs_file)?;
            let builder = TreeBuilder::new(&catalog, &raw, assembling_machine.crafting_speed())?;

            let mut total = RateMap::new();
            for item in &items {
                let item = canonical_item_name(item);
                let tree = builder.resolve(&item, rate / 60.0)?;
                total = total + calculator::total_raw_input_throughput(&tree);
            }

            println!("Inputs for {} of each item per minute:", rate);
            for (material, per_minute) in total.scaled(60.0).iter() {
                println!("  {} @ {:.2}/min", material, per_minute);
            }
        }

        Commands::Recipe {
            item,
            assembling_machine,
            inputs_file,
            recipes_file,
        } => {
            let catalog = load_catalog(&cli.database, recipes_file.as_deref())?;
            let raw = load_raw_materials(&inputs_file)?;
            let item = canonical_item_name(&item);
            let speed = assembling_machine.crafting_speed();

            let recipe = catalog.get(&item)?;
            println!("Recipe: {}", recipe);
            println!("  Cycle on {}: {:.3}s", assembling_machine, recipe.cycle_duration(speed)?);

            let feeders = catalog.ingredient_units_per_unit(&item, speed, &raw)?;
            if !feeders.is_empty() {
                println!("  Machines per {} machine:", item);
                for (ingredient, units) in feeders {
                    println!("    {:.3}x {}", units, ingredient);
                }
            }
        }

        Commands::ListItems => {
            let conn = open_database(&cli.database)?;
            let items = db::list_items(&conn)?;
            if items.is_empty() {
                println!("No recipes in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("Craftable items:");
                for item in items {
                    println!("  {}", item);
                }
            }
        }

        Commands::Init => {
            open_database(&cli.database)?;
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let conn = open_database(&cli.database)?;
            let count = sample::load_sample_data(&conn)?;
            println!("Loaded {} sample recipes", count);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn load_catalog(database: &Path, recipes_file: Option<&Path>) -> Result<RecipeCatalog> {
    let catalog = match recipes_file {
        Some(path) => RecipeCatalog::from_table_file(path)?,
        None => RecipeCatalog::from_database(&open_database(database)?)?,
    };
    if catalog.is_empty() {
        bail!("No recipes found. Run 'import' or 'load-sample' first, or pass --recipes-file.");
    }
    Ok(catalog)
}

fn load_raw_materials(path: &Path) -> Result<RawMaterials> {
    RawMaterials::load(path).context("the inputs file lists items that are supplied rather than crafted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_command_accepts_a_recipes_file() {
        for command in ["calc", "raw-counts", "totals", "recipe"] {
            let cli = Cli::try_parse_from(["amg", command, "wall", "-f", "recipes.csv"]).unwrap();
            let recipes_file = match cli.command {
                Commands::Calc { recipes_file, .. }
                | Commands::RawCounts { recipes_file, .. }
                | Commands::Totals { recipes_file, .. }
                | Commands::Recipe { recipes_file, .. } => recipes_file,
                _ => None,
            };
            assert_eq!(recipes_file, Some(PathBuf::from("recipes.csv")), "{command}");
        }
    }

    #[test]
    fn import_clear_flag_parses() {
        let cli = Cli::try_parse_from(["amg", "import", "tables", "--clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { clear: true, .. }));
    }
}
