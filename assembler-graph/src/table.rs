//! Delimited recipe table parsing
//!
//! Reads comma or tab separated recipe tables with a header row, one row per
//! (item, ingredient) pair, and validates column presence and numeric fields
//! before anything reaches the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use rusqlite::Connection;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::catalog::RecipeCatalog;
use crate::db;
use crate::error::{CalcError, Result};
use crate::models::RecipeRow;

/// Accepted header names for each required column
const ITEM: &[&str] = &["item"];
const INGREDIENT: &[&str] = &["ingredient", "resource"];
const QUANTITY: &[&str] = &["quantity", "quantity_per_cycle"];
const OUTPUT_QUANTITY: &[&str] = &["output_quantity", "output_quantity_per_cycle", "num_produced"];
const CYCLE_DURATION: &[&str] = &["cycle_duration", "handcraft_time"];

struct Columns {
    item: usize,
    ingredient: usize,
    quantity: usize,
    output_quantity: usize,
    cycle_duration: usize,
}

impl Columns {
    fn locate(header: &[&str], origin: &str) -> Result<Self> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|column| names.iter().any(|name| column.eq_ignore_ascii_case(name)))
                .ok_or_else(|| {
                    CalcError::data_source(origin, format!("missing column '{}'", names[0]))
                })
        };

        Ok(Columns {
            item: find(ITEM)?,
            ingredient: find(INGREDIENT)?,
            quantity: find(QUANTITY)?,
            output_quantity: find(OUTPUT_QUANTITY)?,
            cycle_duration: find(CYCLE_DURATION)?,
        })
    }
}

/// Parse the text of a recipe table. `origin` names the source in errors.
pub fn parse_recipe_table(text: &str, origin: &str) -> Result<Vec<RecipeRow>> {
    let separator = Regex::new(r" *[,\t] *")?;

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let Some((_, header)) = lines.next() else {
        return Err(CalcError::data_source(origin, "no header row"));
    };
    let header: Vec<&str> = separator.split(header).collect();
    let columns = Columns::locate(&header, origin)?;

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let at = format!("{}:{}", origin, line_no);
        let fields: Vec<&str> = separator.split(line).collect();

        let text_field = |index: usize, name: &str| -> Result<String> {
            match fields.get(index) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(CalcError::data_source(&at, format!("missing field '{}'", name))),
            }
        };
        let number_field = |index: usize, name: &str| -> Result<f64> {
            let value = text_field(index, name)?;
            value.parse::<f64>().map_err(|_| {
                CalcError::data_source(&at, format!("field '{}' is not a number: '{}'", name, value))
            })
        };

        rows.push(RecipeRow {
            item: text_field(columns.item, ITEM[0])?,
            ingredient: text_field(columns.ingredient, INGREDIENT[0])?,
            quantity: number_field(columns.quantity, QUANTITY[0])?,
            output_quantity: number_field(columns.output_quantity, OUTPUT_QUANTITY[0])?,
            cycle_duration: number_field(columns.cycle_duration, CYCLE_DURATION[0])?,
        });
    }

    Ok(rows)
}

pub fn read_recipe_table(path: &Path) -> Result<Vec<RecipeRow>> {
    let text = fs::read_to_string(path).map_err(|source| CalcError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_recipe_table(&text, &path.display().to_string())
}

fn is_table_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"))
}

/// Find all recipe tables under a directory, in path order
pub fn find_table_files(dir: &Path) -> Vec<PathBuf> {
    let mut tables: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_table_file(path))
        .collect();
    tables.sort();
    tables
}

/// Import a table file, or every table under a directory, into the database.
/// With `clear`, the imported rows replace everything stored before.
///
/// All files are parsed and checked against the recipes they will sit
/// beside before anything is written, so a bad file leaves the database
/// untouched.
pub fn import_to_database(conn: &Connection, source: &Path, clear: bool) -> Result<ImportStats> {
    let files = if source.is_dir() {
        info!(dir = %source.display(), "scanning for recipe tables");
        find_table_files(source)
    } else {
        vec![source.to_path_buf()]
    };

    let mut stats = ImportStats::default();
    let mut all_rows = Vec::new();
    for file in &files {
        let rows = read_recipe_table(file)?;
        info!(file = %file.display(), rows = rows.len(), "parsed recipe table");
        stats.files += 1;
        stats.rows += rows.len();
        all_rows.extend(rows);
    }

    let mut items: Vec<&str> = all_rows.iter().map(|row| row.item.as_str()).collect();
    items.sort_unstable();
    items.dedup();
    stats.items = items.len();

    let mut combined = if clear {
        Vec::new()
    } else {
        db::load_recipe_rows(conn)?
    };
    combined.extend(all_rows.iter().cloned());
    RecipeCatalog::from_rows(combined, &source.display().to_string())?;

    if clear {
        db::replace_recipe_rows(conn, &all_rows)?;
    } else {
        db::insert_recipe_rows(conn, &all_rows)?;
    }
    Ok(stats)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    pub rows: usize,
    pub items: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} recipe rows for {} items from {} file(s)",
            self.rows, self.items, self.files
        )
    }
}
