//! Database schema and operations for stored recipe rows

use rusqlite::Connection;

use crate::error::Result;
use crate::models::RecipeRow;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per (item, ingredient); id keeps the declared ingredient order
        CREATE TABLE IF NOT EXISTS recipe_rows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item TEXT NOT NULL,
            ingredient TEXT NOT NULL,
            quantity REAL NOT NULL,
            output_quantity REAL NOT NULL,
            cycle_duration REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_recipe_rows_item ON recipe_rows(item);
        "#,
    )?;
    Ok(())
}

/// Append recipe rows in a single transaction
pub fn insert_recipe_rows(conn: &Connection, rows: &[RecipeRow]) -> Result<()> {
    write_recipe_rows(conn, rows, false)
}

/// Replace every stored row with `rows`. The delete and the inserts commit
/// together, so a failure keeps the previous recipes.
pub fn replace_recipe_rows(conn: &Connection, rows: &[RecipeRow]) -> Result<()> {
    write_recipe_rows(conn, rows, true)
}

fn write_recipe_rows(conn: &Connection, rows: &[RecipeRow], clear: bool) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if clear {
        tx.execute("DELETE FROM recipe_rows", [])?;
    }
    {
        let mut stmt = tx.prepare(
            "INSERT INTO recipe_rows (item, ingredient, quantity, output_quantity, cycle_duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for row in rows {
            stmt.execute((
                &row.item,
                &row.ingredient,
                row.quantity,
                row.output_quantity,
                row.cycle_duration,
            ))?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// All stored rows in insertion order
pub fn load_recipe_rows(conn: &Connection) -> Result<Vec<RecipeRow>> {
    let mut stmt = conn.prepare(
        "SELECT item, ingredient, quantity, output_quantity, cycle_duration
         FROM recipe_rows
         ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(RecipeRow {
            item: row.get(0)?,
            ingredient: row.get(1)?,
            quantity: row.get(2)?,
            output_quantity: row.get(3)?,
            cycle_duration: row.get(4)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

pub fn count_recipe_rows(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipe_rows", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Distinct items that have a stored recipe
pub fn list_items(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT item FROM recipe_rows ORDER BY item")?;

    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
