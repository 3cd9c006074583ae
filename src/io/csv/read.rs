//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReader, DataType}};

use crate::region::{BlockRecord, WatershedRecord};

/// Reads a CSV file from `path` into a Polars DataFrame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string.
#[cfg(test)]
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    use std::io::Cursor;

    CsvReader::new(Cursor::new(csv.as_bytes()))
        .finish()
        .with_context(|| "[io::csv::read] Failed to read CSV from string")
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name)
        .with_context(|| format!("[io::csv::read] Missing column '{name}'"))?
        .cast(&DataType::Int64)
        .with_context(|| format!("[io::csv::read] Column '{name}' is not integral"))?;
    Ok(column.i64()?.into_iter().collect())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)
        .with_context(|| format!("[io::csv::read] Missing column '{name}'"))?
        .cast(&DataType::Float64)
        .with_context(|| format!("[io::csv::read] Column '{name}' is not numeric"))?;
    Ok(column.f64()?.into_iter().collect())
}

fn bool_column(df: &DataFrame, name: &str) -> Result<Vec<Option<bool>>> {
    let column = df.column(name)
        .with_context(|| format!("[io::csv::read] Missing column '{name}'"))?
        .cast(&DataType::Boolean)
        .with_context(|| format!("[io::csv::read] Column '{name}' is not boolean"))?;
    Ok(column.bool()?.into_iter().collect())
}

/// Unwrap a cell that must be present.
fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.with_context(|| format!("[io::csv::read] Missing value in column '{column}' at row {row}"))
}

/// Parse `id,parent,boundary,x,y` rows; an empty parent marks the root.
pub(crate) fn read_watersheds(df: &DataFrame) -> Result<Vec<WatershedRecord>> {
    let ids = int_column(df, "id")?;
    let parents = int_column(df, "parent")?;
    let boundary = bool_column(df, "boundary")?;
    let xs = float_column(df, "x")?;
    let ys = float_column(df, "y")?;

    (0..df.height())
        .map(|row| Ok(WatershedRecord {
            id: required(ids[row], "id", row)?,
            parent: parents[row],
            boundary: required(boundary[row], "boundary", row)?,
            x: required(xs[row], "x", row)?,
            y: required(ys[row], "y", row)?,
        }))
        .collect()
}

/// Parse `id,watershed,population,boundary,x,y,area` rows.
pub(crate) fn read_blocks(df: &DataFrame) -> Result<Vec<BlockRecord>> {
    let ids = int_column(df, "id")?;
    let watersheds = int_column(df, "watershed")?;
    let populations = int_column(df, "population")?;
    let boundary = bool_column(df, "boundary")?;
    let xs = float_column(df, "x")?;
    let ys = float_column(df, "y")?;
    let areas = float_column(df, "area")?;

    (0..df.height())
        .map(|row| Ok(BlockRecord {
            id: required(ids[row], "id", row)?,
            watershed: required(watersheds[row], "watershed", row)?,
            population: required(populations[row], "population", row)?,
            boundary: required(boundary[row], "boundary", row)?,
            x: required(xs[row], "x", row)?,
            y: required(ys[row], "y", row)?,
            area: required(areas[row], "area", row)?,
        }))
        .collect()
}

/// Parse `a,b` block adjacency pairs.
pub(crate) fn read_adjacency(df: &DataFrame) -> Result<Vec<(i64, i64)>> {
    let a = int_column(df, "a")?;
    let b = int_column(df, "b")?;

    (0..df.height())
        .map(|row| Ok((required(a[row], "a", row)?, required(b[row], "b", row)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watershed_rows_allow_empty_parent() {
        let df = read_csv_string("id,parent,boundary,x,y\n1,,true,0.0,0.0\n2,1,false,1.5,-2\n").unwrap();
        let rows = read_watersheds(&df).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parent, None);
        assert!(rows[0].boundary);
        assert_eq!(rows[1].parent, Some(1));
        assert_eq!((rows[1].x, rows[1].y), (1.5, -2.0));
    }

    #[test]
    fn block_rows_require_every_column() {
        let df = read_csv_string("id,watershed,population,boundary,x,y,area\n5,1,12,false,0,0,2.5\n").unwrap();
        let rows = read_blocks(&df).unwrap();
        assert_eq!(rows[0].population, 12);
        assert_eq!(rows[0].area, 2.5);

        let missing = read_csv_string("id,watershed,population,boundary,x,y\n5,1,12,false,0,0\n").unwrap();
        assert!(read_blocks(&missing).is_err());
    }

    #[test]
    fn adjacency_rejects_blank_endpoints() {
        let df = read_csv_string("a,b\n1,2\n3,\n").unwrap();
        assert!(read_adjacency(&df).is_err());
    }
}
