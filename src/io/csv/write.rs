//! CSV writing operations.

use std::{collections::BTreeMap, io::Write};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

/// Write a DataFrame as CSV into any sink.
pub(crate) fn write_csv<W: Write>(df: &mut DataFrame, sink: W) -> Result<()> {
    CsvWriter::new(sink)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV")
}

/// Frame of `block,district` rows in ascending block id order.
pub(crate) fn assignments_frame(assignments: &BTreeMap<i64, u32>) -> Result<DataFrame> {
    let (blocks, districts) = assignments.iter()
        .map(|(&block, &district)| (block, district))
        .unzip::<_, _, Vec<_>, Vec<_>>();

    Ok(DataFrame::new(vec![
        Series::new("block".into(), blocks).into(),
        Series::new("district".into(), districts).into(),
    ])?)
}
