//! Table builder for parsed reference lists
//!
//! Turns a finalised [`RecordSet`] into a row-major table keyed by primary
//! identifier, with the format's column order and `NA` for every cell the
//! parse left empty. Tables convert to and from polars DataFrames for cache
//! storage and TSV output.

use crate::constants::{LIST_SEPARATOR, MISSING_VALUE};
use crate::error::{Result, UniprotError};
use crate::models::{Record, RecordSet};
use crate::parser::{FormatSpec, RowOrder};
use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use std::cmp::Ordering;
use std::io::Write;
use tracing::debug;

/// Rectangular view of one reference list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    key_column: String,
    columns: Vec<String>,
    ids: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build the table for a record set using the format's column layout
    pub fn build(spec: &FormatSpec, records: &RecordSet) -> Self {
        let mut ordered: Vec<&Record> = records.iter().collect();
        match spec.row_order {
            RowOrder::Insertion => {}
            RowOrder::Numeric => ordered.sort_by(|a, b| numeric_order(&a.id, &b.id)),
            RowOrder::Lexical => ordered.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        let columns: Vec<String> = spec.columns.iter().map(|c| c.to_string()).collect();
        let mut ids = Vec::with_capacity(ordered.len());
        let mut rows = Vec::with_capacity(ordered.len());

        for record in ordered {
            let row = spec.columns.iter().map(|column| cell(record, column)).collect();
            ids.push(record.id.clone());
            rows.push(row);
        }

        debug!(
            "Built {} table: {} rows x {} columns",
            spec.kind,
            rows.len(),
            columns.len()
        );

        Self {
            key_column: spec.open_tag.to_string(),
            columns,
            ids,
            rows,
        }
    }

    /// Column holding the primary identifier
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Rows paired with their primary identifier, in table order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.ids
            .iter()
            .zip(&self.rows)
            .map(|(id, row)| (id.as_str(), row.as_slice()))
    }

    pub fn row(&self, id: &str) -> Option<&[String]> {
        let position = self.ids.iter().position(|candidate| candidate == id)?;
        Some(&self.rows[position])
    }

    pub fn cell(&self, id: &str, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.row(id).map(|row| row[index].as_str())
    }

    /// Copy of the table restricted to its first `n` rows
    pub fn head(&self, n: usize) -> Self {
        Self {
            key_column: self.key_column.clone(),
            columns: self.columns.clone(),
            ids: self.ids.iter().take(n).cloned().collect(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// All-string DataFrame with one column per table column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let values: Vec<String> = self.rows.iter().map(|row| row[index].clone()).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Rebuild a table from a DataFrame written by [`Table::to_dataframe`]
    pub fn from_dataframe(df: &DataFrame, key_column: &str) -> Result<Self> {
        let columns: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let key_index = columns
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| UniprotError::InvalidFormat {
                source_name: "cached table".to_string(),
                reason: format!("missing key column '{}'", key_column),
            })?;

        let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
        for name in &columns {
            let values = df.column(name)?.as_materialized_series().str()?;
            for (row, value) in rows.iter_mut().zip(values.into_iter()) {
                row.push(value.unwrap_or(MISSING_VALUE).to_string());
            }
        }
        let ids = rows.iter().map(|row| row[key_index].clone()).collect();

        Ok(Self {
            key_column: key_column.to_string(),
            columns,
            ids,
            rows,
        })
    }

    /// Write the table as tab-separated text with a header line
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<()> {
        let mut df = self.to_dataframe()?;
        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(b'\t')
            .finish(&mut df)?;
        Ok(())
    }
}

fn cell(record: &Record, column: &str) -> String {
    record
        .get(column)
        .filter(|value| !value.is_empty())
        .map(|value| value.join(LIST_SEPARATOR))
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// Integer comparison, with non-numeric identifiers after numeric ones
fn numeric_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn tissues() -> RecordSet {
        let mut adipocyte = Record::new("TS-0002");
        adipocyte.set("ID", "Adipocyte");
        adipocyte.set("AC", "TS-0002");
        let mut acinus = Record::new("TS-0001");
        acinus.set("AC", "TS-0001");
        [adipocyte, acinus].into_iter().collect()
    }

    #[test]
    fn test_missing_cells_become_placeholder() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let table = Table::build(&spec, &tissues());

        assert_eq!(table.cell("TS-0001", "ID"), Some(MISSING_VALUE));
        assert_eq!(table.cell("TS-0002", "ID"), Some("Adipocyte"));
    }

    #[test]
    fn test_lexical_row_order() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let table = Table::build(&spec, &tissues());

        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["TS-0001", "TS-0002"]);
        assert_eq!(table.key_column(), "AC");
    }

    #[test]
    fn test_numeric_row_order() {
        let spec = FormatSpec::for_kind(SourceKind::Species);
        let records: RecordSet = ["9606", "10090", "648330", "11676"]
            .into_iter()
            .map(Record::new)
            .collect();
        let table = Table::build(&spec, &records);

        assert_eq!(
            table.ids().collect::<Vec<_>>(),
            vec!["9606", "10090", "11676", "648330"]
        );
    }

    #[test]
    fn test_numeric_order_puts_text_last() {
        assert_eq!(numeric_order("10", "9"), Ordering::Greater);
        assert_eq!(numeric_order("abc", "9"), Ordering::Greater);
        assert_eq!(numeric_order("9", "abc"), Ordering::Less);
    }

    #[test]
    fn test_list_cells_join_with_separator() {
        let spec = FormatSpec::for_kind(SourceKind::Families);
        let mut family = Record::new("14-3-3 family");
        family.set("Family", "14-3-3 family");
        family.push("Entry names", "1433B_BOVIN");
        family.push("Entry names", "1433B_HUMAN");
        let records: RecordSet = std::iter::once(family).collect();

        let table = Table::build(&spec, &records);
        assert_eq!(
            table.cell("14-3-3 family", "Entry names"),
            Some("1433B_BOVIN; 1433B_HUMAN")
        );
        assert_eq!(table.cell("14-3-3 family", "Accessions"), Some(MISSING_VALUE));
    }

    #[test]
    fn test_dataframe_round_trip() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let table = Table::build(&spec, &tissues());

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 2));

        let restored = Table::from_dataframe(&df, "AC").unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_from_dataframe_requires_key_column() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let df = Table::build(&spec, &tissues()).to_dataframe().unwrap();

        let result = Table::from_dataframe(&df, "Taxon Node");
        assert!(matches!(result, Err(UniprotError::InvalidFormat { .. })));
    }

    #[test]
    fn test_write_tsv() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let table = Table::build(&spec, &tissues());

        let mut buffer = Vec::new();
        table.write_tsv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ID\tAC"));
        assert_eq!(lines.next(), Some("NA\tTS-0001"));
        assert_eq!(lines.next(), Some("Adipocyte\tTS-0002"));
    }

    #[test]
    fn test_head() {
        let spec = FormatSpec::for_kind(SourceKind::Tissues);
        let table = Table::build(&spec, &tissues()).head(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns().len(), 2);
    }
}
