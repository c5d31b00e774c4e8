use crate::pipeline::extract::ExtractedTable;
use crate::pipeline::extract::Row;
use crate::pipeline::extract::Schema;
use crate::pipeline::PipelineError;

/// Rows of every contributing workbook, in enumeration order.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedTable {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl MergedTable {
    pub fn labels(&self) -> Vec<String> {
        self.schema.labels()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Concatenates tables in order; no sorting, no deduplication.
pub fn merge(tables: Vec<ExtractedTable>) -> Result<MergedTable, PipelineError> {
    let mut tables = tables.into_iter();
    let first = tables.next().ok_or(PipelineError::NoMergeableData)?;
    let mut merged = MergedTable {
        schema: first.schema,
        rows: first.rows,
    };
    for table in tables {
        if table.schema != merged.schema {
            return Err(PipelineError::SchemaMismatch {
                source_name: table.source_name,
                expected: merged.schema.labels(),
                found: table.schema.labels(),
            });
        }
        merged.rows.extend(table.rows);
    }
    Ok(merged)
}
