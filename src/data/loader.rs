use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{Column, CustomerRecord, CustomerTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything that prevents the customer table from loading. Always fatal: no partial loads.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: invalid {column} value {value}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the customer table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names (the usual export)
/// * `.json`    – `[{ "customer_status": "...", "age": 45, ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<CustomerTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::info!("Loading customer table from {}", path.display());
    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;
    log::info!(
        "Loaded {} customers ({} attrited)",
        table.len(),
        table.churned_count()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fail with every required column that `headers` lacks.
fn check_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: BTreeSet<&str> = headers.into_iter().collect();
    let missing: Vec<String> = Column::REQUIRED
        .iter()
        .map(|c| c.name())
        .filter(|name| !present.contains(name))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

fn validate(row: usize, record: &CustomerRecord) -> Result<(), LoadError> {
    let ratio = record.avg_utilization_ratio;
    if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
        return Err(LoadError::InvalidValue {
            row,
            column: Column::AvgUtilizationRatio.name(),
            value: ratio.to_string(),
        });
    }
    for column in [Column::CreditLimit, Column::TotalTransAmt] {
        if let Some(v) = record.value(column).as_f64() {
            if !v.is_finite() {
                return Err(LoadError::InvalidValue {
                    row,
                    column: column.name(),
                    value: v.to_string(),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Unknown columns (ids, naive-bayes scores, ...) are ignored.
fn load_csv(path: &Path) -> Result<CustomerTable, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers = reader.headers()?.clone();
    check_columns(headers.iter())?;

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<CustomerRecord>().enumerate() {
        let record = result?;
        validate(row, &record)?;
        records.push(record);
    }

    Ok(CustomerTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<CustomerTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| LoadError::Malformed {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| LoadError::Malformed {
            row,
            reason: "not a JSON object".to_string(),
        })?;
        check_columns(obj.keys().map(String::as_str))?;

        let record = CustomerRecord::deserialize(value)?;
        validate(row, &record)?;
        records.push(record);
    }

    Ok(CustomerTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars.
/// Each row is lifted into a JSON object so the serde field mapping is shared
/// with the other formats.
fn load_parquet(path: &Path) -> Result<CustomerTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    check_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let known: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| Column::from_name(f.name()).is_some())
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for local_row in 0..batch.num_rows() {
            let row = records.len();
            let mut obj = Map::new();
            for (col_idx, name) in &known {
                let value = extract_json_value(batch.column(*col_idx), local_row, row)?;
                obj.insert(name.clone(), value);
            }

            let record = CustomerRecord::deserialize(&JsonValue::Object(obj))?;
            validate(row, &record)?;
            records.push(record);
        }
    }

    Ok(CustomerTable::from_records(records))
}

/// Extract a single value from an Arrow column at a given row.
fn extract_json_value(col: &ArrayRef, local_row: usize, row: usize) -> Result<JsonValue, LoadError> {
    if col.is_null(local_row) {
        return Ok(JsonValue::Null);
    }
    let layout = || LoadError::Malformed {
        row,
        reason: format!("unexpected array layout for {:?}", col.data_type()),
    };
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = any.downcast_ref::<StringArray>().ok_or_else(layout)?;
            JsonValue::from(arr.value(local_row))
        }
        DataType::LargeUtf8 => {
            let arr = any.downcast_ref::<LargeStringArray>().ok_or_else(layout)?;
            JsonValue::from(arr.value(local_row))
        }
        DataType::Int32 => {
            let arr = any.downcast_ref::<Int32Array>().ok_or_else(layout)?;
            JsonValue::from(arr.value(local_row))
        }
        DataType::Int64 => {
            let arr = any.downcast_ref::<Int64Array>().ok_or_else(layout)?;
            JsonValue::from(arr.value(local_row))
        }
        DataType::Float32 => {
            let arr = any.downcast_ref::<Float32Array>().ok_or_else(layout)?;
            float_json(arr.value(local_row) as f64)
        }
        DataType::Float64 => {
            let arr = any.downcast_ref::<Float64Array>().ok_or_else(layout)?;
            float_json(arr.value(local_row))
        }
        DataType::Boolean => {
            let arr = any.downcast_ref::<BooleanArray>().ok_or_else(layout)?;
            JsonValue::from(arr.value(local_row))
        }
        other => {
            return Err(LoadError::Malformed {
                row,
                reason: format!("unsupported column type {other:?}"),
            })
        }
    };
    Ok(value)
}

/// Whole-valued floats become JSON integers. Pandas stores integer columns as
/// float64 once they have held a NaN, and those must still fill `i64` fields.
fn float_json(v: f64) -> JsonValue {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        JsonValue::from(v as i64)
    } else {
        JsonValue::from(v)
    }
}
