use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array, Int64Array,
    LargeListArray, ListArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{FrequencyAxis, Level, SweepBatch, SweepReading, SENTINEL};

/// Parquet key/value metadata entry holding the JSON-encoded [`FrequencyAxis`].
pub const AXIS_METADATA_KEY: &str = "frequency_axis";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sweep batch from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `sweep_index`, `timestamp`, `total_time_ms` scalar columns
///   and a `levels` list column (recommended)
/// * `.json`    – `{ "series_id", "axis", "sweeps": [...] }` or a bare array of sweeps
/// * `.csv`     – `levels` column containing semicolon-separated integers
pub fn load_file(path: &Path) -> Result<SweepBatch> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let batch = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    info!(
        "loaded {} sweeps for series '{}' from {}",
        batch.len(),
        batch.series_id,
        path.display()
    );
    Ok(batch)
}

fn series_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBatch {
    Document(SweepBatch),
    Records(Vec<SweepReading>),
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "series_id": "fm-band",
///   "axis": { "start": 88.0, "stop": 108.0, "step": 0.1, "exp": 6 },
///   "sweeps": [
///     { "sweep_index": 0, "timestamp": 1466000000000, "total_time_ms": 5230,
///       "levels": [-60, -128, -42, ...] },
///     ...
///   ]
/// }
/// ```
///
/// A bare array of sweep objects is accepted too.
fn load_json(path: &Path) -> Result<SweepBatch> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: JsonBatch = serde_json::from_str(&text).context("parsing JSON sweep batch")?;

    let batch = match parsed {
        JsonBatch::Document(doc) => {
            let series_id = if doc.series_id.is_empty() {
                series_id_from_path(path)
            } else {
                doc.series_id
            };
            SweepBatch::new(series_id, doc.axis, doc.sweeps)
        }
        JsonBatch::Records(sweeps) => SweepBatch::new(series_id_from_path(path), None, sweeps),
    };
    Ok(batch)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names
/// `sweep_index,timestamp,total_time_ms,levels`.
/// The `levels` column contains semicolon-separated integers:
///   `"-60;-128;-42"`
fn load_csv(path: &Path) -> Result<SweepBatch> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let index_idx = column("sweep_index")?;
    let ts_idx = column("timestamp")?;
    let time_idx = column("total_time_ms")?;
    let levels_idx = column("levels")?;

    let mut sweeps = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let sweep_index = field(index_idx)
            .parse::<u64>()
            .with_context(|| format!("CSV row {row_no}: bad sweep_index"))?;
        let timestamp = field(ts_idx)
            .parse::<i64>()
            .with_context(|| format!("CSV row {row_no}: bad timestamp"))?;
        let total_time_ms = field(time_idx)
            .parse::<f64>()
            .with_context(|| format!("CSV row {row_no}: bad total_time_ms"))?;
        if !(total_time_ms.is_finite() && total_time_ms >= 0.0) {
            bail!("CSV row {row_no}: total_time_ms must be a non-negative number");
        }
        let levels = parse_semicolon_levels(field(levels_idx), row_no)?;

        sweeps.push(SweepReading::new(sweep_index, timestamp, total_time_ms, levels));
    }

    Ok(SweepBatch::new(series_id_from_path(path), None, sweeps))
}

fn parse_semicolon_levels(s: &str, row: usize) -> Result<Vec<Level>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<Level>()
                .with_context(|| format!("Row {row}, levels[{j}]: '{tok}' is not an integer"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing sweep data.
///
/// Expected schema:
/// - `sweep_index`: integer
/// - `timestamp`: Int64, milliseconds since the epoch
/// - `total_time_ms`: integer or float
/// - `levels`: List<Int*> or LargeList<Int*>; null elements read as failed readings
///
/// The frequency axis, if present, is read from the `frequency_axis`
/// key/value metadata entry.
fn load_parquet(path: &Path) -> Result<SweepBatch> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let axis = match builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kvs| kvs.iter().find(|kv| kv.key == AXIS_METADATA_KEY))
        .and_then(|kv| kv.value.as_deref())
    {
        Some(json) => Some(
            serde_json::from_str::<FrequencyAxis>(json).context("parsing frequency_axis metadata")?,
        ),
        None => None,
    };

    let reader = builder.build().context("building parquet reader")?;

    let mut sweeps = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let n_rows = batch.num_rows();

        let column = |name: &str| {
            schema
                .index_of(name)
                .map(|idx| batch.column(idx))
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let index_col = column("sweep_index")?;
        let ts_col = column("timestamp")?;
        let time_col = column("total_time_ms")?;
        let levels_col = column("levels")?;

        for row in 0..n_rows {
            let sweep_index = extract_i64(index_col, row)
                .with_context(|| format!("Row {row}: failed to read 'sweep_index'"))?;
            let timestamp = extract_i64(ts_col, row)
                .with_context(|| format!("Row {row}: failed to read 'timestamp'"))?;
            let total_time_ms = extract_f64(time_col, row)
                .with_context(|| format!("Row {row}: failed to read 'total_time_ms'"))?;
            let levels = extract_level_list(levels_col, row)
                .with_context(|| format!("Row {row}: failed to read 'levels'"))?;

            if sweep_index < 0 || !(total_time_ms.is_finite() && total_time_ms >= 0.0) {
                bail!("Row {row}: negative sweep_index or total_time_ms");
            }

            sweeps.push(SweepReading::new(
                sweep_index as u64,
                timestamp,
                total_time_ms,
                levels,
            ));
        }
    }

    Ok(SweepBatch::new(series_id_from_path(path), axis, sweeps))
}

// -- Parquet / Arrow helpers --

/// Read an integer-valued scalar cell, accepting the common integer and float encodings.
fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in scalar column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as i64)
    } else if let Some(arr) = any.downcast_ref::<UInt64Array>() {
        i64::try_from(arr.value(row)).context("value out of range")
    } else if let Some(arr) = any.downcast_ref::<UInt32Array>() {
        Ok(arr.value(row) as i64)
    } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row).round() as i64)
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(row).round() as i64)
    } else {
        bail!("Expected integer column, got {:?}", col.data_type())
    }
}

/// Read a duration cell without rounding; integer columns widen to `f64`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in scalar column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(f64::from(arr.value(row)))
    } else {
        extract_i64(col, row).map(|v| v as f64)
    }
}

/// Extract the level list at the given row from a List or LargeList column.
fn extract_level_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<Level>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    let any = values_array.as_any();
    if let Some(arr) = any.downcast_ref::<Int8Array>() {
        Ok(arr.iter().map(|v| v.map_or(SENTINEL, Level::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int16Array>() {
        Ok(arr.iter().map(|v| v.map_or(SENTINEL, Level::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(SENTINEL)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        arr.iter()
            .map(|v| match v {
                Some(level) => Level::try_from(level).context("level out of range"),
                None => Ok(SENTINEL),
            })
            .collect()
    } else {
        bail!(
            "List inner type is {:?}, expected an integer type",
            values_array.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Int32Builder, ListBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use parquet::file::properties::WriterProperties;
    use parquet::format::KeyValue;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_json_document() {
        let file = write_temp(
            ".json",
            r#"{
                "series_id": "fm",
                "axis": { "start": 88.0, "stop": 88.2, "step": 0.1, "exp": 6 },
                "sweeps": [
                    { "sweep_index": 1, "timestamp": 2000, "total_time_ms": 400, "levels": [-40, -128, -30] },
                    { "sweep_index": 0, "timestamp": 1000, "total_time_ms": 500, "levels": [-50, -60, -70] }
                ]
            }"#,
        );
        let batch = load_file(file.path()).unwrap();
        assert_eq!(batch.series_id, "fm");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.sweeps[0].sweep_index, 0);
        assert_eq!(batch.sweeps[1].levels, vec![-40, SENTINEL, -30]);
        assert_eq!(batch.axis.map(|a| a.bin_count()), Some(3));
    }

    #[test]
    fn loads_json_record_array() {
        let file = write_temp(
            ".json",
            r#"[{ "sweep_index": 0, "timestamp": 5, "levels": [-1, -2] }]"#,
        );
        let batch = load_file(file.path()).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.sweeps[0].total_time_ms, 0.0);
        assert!(batch.axis.is_none());
        assert!(!batch.series_id.is_empty());
    }

    #[test]
    fn loads_csv() {
        let file = write_temp(
            ".csv",
            "sweep_index,timestamp,total_time_ms,levels\n\
             0,1000,250,-50;-128;-40\n\
             1,2000,260,-51;-61;-41\n",
        );
        let batch = load_file(file.path()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.sweeps[0].levels, vec![-50, -128, -40]);
        assert_eq!(batch.sweeps[1].total_time_ms, 260.0);
    }

    #[test]
    fn csv_keeps_fractional_sweep_times() {
        let file = write_temp(
            ".csv",
            "sweep_index,timestamp,total_time_ms,levels\n\
             0,1000,250.5,-50\n\
             1,2000,249.25,-51\n",
        );
        let batch = load_file(file.path()).unwrap();
        assert_eq!(batch.sweeps[0].total_time_ms, 250.5);
        assert_eq!(batch.sweeps[1].total_time_ms, 249.25);

        let bad = write_temp(
            ".csv",
            "sweep_index,timestamp,total_time_ms,levels\n0,1000,-1.5,-50\n",
        );
        assert!(load_file(bad.path()).is_err());
    }

    #[test]
    fn csv_with_bad_level_is_rejected() {
        let file = write_temp(
            ".csv",
            "sweep_index,timestamp,total_time_ms,levels\n0,1000,250,-50;loud\n",
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("not an integer"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".txt", "");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn loads_parquet_with_axis_metadata() {
        let mut levels = ListBuilder::new(Int32Builder::new());
        levels.values().append_value(-50);
        levels.values().append_null();
        levels.append(true);
        levels.values().append_value(-45);
        levels.values().append_value(-55);
        levels.append(true);

        let schema = Arc::new(Schema::new(vec![
            Field::new("sweep_index", DataType::Int64, false),
            Field::new("timestamp", DataType::Int64, false),
            Field::new("total_time_ms", DataType::Float64, false),
            Field::new(
                "levels",
                DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
                false,
            ),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![0, 1])),
                Arc::new(Int64Array::from(vec![1000, 2000])),
                Arc::new(Float64Array::from(vec![300.25, 310.5])),
                Arc::new(levels.finish()),
            ],
        )
        .unwrap();

        let axis = FrequencyAxis {
            start: 100.0,
            stop: 101.0,
            step: 1.0,
            exp: 3,
        };
        let props = WriterProperties::builder()
            .set_key_value_metadata(Some(vec![KeyValue::new(
                AXIS_METADATA_KEY.to_string(),
                serde_json::to_string(&axis).unwrap(),
            )]))
            .build();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, Some(props)).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let loaded = load_file(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.sweeps[0].levels, vec![-50, SENTINEL]);
        assert_eq!(loaded.sweeps[1].total_time_ms, 310.5);
        assert_eq!(loaded.axis, Some(axis));
    }
}
