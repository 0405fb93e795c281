use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Float64Builder, Int32Array, Int64Array,
    LargeListArray, ListArray, ListBuilder, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use ndarray::Array3;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use super::model::{Gender, Recording, StimulusDataset, SubjectId, SubjectMetadata};
use crate::config::WindowConfig;

// ---------------------------------------------------------------------------
// Row layout shared by every format
// ---------------------------------------------------------------------------

/// One `(subject, electrode, repetition)` trace plus the subject's metadata.
///
/// Every file format stores one of these per row. `time` and `voltage`
/// are list columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub subject_id: SubjectId,
    pub electrode: u32,
    pub repetition: usize,
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
    pub room_temperature: f64,
    pub room_humidity: f64,
    pub experimenter: String,
    pub gender: Gender,
}

impl TraceRow {
    fn metadata(&self) -> SubjectMetadata {
        SubjectMetadata {
            subject_id: self.subject_id,
            room_temperature: self.room_temperature,
            room_humidity: self.room_humidity,
            experimenter: self.experimenter.clone(),
            gender: self.gender,
        }
    }
}

const COLUMNS: [&str; 9] = [
    "subject_id",
    "electrode",
    "repetition",
    "time",
    "voltage",
    "room_temperature",
    "room_humidity",
    "experimenter",
    "gender",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Parquet,
    Json,
    Csv,
}

fn format_of(path: &Path) -> Result<Format> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => Ok(Format::Parquet),
        "json" => Ok(Format::Json),
        "csv" => Ok(Format::Csv),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a trace table.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `time` / `voltage` as List<Float64> columns (recommended)
/// * `.json`    – `[{ "subject_id": 0, "electrode": 0, "time": [...], ... }, ...]`
/// * `.csv`     – `time` / `voltage` columns hold semicolon-separated floats
pub fn load_file(path: &Path, windows: WindowConfig) -> Result<StimulusDataset> {
    let rows = match format_of(path)? {
        Format::Parquet => read_parquet(path)?,
        Format::Json => read_json(path)?,
        Format::Csv => read_csv(path)?,
    };
    info!("read {} trace rows from {}", rows.len(), path.display());
    from_rows(rows, windows)
}

/// Write a dataset as a trace table.  Dispatch by extension.
pub fn save_file(dataset: &StimulusDataset, path: &Path) -> Result<()> {
    let rows = to_rows(dataset);
    match format_of(path)? {
        Format::Parquet => write_parquet(&rows, path)?,
        Format::Json => write_json(&rows, path)?,
        Format::Csv => write_csv(&rows, path)?,
    }
    info!("wrote {} trace rows to {}", rows.len(), path.display());
    Ok(())
}

/// Flatten a dataset into rows, subject-major then electrode then repetition.
pub fn to_rows(dataset: &StimulusDataset) -> Vec<TraceRow> {
    let mut rows = Vec::new();
    for rec in dataset.iter() {
        let meta = rec.metadata();
        for (idx, &electrode) in rec.electrodes().iter().enumerate() {
            for repetition in 0..rec.num_repetitions() {
                rows.push(TraceRow {
                    subject_id: meta.subject_id,
                    electrode,
                    repetition,
                    time: rec.time().to_vec(),
                    voltage: rec.trace(idx, repetition).to_vec(),
                    room_temperature: meta.room_temperature,
                    room_humidity: meta.room_humidity,
                    experimenter: meta.experimenter.clone(),
                    gender: meta.gender,
                });
            }
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Row → Recording assembly
// ---------------------------------------------------------------------------

/// Traces of one subject collected while scanning the rows.
struct SubjectRows {
    metadata: SubjectMetadata,
    time: Vec<f64>,
    traces: BTreeMap<(u32, usize), Vec<f64>>,
}

impl SubjectRows {
    fn into_recording(self) -> Result<Recording> {
        let subject = self.metadata.subject_id;
        let mut electrodes: Vec<u32> = self.traces.keys().map(|&(e, _)| e).collect();
        electrodes.dedup();
        let num_repetitions = self.traces.keys().map(|&(_, r)| r + 1).max().unwrap_or(0);

        let expected = electrodes.len() * num_repetitions;
        if self.traces.len() != expected {
            bail!(
                "subject {subject}: incomplete trace grid, {} of {} (electrode, repetition) rows",
                self.traces.len(),
                expected
            );
        }

        let n_time = self.time.len();
        let mut voltages = Array3::zeros((electrodes.len(), n_time, num_repetitions));
        for (e_idx, &electrode) in electrodes.iter().enumerate() {
            for rep in 0..num_repetitions {
                let trace = self.traces.get(&(electrode, rep)).ok_or_else(|| {
                    anyhow!("subject {subject}: missing electrode {electrode}, repetition {rep}")
                })?;
                for (t, &v) in trace.iter().enumerate() {
                    voltages[[e_idx, t, rep]] = v;
                }
            }
        }

        Ok(Recording::new(electrodes, self.time, voltages, self.metadata)?)
    }
}

/// Group rows by subject and build a validated dataset.
pub fn from_rows(rows: Vec<TraceRow>, windows: WindowConfig) -> Result<StimulusDataset> {
    let mut subjects: BTreeMap<SubjectId, SubjectRows> = BTreeMap::new();

    for (i, row) in rows.into_iter().enumerate() {
        if row.time.len() != row.voltage.len() {
            bail!(
                "Row {i}: time has {} values but voltage has {}",
                row.time.len(),
                row.voltage.len()
            );
        }
        let metadata = row.metadata();
        let entry = subjects
            .entry(row.subject_id)
            .or_insert_with(|| SubjectRows {
                metadata: metadata.clone(),
                time: row.time.clone(),
                traces: BTreeMap::new(),
            });

        if entry.metadata != metadata {
            bail!("Row {i}: metadata differs from earlier rows of subject {}", row.subject_id);
        }
        if entry.time != row.time {
            bail!("Row {i}: time axis differs from earlier rows of subject {}", row.subject_id);
        }
        if entry
            .traces
            .insert((row.electrode, row.repetition), row.voltage)
            .is_some()
        {
            bail!(
                "Row {i}: duplicate trace for subject {}, electrode {}, repetition {}",
                row.subject_id,
                row.electrode,
                row.repetition
            );
        }
    }

    debug!("assembling {} subjects", subjects.len());
    let recordings = subjects
        .into_values()
        .map(SubjectRows::into_recording)
        .collect::<Result<Vec<_>>>()?;

    Ok(StimulusDataset::new(recordings, windows)?)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Vec<TraceRow>> {
    let file = File::open(path).context("opening JSON file")?;
    serde_json::from_reader(BufReader::new(file)).context("parsing JSON trace rows")
}

fn write_json(rows: &[TraceRow], path: &Path) -> Result<()> {
    let file = File::create(path).context("creating JSON file")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, rows).context("writing JSON trace rows")?;
    writer.flush().context("flushing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with the column names of [`TraceRow`].
/// `time` and `voltage` hold semicolon-separated floats:
///   `"0.0;0.0002;0.0004"`, `"0.12;0.14;0.11"`
fn read_csv(path: &Path) -> Result<Vec<TraceRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut idx = [0usize; COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))?;
    }
    let [subject, electrode, repetition, time, voltage, temp, humidity, experimenter, gender] = idx;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let parse_err = |col: &str| format!("CSV row {row_no}: invalid '{col}'");

        rows.push(TraceRow {
            subject_id: field(subject).parse::<u32>().with_context(|| parse_err("subject_id"))?,
            electrode: field(electrode).parse::<u32>().with_context(|| parse_err("electrode"))?,
            repetition: field(repetition).parse::<usize>().with_context(|| parse_err("repetition"))?,
            time: parse_semicolon_floats(field(time), row_no, "time")?,
            voltage: parse_semicolon_floats(field(voltage), row_no, "voltage")?,
            room_temperature: field(temp).parse::<f64>().with_context(|| parse_err("room_temperature"))?,
            room_humidity: field(humidity).parse::<f64>().with_context(|| parse_err("room_humidity"))?,
            experimenter: field(experimenter).to_string(),
            gender: field(gender).parse::<Gender>().map_err(|e| anyhow!("CSV row {row_no}: {e}"))?,
        });
    }
    Ok(rows)
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row}, {col}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

fn join_floats(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn write_csv(rows: &[TraceRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(COLUMNS).context("writing CSV header")?;
    for row in rows {
        writer
            .write_record([
                row.subject_id.to_string(),
                row.electrode.to_string(),
                row.repetition.to_string(),
                join_floats(&row.time),
                join_floats(&row.voltage),
                row.room_temperature.to_string(),
                row.room_humidity.to_string(),
                row.experimenter.clone(),
                row.gender.to_string(),
            ])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn list_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
        false,
    )
}

fn trace_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("subject_id", DataType::Int64, false),
        Field::new("electrode", DataType::Int64, false),
        Field::new("repetition", DataType::Int64, false),
        list_field("time"),
        list_field("voltage"),
        Field::new("room_temperature", DataType::Float64, false),
        Field::new("room_humidity", DataType::Float64, false),
        Field::new("experimenter", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
    ]))
}

fn build_list<'a>(lists: impl Iterator<Item = &'a [f64]>) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for values in lists {
        builder.values().append_slice(values);
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn write_parquet(rows: &[TraceRow], path: &Path) -> Result<()> {
    let schema = trace_schema();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.subject_id)))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.electrode)))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.repetition as i64))),
        build_list(rows.iter().map(|r| r.time.as_slice())),
        build_list(rows.iter().map(|r| r.voltage.as_slice())),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.room_temperature))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.room_humidity))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.experimenter.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.gender.to_string()))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Load trace rows from a Parquet file.
///
/// Integer columns may be Int32, Int64 or UInt32; float columns Float32,
/// Float64 or integers, so files written by Pandas or Polars load as-is.
fn read_parquet(path: &Path) -> Result<Vec<TraceRow>> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let col = |name: &str| {
            batch
                .column_by_name(name)
                .ok_or_else(|| anyhow!("Parquet file missing '{name}' column"))
        };
        let subject = col("subject_id")?;
        let electrode = col("electrode")?;
        let repetition = col("repetition")?;
        let time = col("time")?;
        let voltage = col("voltage")?;
        let temp = col("room_temperature")?;
        let humidity = col("room_humidity")?;
        let experimenter = col("experimenter")?;
        let gender = col("gender")?;

        for row in 0..batch.num_rows() {
            let ctx = |name: &str| format!("Row {row}: failed to read '{name}'");
            let gender_text = extract_string(gender, row).with_context(|| ctx("gender"))?;
            rows.push(TraceRow {
                subject_id: u32::try_from(extract_i64(subject, row)?)
                    .with_context(|| ctx("subject_id"))?,
                electrode: u32::try_from(extract_i64(electrode, row)?)
                    .with_context(|| ctx("electrode"))?,
                repetition: usize::try_from(extract_i64(repetition, row)?)
                    .with_context(|| ctx("repetition"))?,
                time: extract_f64_list(time, row).with_context(|| ctx("time"))?,
                voltage: extract_f64_list(voltage, row).with_context(|| ctx("voltage"))?,
                room_temperature: extract_f64(temp, row).with_context(|| ctx("room_temperature"))?,
                room_humidity: extract_f64(humidity, row).with_context(|| ctx("room_humidity"))?,
                experimenter: extract_string(experimenter, row)
                    .with_context(|| ctx("experimenter"))?,
                gender: gender_text.parse::<Gender>().map_err(|e| anyhow!("Row {row}: {e}"))?,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

fn extract_i64(col: &ArrayRef, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        Ok(i64::from(arr.value(row)))
    } else if let Some(arr) = col.as_any().downcast_ref::<UInt32Array>() {
        Ok(i64::from(arr.value(row)))
    } else {
        bail!("expected an integer column, got {:?}", col.data_type())
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(f64::from(arr.value(row)))
    } else {
        extract_i64(col, row).map(|v| v as f64)
    }
}

fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &ArrayRef, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // Null entries are rejected rather than read as NaN.
    if values_array.null_count() > 0 {
        bail!("list contains null values");
    }
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.values().to_vec())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.values().iter().map(|&v| f64::from(v)).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}
