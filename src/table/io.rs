//! Reading and writing tables as spreadsheet or CSV files
//!
//! Spreadsheets are read with `calamine` (first worksheet, first row as
//! header) and written with `rust_xlsxwriter`. CSV goes through the `csv`
//! crate. The format is chosen from the file extension.
//!
//! Sheet positions are kept: a sheet whose first used cell is not `A1` is
//! padded back to `A1`, so leading blank columns become `Unnamed: N` and a
//! leading blank row becomes the header. Date cells stay dates in xlsx
//! output and are rendered as text in CSV.

use super::{Cell, Dataset};
use crate::error::{common, ErrorCode, ErrorExt, Result, TaskShareError};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Worksheet limits of the xlsx format; the header counts as a row
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    /// Extension used when naming output files
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Csv => "csv",
        }
    }

    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(TableFormat::Xlsx)
        } else if ext == "csv" {
            Some(TableFormat::Csv)
        } else {
            None
        }
    }
}

/// Read a table from disk, picking the reader from the extension
pub fn read_table(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(common::input_not_found(path));
    }
    match TableFormat::from_path(path) {
        Some(TableFormat::Xlsx) => read_spreadsheet(path),
        Some(TableFormat::Csv) => read_csv(path),
        None => Err(common::unsupported_format(path)),
    }
}

/// Write a table to disk, picking the writer from the extension
pub fn write_table(path: &Path, table: &Dataset) -> Result<()> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => write_csv(path, table),
        Some(TableFormat::Xlsx) if has_extension(path, "xlsx") => write_xlsx(path, table),
        _ => Err(common::write_failed(
            Some(path.to_path_buf()),
            "tables can only be written as .xlsx or .csv",
        )),
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected))
}

fn read_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        TaskShareError::load_with_code(
            ErrorCode::LOAD_UNREADABLE,
            format!("cannot open workbook: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            TaskShareError::load_with_code(
                ErrorCode::LOAD_NO_WORKSHEET,
                "workbook has no worksheets",
                Some(path.to_path_buf()),
            )
        })?
        .map_err(|e| {
            TaskShareError::load_with_code(
                ErrorCode::LOAD_UNREADABLE,
                format!("cannot read first worksheet: {}", e),
                Some(path.to_path_buf()),
            )
        })?;

    let (start_row, start_col) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or_default();
    let mut rows = range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(cell_from_data));
        cells
    });

    let header: Vec<String> = if start_row > 0 {
        vec![String::new(); start_col + range.width()]
    } else {
        match rows.next() {
            Some(header) => header.iter().map(|c| c.to_string()).collect(),
            None => return Ok(Dataset::default()),
        }
    };

    let mut dataset = Dataset::new(header_names(header));
    for cells in rows {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        dataset.push_row(cells);
    }

    tracing::debug!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded spreadsheet"
    );
    Ok(dataset)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Cell::Number(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(value) => Cell::DateTime(value),
            None => Cell::from(s.as_str()),
        },
        other => Cell::from(other.to_string()),
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Give blank headers a placeholder name and suffix duplicates with `.N`
fn header_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .to_load_error(ErrorCode::LOAD_UNREADABLE, path)?;

    let header = reader
        .headers()
        .to_load_error(ErrorCode::LOAD_UNREADABLE, path)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut dataset = Dataset::new(header_names(header));
    for record in reader.records() {
        let record = record.to_load_error(ErrorCode::LOAD_UNREADABLE, path)?;
        let cells: Vec<Cell> = record.iter().map(Cell::from).collect();
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        dataset.push_row(cells);
    }

    tracing::debug!(path = %path.display(), rows = dataset.len(), "Loaded CSV table");
    Ok(dataset)
}

fn write_csv(path: &Path, table: &Dataset) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).to_storage_error(ErrorCode::STORAGE_WRITE_FAILED, path)?;
    writer
        .write_record(table.columns())
        .to_storage_error(ErrorCode::STORAGE_WRITE_FAILED, path)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|c| c.to_string()))
            .to_storage_error(ErrorCode::STORAGE_WRITE_FAILED, path)?;
    }
    writer
        .flush()
        .to_storage_error(ErrorCode::STORAGE_WRITE_FAILED, path)?;
    Ok(())
}

fn write_xlsx(path: &Path, table: &Dataset) -> Result<()> {
    let xlsx_error = |e: rust_xlsxwriter::XlsxError| {
        common::write_failed(Some(path.to_path_buf()), e.to_string())
    };
    let too_large = || {
        TaskShareError::storage_with_code(
            ErrorCode::STORAGE_TOO_LARGE,
            format!(
                "{} rows x {} columns exceeds worksheet limits",
                table.len(),
                table.columns().len()
            ),
            Some(path.to_path_buf()),
        )
    };
    if table.len() + 1 > XLSX_MAX_ROWS || table.columns().len() > XLSX_MAX_COLUMNS {
        return Err(too_large());
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| too_large())?;
        worksheet.write_string(0, col, name).map_err(xlsx_error)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = u32::try_from(r + 1).map_err(|_| too_large())?;
        for (c, cell) in row.iter().enumerate() {
            let col = u16::try_from(c).map_err(|_| too_large())?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet
                        .write_string(excel_row, col, s)
                        .map_err(xlsx_error)?;
                }
                Cell::Number(n) => {
                    worksheet
                        .write_number(excel_row, col, *n)
                        .map_err(xlsx_error)?;
                }
                Cell::Bool(b) => {
                    worksheet
                        .write_boolean(excel_row, col, *b)
                        .map_err(xlsx_error)?;
                }
                Cell::DateTime(dt) => {
                    let format = if cell.is_date_only() {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet
                        .write_datetime_with_format(excel_row, col, dt, format)
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_error)?;
    Ok(())
}
