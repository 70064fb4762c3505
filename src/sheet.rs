//! Spreadsheet reading.
//!
//! A book list is a worksheet whose first row is a header and whose data
//! rows carry book metadata in fixed columns:
//!
//! | Column | Field  |
//! |--------|--------|
//! | A      | title  |
//! | B      | author |
//! | G      | ISBN   |
//! | L      | topic  |
//! | S      | URL    |
//!
//! Columns are bound by absolute position, never by header text. Excel and
//! OpenDocument workbooks are read with `calamine`; `.csv` exports with `csv`.

use crate::error::{Result, SpringerError};
use crate::filter::FilterCriteria;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Zero-based column indices of the bound fields
pub const TITLE_COLUMN: usize = 0; // A
pub const AUTHOR_COLUMN: usize = 1; // B
pub const ISBN_COLUMN: usize = 6; // G
pub const TOPIC_COLUMN: usize = 11; // L
pub const URL_COLUMN: usize = 18; // S

/// Minimum width of a data row
const REQUIRED_COLUMNS: usize = URL_COLUMN + 1;

/// One book from the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub topic: String,
    /// Listing page the PDF link is scraped from
    pub url: String,
}

impl BookRecord {
    /// Decode a validated row.
    fn from_row(row: &[String]) -> Self {
        Self {
            title: row[TITLE_COLUMN].clone(),
            author: row[AUTHOR_COLUMN].clone(),
            isbn: row[ISBN_COLUMN].clone(),
            topic: row[TOPIC_COLUMN].clone(),
            url: row[URL_COLUMN].clone(),
        }
    }

    /// Fields in display order.
    pub fn fields(&self) -> [&str; 5] {
        [&self.title, &self.author, &self.isbn, &self.topic, &self.url]
    }
}

/// A worksheet as rows of cell text
#[derive(Debug, Clone)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Open a workbook and read one worksheet.
    ///
    /// # Arguments
    ///
    /// * `path` - Workbook file (`.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods` or `.csv`)
    /// * `sheet_name` - Worksheet to read; the first one when `None`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the worksheet does not
    /// exist, or a data row is too short to hold every bound column.
    pub fn open(path: &Path, sheet_name: Option<&str>) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let rows = if is_csv {
            read_csv_rows(path)?
        } else {
            read_workbook_rows(path, sheet_name)?
        };

        let sheet = Self::from_rows(rows)?;
        info!(path = ?path, books = sheet.data_rows(), "Loaded workbook");
        Ok(sheet)
    }

    /// Build a sheet from raw rows, the first of which is the header.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate().skip(1) {
            if row.len() < REQUIRED_COLUMNS {
                return Err(SpringerError::ShortRow {
                    row: idx + 1,
                    len: row.len(),
                    expected: REQUIRED_COLUMNS,
                });
            }
        }
        Ok(Self { rows })
    }

    /// Number of rows after the header.
    pub fn data_rows(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Every data row as a book, in sheet order.
    pub fn books(&self) -> impl Iterator<Item = BookRecord> + '_ {
        self.rows.iter().skip(1).map(|row| BookRecord::from_row(row))
    }
}

/// Books matching the criteria, in sheet order.
pub fn list_books(sheet: &Sheet, criteria: &FilterCriteria) -> Vec<BookRecord> {
    let books: Vec<BookRecord> = sheet.books().filter(|b| criteria.matches_record(b)).collect();
    debug!(matched = books.len(), total = sheet.data_rows(), "Filtered books");
    books
}

/// Distinct topics of the books matching the criteria.
pub fn list_topics(sheet: &Sheet, criteria: &FilterCriteria) -> BTreeSet<String> {
    sheet
        .books()
        .filter(|b| criteria.matches_record(b))
        .map(|b| b.topic)
        .collect()
}

/// Write books one field per line, with a blank line after each book.
pub fn write_books<W: Write>(books: &[BookRecord], out: &mut W) -> io::Result<()> {
    for book in books {
        writeln!(out, "{}", book.fields().join("\n"))?;
        writeln!(out)?;
    }
    Ok(())
}

/// Write one topic per line.
pub fn write_topics<W: Write>(topics: &BTreeSet<String>, out: &mut W) -> io::Result<()> {
    for topic in topics {
        writeln!(out, "{}", topic)?;
    }
    Ok(())
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path, sheet_name: Option<&str>) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet_name {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|n| n == name) {
                return Err(SpringerError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SpringerError::SheetNotFound("workbook has no worksheets".to_string()))??,
    };

    Ok(range_to_rows(&range))
}

/// Flatten a range into rows anchored at cell A1.
///
/// `calamine` trims leading empty rows and columns from a range, so cells
/// are looked up by absolute position to keep column letters stable.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };

    (0..=last_row)
        .map(|r| {
            (0..=last_col)
                .map(|c| range.get_value((r, c)).map(cell_to_string).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Convert a cell value to a string.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // ISBNs are often stored as numbers
            if f.fract() == 0.0 && f.abs() < 1e17 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}
