//! CSV export of windowed entries

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use super::Window;
use crate::models::TimeEntry;
use crate::{Error, Result};

pub const CSV_HEADER: &str = "userName,projectName,task,hours,date";
pub const CSV_MIME_TYPE: &str = "text/csv";

/// A named CSV document ready to be saved or handed to a download.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl CsvExport {
    pub fn filename_for(window: Window) -> String {
        format!("timesheet_export_{}d.csv", window.days())
    }

    /// Write the export into `dir` under its own filename.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Double-quote a text field, doubling embedded quotes.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Serialize entries as CSV text, one `\n`-terminated line per record.
///
/// Text columns are always quoted, `hours` is written as the raw number and
/// `date` as the UTC calendar date.
pub fn to_csv<'a, I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    // Quoting is done per column by `quote_field`, the writer must not add any.
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER.split(','))?;

    for entry in entries {
        writer.write_record([
            quote_field(&entry.user_name),
            quote_field(entry.project_name.as_deref().unwrap_or_default()),
            quote_field(&entry.task),
            entry.hours.to_string(),
            entry.date.format("%Y-%m-%d").to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("Failed to finish CSV export: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidData(format!("CSV export is not valid UTF-8: {}", e)))
}

/// Export the entries inside `window`, named after the window length.
pub fn export_window<Tz: TimeZone>(
    entries: &[TimeEntry],
    window: Window,
    now: &DateTime<Tz>,
) -> Result<CsvExport> {
    let content = to_csv(window.filter(entries, now))?;
    Ok(CsvExport {
        filename: CsvExport::filename_for(window),
        mime_type: CSV_MIME_TYPE,
        content,
    })
}
