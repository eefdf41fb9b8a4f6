//! Output file naming

use crate::error::{ErrorCode, Result, TaskShareError};
use crate::table::TableFormat;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date stamp embedded in output file names, formatted `YYYYMMDD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDate(String);

impl RunDate {
    /// Today's date in local time
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    /// Parse a `YYYYMMDD` stamp, rejecting impossible dates
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(TaskShareError::config_with_code(
                ErrorCode::CONFIG_INVALID_DATE,
                format!("'{}' is not in YYYYMMDD form", value),
            ));
        }
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|e| {
            TaskShareError::config_with_code(
                ErrorCode::CONFIG_INVALID_DATE,
                format!("'{}' is not a valid date", value),
            )
            .with_source(e)
        })?;
        Ok(Self::from_date(date))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{owner}_{date}{suffix}.{ext}`
pub fn output_file_name(owner: &str, date: &RunDate, suffix: &str, format: TableFormat) -> String {
    format!("{}_{}{}.{}", owner, date, suffix, format.extension())
}

/// `{owner}_{marker}_{date}.{ext}`
pub fn final_file_name(owner: &str, marker: &str, date: &RunDate, format: TableFormat) -> String {
    format!("{}_{}_{}.{}", owner, marker, date, format.extension())
}

/// Whether a file name is a final output of `owner`
pub fn is_final_file_of(file_name: &str, owner: &str, marker: &str) -> bool {
    file_name.starts_with(&format!("{}_{}_", owner, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_date() {
        assert_eq!(RunDate::parse("20250331").unwrap().as_str(), "20250331");
        assert!(RunDate::parse("2025-03-31").is_err());
        assert!(RunDate::parse("20250231").is_err());
        assert!(RunDate::parse("2025033").is_err());
    }

    #[test]
    fn test_today_is_eight_digits() {
        let today = RunDate::today();
        assert_eq!(today.as_str().len(), 8);
        assert!(RunDate::parse(today.as_str()).is_ok());
    }

    #[test]
    fn test_file_names() {
        let date = RunDate::parse("20250331").unwrap();

        assert_eq!(
            output_file_name("EDUARDO", &date, "", TableFormat::Xlsx),
            "EDUARDO_20250331.xlsx"
        );
        assert_eq!(
            output_file_name("EDUARDO", &date, "_combinado", TableFormat::Xlsx),
            "EDUARDO_20250331_combinado.xlsx"
        );
        assert_eq!(
            final_file_name("EDUARDO", "FINAL", &date, TableFormat::Csv),
            "EDUARDO_FINAL_20250331.csv"
        );
    }

    #[test]
    fn test_is_final_file_of() {
        assert!(is_final_file_of("KAUE_FINAL_20250331.xlsx", "KAUE", "FINAL"));
        assert!(!is_final_file_of("KAUE_20250331.xlsx", "KAUE", "FINAL"));
    }
}
