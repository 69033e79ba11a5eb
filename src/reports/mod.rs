//! Report file rendering: CSV and PDF exports and their file names.

pub mod csv;
pub mod pdf;

use crate::{models::fuel_transaction::Shift, services::reports::ShiftFilter};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const FILE_PREFIX: &str = "Rapport-Station-Service";

/// A rendered report ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn csv(filename: String, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            content_type: CSV_CONTENT_TYPE,
            bytes,
        }
    }
}

/// ASCII shift segment used in file names.
fn shift_slug(shift: ShiftFilter) -> &'static str {
    match shift {
        ShiftFilter::All => "Toutes-Equipes",
        ShiftFilter::Morning => "Equipe-Matin",
        ShiftFilter::Night => "Equipe-Nuit",
    }
}

/// Shift label printed inside reports.
pub fn shift_label(shift: ShiftFilter) -> &'static str {
    match shift {
        ShiftFilter::All => "Toutes les Équipes",
        ShiftFilter::Morning => "Équipe Matin",
        ShiftFilter::Night => "Équipe Nuit",
    }
}

/// `Rapport-Station-Service-{start}-a-{end}-{shift}.{ext}`; open ends read `debut`/`fin`.
pub fn period_file_name(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    shift: ShiftFilter,
    extension: &str,
) -> String {
    let start = start.map_or_else(|| "debut".to_string(), |d| d.to_string());
    let end = end.map_or_else(|| "fin".to_string(), |d| d.to_string());
    format!(
        "{}-{}-a-{}-{}.{}",
        FILE_PREFIX,
        start,
        end,
        shift_slug(shift),
        extension
    )
}

pub fn daily_file_name(date: NaiveDate, shift: Shift) -> String {
    format!("{}-{}-{}.csv", FILE_PREFIX, date, shift_slug(shift.into()))
}

/// `dd/mm/yyyy` in station local time.
pub fn local_date_fr(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y").to_string()
}

pub fn date_fr(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(ShiftFilter::All, "Rapport-Station-Service-2025-04-01-a-2025-04-30-Toutes-Equipes.pdf")]
    #[case(ShiftFilter::Morning, "Rapport-Station-Service-2025-04-01-a-2025-04-30-Equipe-Matin.pdf")]
    #[case(ShiftFilter::Night, "Rapport-Station-Service-2025-04-01-a-2025-04-30-Equipe-Nuit.pdf")]
    fn period_names(#[case] shift: ShiftFilter, #[case] expected: &str) {
        assert_eq!(
            period_file_name(Some(d(2025, 4, 1)), Some(d(2025, 4, 30)), shift, "pdf"),
            expected
        );
    }

    #[test]
    fn names_are_ascii() {
        let name = period_file_name(None, None, ShiftFilter::All, "csv");
        assert_eq!(name, "Rapport-Station-Service-debut-a-fin-Toutes-Equipes.csv");
        assert!(daily_file_name(d(2025, 4, 1), Shift::Night).is_ascii());
        assert_eq!(
            daily_file_name(d(2025, 4, 1), Shift::Morning),
            "Rapport-Station-Service-2025-04-01-Equipe-Matin.csv"
        );
    }
}
