pub mod dates;
pub mod normalize;

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use tracing::debug;

use self::dates::{parse_date, parse_timestamp};
use self::normalize::normalize_header;

/// Columns summed into `Total_Soldier_Casualties` (already in normalized form).
const CASUALTY_COLUMNS: &[&str] = &["Casualties", "Injured", "Captured"];

/// One survey row after header normalization and coercion. Cell text is kept
/// keyed by the normalized header; the typed accessors apply the insert-time
/// defaults (0 for numeric columns, NULL for text and dates).
#[derive(Debug, Clone)]
pub struct Record {
    fields: HashMap<String, String>,
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub total_soldier_casualties: i64,
}

impl Record {
    /// Cell text under a normalized column name; empty cells read as NULL.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Integer column with the missing/non-numeric → 0 policy.
    pub fn int(&self, column: &str) -> i32 {
        number_or_zero(self.text(column)) as i32
    }

    /// Floating-point column with the missing/non-numeric → 0 policy.
    pub fn float(&self, column: &str) -> f64 {
        self.text(column)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }
}

/// Numeric coercion for the casualty sum and integer columns: missing or
/// non-numeric cells count as 0.
fn number_or_zero(cell: Option<&str>) -> i64 {
    cell.and_then(|s| {
        let s = s.trim();
        s.parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|v| v as i64))
    })
    .unwrap_or(0)
}

/// Parse the semicolon-delimited export into ordered records.
///
/// A row whose field count does not match the header is dropped, not an
/// error; the drop count is returned so the run summary can say how many
/// rows never made it to the table.
pub fn parse_csv(csv_text: &str) -> Result<(Vec<Record>, usize)> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading export header row")?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                debug!(%err, "skipping malformed row");
                skipped += 1;
                continue;
            }
        };

        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();

        let total_soldier_casualties: i64 = CASUALTY_COLUMNS
            .iter()
            .map(|col| number_or_zero(fields.get(*col).map(String::as_str)))
            .sum();

        let date = fields.get("Date").and_then(|s| parse_date(s));
        let start = fields.get("start").and_then(|s| parse_timestamp(s));
        let end = fields.get("end").and_then(|s| parse_timestamp(s));

        records.push(Record {
            fields,
            date,
            start,
            end,
            total_soldier_casualties,
        });
    }

    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const SAMPLE: &str = "\
start;end;Date;Country;Event;Oblast;Casualties;Injured;Captured;Civilian Casualties;New Recruits;Combat Intensity;Territory Status;Percentage Occupied;Area Occupied
2023-05-01T08:00:00.000+03:00;2023-05-01T08:20:00.000+03:00;2023-05-01;Ukraine;shelling;Kharkiv;2;3;4;1;0;7.5;contested;12.5;300.0
2023-05-02T09:00:00.000+03:00;2023-05-02T09:10:00.000+03:00;2023-05-02;Ukraine;assault;Donetsk;5;;1;0;10;3.2;occupied;40.0;1200.5
";

    #[test]
    fn headers_are_normalized_and_rows_typed() -> Result<()> {
        let (records, skipped) = parse_csv(SAMPLE)?;
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 0);

        let first = &records[0];
        assert_eq!(first.text("Country"), Some("Ukraine"));
        assert_eq!(first.text("Territory_Status"), Some("contested"));
        assert_eq!(first.int("Civilian_Casualties"), 1);
        assert_eq!(first.float("Percentage_Occupied"), 12.5);
        assert_eq!(
            first.date,
            Some(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap())
        );
        assert!(first.start.is_some());
        assert!(first.end.is_some());
        Ok(())
    }

    #[test]
    fn total_sums_with_missing_treated_as_zero() -> Result<()> {
        let (records, _) = parse_csv(SAMPLE)?;
        assert_eq!(records[0].total_soldier_casualties, 2 + 3 + 4);
        // second row has an empty Injured cell
        assert_eq!(records[1].total_soldier_casualties, 5 + 0 + 1);
        Ok(())
    }

    #[test]
    fn total_is_zero_when_all_source_columns_absent() -> Result<()> {
        let (records, _) = parse_csv("Date;Event\n2023-05-01;patrol\n")?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_soldier_casualties, 0);
        Ok(())
    }

    #[test]
    fn non_numeric_counts_coerce_to_zero() -> Result<()> {
        let (records, _) =
            parse_csv("Casualties;Injured;Captured\nunknown;3;n/a\n")?;
        assert_eq!(records[0].total_soldier_casualties, 3);
        assert_eq!(records[0].int("Casualties"), 0);
        Ok(())
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() -> Result<()> {
        let csv_text = "\
Date;Event;Casualties
2023-05-01;a;1
2023-05-02;b;2
2023-05-03;c;extra;fields;here;3
2023-05-04;d;4
2023-05-05;e;5
2023-05-06;f;6
";
        let (records, skipped) = parse_csv(csv_text)?;
        assert_eq!(records.len(), 5);
        assert_eq!(skipped, 1);
        // source order survives the skip
        let events: Vec<_> = records.iter().map(|r| r.text("Event").unwrap()).collect();
        assert_eq!(events, vec!["a", "b", "d", "e", "f"]);
        Ok(())
    }

    #[test]
    fn bad_date_nulls_the_cell_not_the_row() -> Result<()> {
        let (records, skipped) = parse_csv("Date;Event\nnot-a-date;skirmish\n")?;
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, None);
        assert_eq!(records[0].text("Event"), Some("skirmish"));
        Ok(())
    }

    #[test]
    fn empty_text_cells_read_as_null() -> Result<()> {
        let (records, _) = parse_csv("Date;Event;Oblast\n2023-05-01;;Kharkiv\n")?;
        assert_eq!(records[0].text("Event"), None);
        assert_eq!(records[0].text("Oblast"), Some("Kharkiv"));
        Ok(())
    }
}
