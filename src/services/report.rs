// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV reports.
//!
//! Reports are plain comma-separated text with a fixed header row. Fields
//! are never quoted: commas and line breaks inside a value are replaced
//! with spaces so every row keeps its column count.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::db::ShootStore;
use crate::error::{AppError, Result};
use crate::models::member::normalize_email;
use crate::models::{Principal, Shoot};
use crate::time_utils::parse_iso_date;

pub const MASTER_HEADER: [&str; 5] = ["Date", "Event", "Location", "Worker", "Status"];
pub const PERSONAL_HEADER: [&str; 5] = ["Date", "Client", "Location", "Status", "Hard Disk ID"];
pub const HISTORY_HEADER: [&str; 4] = ["Date", "Event", "Location", "Status"];
pub const EDITING_HEADER: [&str; 8] = [
    "Client Name",
    "Trailer Status",
    "Trailer Budget",
    "Trailer Paid Date",
    "Full Video Status",
    "Full Video Budget",
    "FV Paid Date",
    "Disk ID",
];

const MISSING: &str = "N/A";

/// Inclusive date range, compared lexicographically against `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Validate both bounds as `YYYY-MM-DD` with `start <= end`.
    pub fn new(start: &str, end: &str) -> Result<Self> {
        if parse_iso_date(start).is_none() || parse_iso_date(end).is_none() {
            return Err(AppError::BadRequest(
                "report dates must be YYYY-MM-DD".to_string(),
            ));
        }
        if start > end {
            return Err(AppError::BadRequest(
                "report start date is after end date".to_string(),
            ));
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

/// Replace the characters that would break an unquoted row.
pub fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            ',' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

/// A report ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub file_name: String,
    pub header: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl Report {
    fn new(
        file_name: String,
        header: &'static [&'static str],
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(AppError::NoData(format!("{} has no matching shoots", file_name)));
        }
        Ok(Self {
            file_name,
            header,
            rows,
        })
    }

    /// Serialize header and rows into `writer`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv.write_record(self.header)
            .map_err(|e| AppError::Export(e.to_string()))?;
        for row in &self.rows {
            let row: Vec<String> = row.iter().map(|v| sanitize_field(v)).collect();
            csv.write_record(&row)
                .map_err(|e| AppError::Export(e.to_string()))?;
        }
        csv.flush().map_err(|e| AppError::Export(e.to_string()))?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| AppError::Export(e.to_string()))
    }

    /// Write the report to a temporary file in `dir` on the blocking pool.
    ///
    /// The file is removed when the returned handle is dropped.
    pub async fn export_to(self, dir: &Path) -> Result<ExportedReport> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || self.write_temp_file(&dir))
            .await
            .map_err(|e| AppError::Export(format!("export task failed: {}", e)))?
    }

    fn write_temp_file(&self, dir: &Path) -> Result<ExportedReport> {
        let mut file = tempfile::Builder::new()
            .prefix("report-")
            .suffix(".csv")
            .tempfile_in(dir)
            .map_err(|e| AppError::Export(format!("create temp file: {}", e)))?;

        self.write_csv(file.as_file_mut())?;

        tracing::info!(
            file_name = %self.file_name,
            rows = self.rows.len(),
            path = %file.path().display(),
            "Report written"
        );

        Ok(ExportedReport {
            file_name: self.file_name.clone(),
            file,
        })
    }
}

/// A report written to disk, ready to hand to the download response.
#[derive(Debug)]
pub struct ExportedReport {
    /// Suggested download name
    pub file_name: String,
    file: NamedTempFile,
}

impl ExportedReport {
    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Read the file contents back.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(self.file.path())
            .await
            .map_err(|e| AppError::Export(format!("read report: {}", e)))
    }
}

fn or_missing(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Admin report over every shoot in the range.
pub fn master_report(shoots: &[Shoot], range: &DateRange) -> Result<Report> {
    let rows = shoots
        .iter()
        .filter(|s| range.contains(&s.date))
        .map(|s| {
            vec![
                s.date.clone(),
                s.name.clone(),
                s.location.clone(),
                s.worker_label().to_string(),
                s.status.to_string(),
            ]
        })
        .collect();
    Report::new("Master_Report.csv".to_string(), &MASTER_HEADER, rows)
}

/// A worker's own shoots in the range.
pub fn personal_report(worker_name: &str, shoots: &[Shoot], range: &DateRange) -> Result<Report> {
    let rows = shoots
        .iter()
        .filter(|s| range.contains(&s.date))
        .map(|s| {
            vec![
                s.date.clone(),
                s.display_name().to_string(),
                s.location.clone(),
                s.status.to_string(),
                or_missing(s.hard_disk_id.as_deref()),
            ]
        })
        .collect();
    Report::new(
        format!("My_Report_{}.csv", sanitize_file_name(worker_name)),
        &PERSONAL_HEADER,
        rows,
    )
}

/// One member's history, limited to `range` unless it is `None`.
pub fn member_history_report(
    member_name: &str,
    shoots: &[Shoot],
    range: Option<&DateRange>,
) -> Result<Report> {
    let rows = shoots
        .iter()
        .filter(|s| range.is_none_or(|r| r.contains(&s.date)))
        .map(|s| {
            vec![
                s.date.clone(),
                s.name.clone(),
                s.location.clone(),
                s.status.to_string(),
            ]
        })
        .collect();
    Report::new(
        format!("{}_History.csv", sanitize_file_name(member_name)),
        &HISTORY_HEADER,
        rows,
    )
}

/// Editing and finance state of every record.
pub fn editing_report(shoots: &[Shoot]) -> Result<Report> {
    let rows = shoots
        .iter()
        .map(|s| {
            vec![
                or_missing(s.client_name.as_deref()),
                s.trailer_status.map_or(MISSING, |st| st.as_str()).to_string(),
                s.trailer_budget.clone().unwrap_or_else(|| "0".to_string()),
                or_missing(s.trailer_paid_date.as_deref()),
                s.full_video_status
                    .map_or(MISSING, |st| st.as_str())
                    .to_string(),
                s.full_video_budget
                    .clone()
                    .unwrap_or_else(|| "0".to_string()),
                or_missing(s.full_video_paid_date.as_deref()),
                or_missing(s.hard_disk_id.as_deref()),
            ]
        })
        .collect();
    Report::new("Editor_Work_Report.csv".to_string(), &EDITING_HEADER, rows)
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "member".to_string()
    } else {
        cleaned
    }
}

/// Loads the records behind each report and writes it out.
pub struct ReportService {
    store: Arc<dyn ShootStore>,
    export_dir: PathBuf,
}

impl ReportService {
    pub fn new(store: Arc<dyn ShootStore>, export_dir: PathBuf) -> Self {
        Self { store, export_dir }
    }

    async fn export(&self, report: Report) -> Result<ExportedReport> {
        report.export_to(&self.export_dir).await
    }

    pub async fn master(&self, principal: &Principal, range: &DateRange) -> Result<ExportedReport> {
        principal.require_admin()?;
        let shoots = self
            .store
            .list_shoots_in_range(&range.start, &range.end)
            .await?;
        self.export(master_report(&shoots, range)?).await
    }

    /// The caller's own shoots, matched by display name.
    pub async fn personal(
        &self,
        principal: &Principal,
        range: &DateRange,
    ) -> Result<ExportedReport> {
        let mut shoots = self
            .store
            .list_shoots_for_worker(&principal.display_name)
            .await?;
        shoots.reverse();
        self.export(personal_report(&principal.display_name, &shoots, range)?).await
    }

    pub async fn member_history(
        &self,
        principal: &Principal,
        email: &str,
        range: Option<&DateRange>,
    ) -> Result<ExportedReport> {
        principal.require_admin()?;
        let email = normalize_email(email);
        let shoots = self.store.list_shoots_for_assignee(&email).await?;
        let name = self
            .store
            .find_member_by_email(&email)
            .await?
            .map(|m| m.display_name)
            .unwrap_or_else(|| email.clone());
        self.export(member_history_report(&name, &shoots, range)?).await
    }

    pub async fn editing(&self, principal: &Principal) -> Result<ExportedReport> {
        principal.require_editor()?;
        let shoots = self.store.list_shoots().await?;
        self.export(editing_report(&shoots)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EditStatus, ShootStatus};

    fn shoot(date: &str, name: &str, location: &str) -> Shoot {
        Shoot {
            id: format!("id-{}", date),
            date: date.to_string(),
            name: name.to_string(),
            client_name: None,
            location: location.to_string(),
            assigned_to: Some("asha@example.com".to_string()),
            worker_name: Some("Asha".to_string()),
            status: ShootStatus::Accepted,
            created_at: String::new(),
            kind: None,
            scope: None,
            trailer_status: None,
            full_video_status: None,
            trailer_budget: None,
            full_video_budget: None,
            trailer_paid: false,
            full_video_paid: false,
            trailer_paid_date: None,
            full_video_paid_date: None,
            trailer_done_date: None,
            full_video_done_date: None,
            trailer_delivery_date: None,
            full_video_delivery_date: None,
            hard_disk_id: None,
            revision: 0,
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    #[test]
    fn test_master_report_strips_commas() {
        let shoots = vec![
            shoot("2026-03-10", "Perera, Silva Wedding", "Galle Fort, Galle"),
            shoot("2026-03-15", "Birthday", "Colombo"),
        ];
        let csv = master_report(&shoots, &range("2026-03-01", "2026-03-31"))
            .unwrap()
            .to_csv_string()
            .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Date,Event,Location,Worker,Status");
        assert_eq!(
            lines[1],
            "2026-03-10,Perera  Silva Wedding,Galle Fort  Galle,Asha,Accepted"
        );
        for line in &lines {
            assert_eq!(line.matches(',').count(), 4);
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let shoots = vec![
            shoot("2026-03-01", "a", "x"),
            shoot("2026-03-12", "b", "x"),
            shoot("2026-03-13", "c", "x"),
        ];
        let report = master_report(&shoots, &range("2026-03-01", "2026-03-12")).unwrap();
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn test_empty_selection_is_no_data() {
        let shoots = vec![shoot("2026-04-01", "a", "x")];
        let err = master_report(&shoots, &range("2026-03-01", "2026-03-31")).unwrap_err();
        assert!(matches!(err, AppError::NoData(_)));
        assert!(matches!(editing_report(&[]), Err(AppError::NoData(_))));
    }

    #[test]
    fn test_line_breaks_are_flattened() {
        let shoots = vec![shoot("2026-03-10", "Line\r\nbreak", "x")];
        let csv = member_history_report("Asha", &shoots, None)
            .unwrap()
            .to_csv_string()
            .unwrap();
        assert_eq!(csv, "Date,Event,Location,Status\n2026-03-10,Line  break,x,Accepted\n");
    }

    #[test]
    fn test_personal_report_defaults_disk_id() {
        let mut with_client = shoot("2026-03-10", "Event", "Kandy");
        with_client.client_name = Some("Perera".to_string());
        with_client.hard_disk_id = Some("HD-07".to_string());
        let plain = shoot("2026-03-11", "Event", "Kandy");

        let report =
            personal_report("Asha", &[with_client, plain], &range("2026-03-01", "2026-03-31"))
                .unwrap();
        assert_eq!(report.file_name, "My_Report_Asha.csv");
        assert_eq!(report.rows[0][1], "Perera");
        assert_eq!(report.rows[0][4], "HD-07");
        assert_eq!(report.rows[1][1], "Event");
        assert_eq!(report.rows[1][4], "N/A");
    }

    #[test]
    fn test_editing_report_defaults() {
        let mut s = shoot("2026-03-10", "Event", "Kandy");
        s.client_name = Some("Perera, Silva".to_string());
        s.trailer_status = Some(EditStatus::Done);
        s.trailer_budget = Some("15000".to_string());
        s.full_video_status = Some(EditStatus::NotApplicable);

        let csv = editing_report(&[s]).unwrap().to_csv_string().unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "Perera  Silva,Done,15000,N/A,N/A,0,N/A,N/A");
    }

    #[test]
    fn test_history_full_or_ranged() {
        let shoots = vec![shoot("2025-12-01", "a", "x"), shoot("2026-03-10", "b", "x")];
        let full = member_history_report("Asha Perera", &shoots, None).unwrap();
        assert_eq!(full.rows.len(), 2);
        assert_eq!(full.file_name, "Asha_Perera_History.csv");

        let ranged =
            member_history_report("Asha", &shoots, Some(&range("2026-01-01", "2026-12-31")))
                .unwrap();
        assert_eq!(ranged.rows.len(), 1);
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new("2026-03-01", "2026-03-31").is_ok());
        assert!(DateRange::new("2026-03-31", "2026-03-01").is_err());
        assert!(DateRange::new("2026-3-1", "2026-03-31").is_err());
    }

    #[tokio::test]
    async fn test_export_writes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = master_report(
            &[shoot("2026-03-10", "Wedding", "Kandy")],
            &range("2026-03-01", "2026-03-31"),
        )
        .unwrap();

        let exported = report.export_to(dir.path()).await.unwrap();
        let path = exported.path();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        drop(exported);
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_export_to_missing_dir_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let report = editing_report(&[shoot("2026-03-10", "Wedding", "Kandy")]).unwrap();

        let err = report.export_to(&missing).await.unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
    }
}
