// File: admitbot-common/src/models/submission.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::answers::{Answers, Field};

/// Impression answer meaning "no opinion"; never written to the sheet.
pub const NO_OPINION: &str = "Затрудняюсь ответить";

/// Separator between impression answers in the single impressions cell.
pub const IMPRESSIONS_SEPARATOR: &str = "; ";

/// Format of the timestamp cell (column I).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row written to an empty worksheet, columns A–I.
pub const SHEET_HEADERS: [&str; 9] = [
    "ФИО абитуриента",
    "Собеседующий",
    "Канонические препятствия",
    "Духовник",
    "Впечатления",
    "Проблемы в учебе",
    "Комментарии",
    "Вердикт",
    "Дата",
];

/// One completed interview, flattened to the nine sheet columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub applicant: String,
    pub interviewer: String,
    pub canonical_obstacles: String,
    pub spiritual_guide: String,
    pub impressions: String,
    pub problems: String,
    pub comments: String,
    pub verdict: String,
    pub submitted_at: String,
}

impl SubmissionRow {
    /// Builds the row from a finished answer bag, stamping it with `now`.
    /// Absent answers become empty cells.
    pub fn from_answers(answers: &Answers, now: DateTime<Local>) -> Self {
        let impressions = join_impressions(
            Field::IMPRESSIONS
                .iter()
                .map(|f| answers.get(*f).unwrap_or_default()),
        );

        Self {
            applicant: answers.get_or_empty(Field::Fio),
            interviewer: answers.get_or_empty(Field::Interviewer),
            canonical_obstacles: answers.get_or_empty(Field::CanonicalObstacles),
            spiritual_guide: answers.get_or_empty(Field::SpiritualGuide),
            impressions,
            problems: answers.get_or_empty(Field::Problems),
            comments: answers.get_or_empty(Field::Comments),
            verdict: answers.get_or_empty(Field::Verdict),
            submitted_at: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Cells in column order A–I.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.applicant.clone(),
            self.interviewer.clone(),
            self.canonical_obstacles.clone(),
            self.spiritual_guide.clone(),
            self.impressions.clone(),
            self.problems.clone(),
            self.comments.clone(),
            self.verdict.clone(),
            self.submitted_at.clone(),
        ]
    }
}

/// Joins impression answers with `"; "`, dropping blanks and the no-opinion reply.
pub fn join_impressions<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty() && *v != NO_OPINION)
        .collect::<Vec<_>>()
        .join(IMPRESSIONS_SEPARATOR)
}

/// A row that could not reach the spreadsheet, as kept in the local backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    #[serde(flatten)]
    pub row: SubmissionRow,
    /// RFC 3339 capture time.
    pub saved_at: String,
}

impl BackupEntry {
    pub fn new(row: SubmissionRow, saved_at: DateTime<Local>) -> Self {
        Self {
            row,
            saved_at: saved_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn impressions_skip_blank_and_no_opinion() {
        let joined = join_impressions(["A", "", "B", NO_OPINION, "C", ""]);
        assert_eq!(joined, "A; B; C");
    }

    #[test]
    fn impressions_all_skipped_is_empty() {
        assert_eq!(join_impressions([NO_OPINION, " ", ""]), "");
    }

    #[test]
    fn row_from_partial_answers_fills_blanks() {
        let mut answers = Answers::new();
        answers.insert(Field::Fio, "Ivanov");
        answers.insert(Field::Verdict, "Нет");
        let now = Local.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap();

        let row = SubmissionRow::from_answers(&answers, now);
        let cells = row.cells();
        assert_eq!(cells.len(), SHEET_HEADERS.len());
        assert_eq!(cells[0], "Ivanov");
        assert_eq!(cells[3], "");
        assert_eq!(cells[4], "");
        assert_eq!(cells[7], "Нет");
        assert_eq!(cells[8], "2026-06-01 09:30:00");
    }

    #[test]
    fn backup_entry_flattens_row() {
        let answers = Answers::new();
        let now = Local.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap();
        let entry = BackupEntry::new(SubmissionRow::from_answers(&answers, now), now);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["submitted_at"], "2026-06-01 09:30:00");
        assert!(json["saved_at"].as_str().unwrap().starts_with("2026-06-01T09:30:00"));
    }
}
