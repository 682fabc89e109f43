// tests/local_backup_tests.rs

use chrono::Local;

use admitbot_common::models::{Answers, Field, SubmissionRow};
use admitbot_common::traits::FallbackStore;
use admitbot_core::sink::LocalBackup;
use admitbot_core::Error;

fn row(applicant: &str) -> SubmissionRow {
    let mut answers = Answers::new();
    answers.insert(Field::Fio, applicant);
    SubmissionRow::from_answers(&answers, Local::now())
}

#[tokio::test]
async fn creates_file_and_appends() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("backup_data.json");
    let backup = LocalBackup::new(&path);

    assert!(backup.load().await.is_empty());
    backup.persist_local(&row("Ivanov")).await?;
    backup.persist_local(&row("Petrov")).await?;

    let entries = backup.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["applicant"], "Ivanov");
    assert_eq!(entries[1]["applicant"], "Petrov");
    for entry in &entries {
        assert!(entry["saved_at"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(entry["submitted_at"].as_str().is_some());
    }
    assert_eq!(backup.location(), path.display().to_string());
    Ok(())
}

#[tokio::test]
async fn corrupt_file_is_treated_as_empty() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("backup_data.json");
    std::fs::write(&path, "{ not json")?;

    let backup = LocalBackup::new(&path);
    backup.persist_local(&row("Ivanov")).await?;

    let entries: Vec<serde_json::Value> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[tokio::test]
async fn foreign_entries_survive_rewrite() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("backup_data.json");
    std::fs::write(&path, r#"[{"fio":"old format","saved_at":"2025-01-01T00:00:00"}]"#)?;

    let backup = LocalBackup::new(&path);
    backup.persist_local(&row("Ivanov")).await?;

    let entries = backup.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["fio"], "old format");
    Ok(())
}

#[tokio::test]
async fn unwritable_location_is_an_error() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let backup = LocalBackup::new(dir.path().join("missing").join("backup_data.json"));

    let result = backup.persist_local(&row("Ivanov")).await;
    assert!(matches!(result, Err(Error::Io(_))));
    Ok(())
}
