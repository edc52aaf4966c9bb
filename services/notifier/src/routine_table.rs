//! services/notifier/src/routine_table.rs
//!
//! Loads the routine table from a JSON file. Entries that do not parse (an
//! unknown action, a malformed time) are dropped one by one with a warning
//! so the rest of the table still runs.

use roster_notify_core::domain::RoutineDefinition;
use roster_notify_core::routine::default_routines;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::error::NotifierError;

/// Reads the table at `path`, falling back to the built-in routines when the
/// file does not exist.
pub async fn load_routine_table(path: &Path) -> Result<Vec<RoutineDefinition>, NotifierError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => parse_routine_table(&raw),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No routine table at {}, using the built-in routines", path.display());
            Ok(default_routines())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parses a JSON array of routine definitions. Only a document that is not an
/// array at all is an error.
pub fn parse_routine_table(raw: &str) -> Result<Vec<RoutineDefinition>, NotifierError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut routines = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RoutineDefinition>(entry) {
            Ok(routine) => routines.push(routine),
            Err(e) => warn!("Skipping routine entry #{}: {}", index, e),
        }
    }
    Ok(routines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_notify_core::domain::RoutineAction;
    use tempfile::TempDir;

    #[test]
    fn bad_entries_are_skipped_individually() {
        let raw = r#"[
            {"id":"morning","days":["mon","tue"],"time":"07:00","action":"check_today_events"},
            {"id":"party","days":["fri"],"time":"20:00","action":"send_fireworks"},
            {"id":"late","days":["sat"],"time":"25:61","action":"encourage_musicians"},
            {"id":"teachers","days":["thu"],"time":"10:00","action":"encourage_teachers"}
        ]"#;
        let routines = parse_routine_table(raw).unwrap();
        let ids: Vec<&str> = routines.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["morning", "teachers"]);
        assert_eq!(routines[1].action, RoutineAction::EncourageTeachers);
    }

    #[test]
    fn a_non_array_document_is_an_error() {
        assert!(matches!(
            parse_routine_table(r#"{"id":"x"}"#),
            Err(NotifierError::Json(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_the_built_in_table() {
        let dir = TempDir::new().unwrap();
        let routines = load_routine_table(&dir.path().join("routines.json")).await.unwrap();
        assert_eq!(routines, default_routines());
    }

    #[tokio::test]
    async fn reads_the_table_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routines.json");
        std::fs::write(
            &path,
            r#"[{"id":"only","days":["sun"],"time":"09:15","action":"encourage_musicians"}]"#,
        )
        .unwrap();
        let routines = load_routine_table(&path).await.unwrap();
        assert_eq!(routines.len(), 1);
        assert_eq!(routines[0].id, "only");
    }
}
