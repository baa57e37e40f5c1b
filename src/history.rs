use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};

use crate::models::{format_time, Exercise, WorkoutSession};

/// Sessions kept in the log; the oldest is evicted past this.
pub const MAX_HISTORY: usize = 10;

const CSV_HEADER: &str = "Date,Exercise,Time (mm:ss),Weight (lbs)";

/// Capped newest-first log of completed sessions, persisted as a single
/// JSON document that is read once at startup and rewritten wholesale on
/// every append.
pub struct HistoryStore {
    sessions: Vec<WorkoutSession>,
    path: PathBuf,
}

impl HistoryStore {
    /// History file under the platform data directory.
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("superslow");
        let _ = fs::create_dir_all(&data_dir);
        data_dir.join("history.json")
    }

    /// Reads the persisted log. A missing or unparsable file yields an
    /// empty history; that is the only fallback, never a crash.
    pub fn load(path: PathBuf) -> Self {
        let mut sessions: Vec<WorkoutSession> = Vec::new();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(parsed) => {
                        sessions = parsed;
                        info!("Loaded {} sessions from {:?}", sessions.len(), path);
                    }
                    Err(e) => warn!("Discarding unparsable history: {}", e),
                },
                Err(e) => warn!("Failed to read history file: {}", e),
            }
        }
        sessions.truncate(MAX_HISTORY);
        HistoryStore { sessions, path }
    }

    pub fn sessions(&self) -> &[WorkoutSession] {
        &self.sessions
    }

    pub fn latest(&self) -> Option<&WorkoutSession> {
        self.sessions.first()
    }

    /// Carries the most recent session's weights into a fresh round,
    /// matching exercises by exact name. Times stay at zero.
    pub fn seed_weights(&self, exercises: &mut [Exercise]) {
        let Some(last) = self.latest() else {
            return;
        };
        for exercise in exercises.iter_mut() {
            if let Some(prev) = last.exercises.iter().find(|e| e.name == exercise.name) {
                exercise.weight = prev.weight.clone();
            }
        }
    }

    /// Prepends a session, evicts past the cap, and rewrites the whole
    /// persisted document. The in-memory log is updated even if the write
    /// fails.
    pub fn append(&mut self, session: WorkoutSession) -> Result<()> {
        self.sessions.insert(0, session);
        self.sessions.truncate(MAX_HISTORY);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.sessions)
            .context("failed to serialize history")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write history to {:?}", self.path))?;
        info!("History saved to {:?}", self.path);
        Ok(())
    }

    /// True when the current numbers beat the most recent session's entry
    /// for the same exercise: strictly more weight or strictly more time.
    /// No matching history means no improvement to claim.
    pub fn improved(&self, current: &Exercise) -> bool {
        let Some(last) = self.latest() else {
            return false;
        };
        let Some(prev) = last.exercises.iter().find(|e| e.name == current.name) else {
            return false;
        };
        current.weight_value() > prev.weight_value()
            || current.elapsed_seconds > prev.elapsed_seconds
    }

    /// Serializes the whole log as CSV, one row per (session, exercise)
    /// pair, newest session first. Empty weight is written as 0.
    pub fn export_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        csv.push('\n');
        for session in &self.sessions {
            for exercise in &session.exercises {
                let weight = if exercise.weight.is_empty() {
                    "0"
                } else {
                    exercise.weight.as_str()
                };
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    session.timestamp,
                    exercise.name,
                    format_time(exercise.elapsed_seconds),
                    weight
                ));
            }
        }
        csv
    }

    /// Writes the CSV export into the given directory as
    /// workout-history-YYYY-MM-DD.csv and returns the path.
    pub fn export_csv_file(&self, dir: &Path) -> Result<PathBuf> {
        let filename = format!("workout-history-{}.csv", Local::now().format("%Y-%m-%d"));
        let path = dir.join(filename);
        fs::write(&path, self.export_csv())
            .with_context(|| format!("failed to write CSV to {:?}", path))?;
        info!("Exported history to {:?}", path);
        Ok(path)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_session;
    use tempfile::tempdir;

    fn session(id: &str, entries: &[(&str, u32, &str)]) -> WorkoutSession {
        WorkoutSession {
            id: id.to_string(),
            timestamp: format!("2026-08-{} 07:00", id),
            exercises: entries
                .iter()
                .map(|(name, elapsed, weight)| Exercise {
                    name: name.to_string(),
                    elapsed_seconds: *elapsed,
                    lap_seconds: 0,
                    weight: weight.to_string(),
                })
                .collect(),
        }
    }

    fn empty_store(dir: &Path) -> HistoryStore {
        HistoryStore::load(dir.join("history.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path());
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_load_unparsable_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        let store = HistoryStore::load(path);
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_append_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store
            .append(session("01", &[("Squats", 120, "135")]))
            .unwrap();

        let reloaded = empty_store(dir.path());
        assert_eq!(reloaded.sessions().len(), 1);
        assert_eq!(reloaded.latest().unwrap().exercises[0].weight, "135");
    }

    #[test]
    fn test_append_caps_at_ten_newest_first() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        for i in 1..=11 {
            store
                .append(session(&format!("{:02}", i), &[("Squats", i, "100")]))
                .unwrap();
        }
        assert_eq!(store.sessions().len(), MAX_HISTORY);
        assert_eq!(store.sessions()[0].id, "11");
        // session 1 is the evicted one
        assert_eq!(store.sessions()[9].id, "02");
    }

    #[test]
    fn test_seed_weights_from_latest() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store
            .append(session("01", &[("Leg Press", 120, "135"), ("Rowing", 90, "80")]))
            .unwrap();

        let mut exercises = default_session();
        store.seed_weights(&mut exercises);
        assert_eq!(exercises[0].weight, "135");
        assert_eq!(exercises[0].elapsed_seconds, 0);
        // no matching history entry, weight stays empty
        assert_eq!(exercises[1].weight, "");
    }

    #[test]
    fn test_csv_shape_and_order() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store
            .append(session("01", &[("Leg Press", 125, "135"), ("Pulldown", 90, "")]))
            .unwrap();
        store
            .append(session("02", &[("Leg Press", 130, "140"), ("Pulldown", 95, "70")]))
            .unwrap();

        let csv = store.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Date,Exercise,Time (mm:ss),Weight (lbs)");
        assert_eq!(lines[1], "2026-08-02 07:00,Leg Press,02:10,140");
        assert_eq!(lines[3], "2026-08-01 07:00,Leg Press,02:05,135");
        // empty weight serializes as 0
        assert_eq!(lines[4], "2026-08-01 07:00,Pulldown,01:30,0");
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_export_csv_file_name() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path());
        let path = store.export_csv_file(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("workout-history-"));
        assert!(name.ends_with(".csv"));
        assert!(path.exists());
    }

    #[test]
    fn test_improved_by_weight_or_time() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store
            .append(session("01", &[("Leg Press", 120, "135")]))
            .unwrap();

        let mut current = Exercise::new("Leg Press");
        current.weight = "140".to_string();
        current.elapsed_seconds = 120;
        assert!(store.improved(&current));

        current.weight = "135".to_string();
        current.elapsed_seconds = 121;
        assert!(store.improved(&current));

        current.elapsed_seconds = 120;
        assert!(!store.improved(&current));
    }

    #[test]
    fn test_improved_nan_weight_never_counts() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store
            .append(session("01", &[("Leg Press", 120, "135")]))
            .unwrap();

        let mut current = Exercise::new("Leg Press");
        current.weight = String::new();
        current.elapsed_seconds = 120;
        assert!(!store.improved(&current));
    }

    #[test]
    fn test_improved_without_history_is_false() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path());
        let mut current = Exercise::new("Leg Press");
        current.weight = "999".to_string();
        current.elapsed_seconds = 999;
        assert!(!store.improved(&current));
    }
}
