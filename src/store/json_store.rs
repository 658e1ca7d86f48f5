use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::Config;
use crate::engine::stats;
use crate::store::schema::{EXPORT_VERSION, ExportData, ProfileData, SessionHistoryData};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "session_history.json";
const DATA_FILES: [&str; 2] = [PROFILE_FILE, HISTORY_FILE];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported export version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("import failed during staging: {0}")]
    Staging(#[source] io::Error),

    #[error("import failed during commit: {0}")]
    Commit(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path).map(|content| serde_json::from_str(&content)) {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                tracing::warn!("discarding unreadable {name}: {e}");
                T::default()
            }
            Err(e) => {
                tracing::warn!("failed to read {name}: {e}");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");
        write_synced(&tmp_path, &serde_json::to_string_pretty(data)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load and deserialize profile. Returns None if file exists but
    /// cannot be parsed (schema mismatch / corruption).
    pub fn load_profile(&self) -> Option<ProfileData> {
        let path = self.file_path(PROFILE_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            Some(ProfileData::default())
        }
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<(), StoreError> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_history(&self) -> SessionHistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &SessionHistoryData) -> Result<(), StoreError> {
        self.save(HISTORY_FILE, data)
    }

    /// Snapshot everything for export. An unreadable profile is rebuilt
    /// from history rather than exported blank.
    pub fn export_all(&self, config: &Config) -> ExportData {
        let history = self.load_history();
        let profile = self.load_profile().unwrap_or_else(|| {
            tracing::warn!("profile unreadable, exporting one rebuilt from history");
            stats::profile_from_history(&history.sessions)
        });
        ExportData {
            mathdr_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            profile,
            history,
        }
    }

    pub fn export_to_file(&self, config: &Config, path: &Path) -> Result<(), StoreError> {
        let export = self.export_all(config);
        write_synced(path, &serde_json::to_string_pretty(&export)?)?;
        tracing::info!(
            "exported {} sessions to {}",
            export.history.sessions.len(),
            path.display()
        );
        Ok(())
    }

    pub fn read_export(path: &Path) -> Result<ExportData, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Two-phase replace of all data files.
    ///
    /// Stage: write every file to `.json.tmp`; any failure removes the staged
    /// files. Commit: move each original to `.json.bak`, then the staged file
    /// into place; a failure restores the backups. Backups are removed once
    /// everything is committed.
    pub fn import_all(&self, data: &ExportData) -> Result<(), StoreError> {
        if data.mathdr_export_version != EXPORT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: data.mathdr_export_version,
                expected: EXPORT_VERSION,
            });
        }

        let files = [
            (PROFILE_FILE, serde_json::to_string_pretty(&data.profile)?),
            (HISTORY_FILE, serde_json::to_string_pretty(&data.history)?),
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            if let Err(e) = write_synced(&tmp_path, json) {
                remove_all(&staged);
                return Err(StoreError::Staging(e));
            }
            staged.push(tmp_path);
        }

        // (final path, backup path, had an original)
        let mut committed: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let final_path = self.file_path(name);
            let bak_path = final_path.with_extension("json.bak");
            let had_original = final_path.exists();

            if had_original && let Err(e) = fs::rename(&final_path, &bak_path) {
                rollback(&committed);
                remove_all(&staged);
                return Err(StoreError::Commit(e));
            }

            if let Err(e) = fs::rename(&staged[i], &final_path) {
                if had_original {
                    let _ = fs::rename(&bak_path, &final_path);
                }
                rollback(&committed);
                remove_all(&staged[i..]);
                return Err(StoreError::Commit(e));
            }

            committed.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &committed {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }

        tracing::info!("imported {} sessions", data.history.sessions.len());
        Ok(())
    }

    /// Check for leftover .bak files from an interrupted import.
    /// Returns true if recovery files were found (and cleaned up).
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in DATA_FILES {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn rollback(committed: &[(PathBuf, PathBuf, bool)]) {
    for (final_path, bak_path, had_original) in committed {
        if *had_original {
            let _ = fs::rename(bak_path, final_path);
        } else {
            let _ = fs::remove_file(final_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::SessionResult;
    use crate::store::schema::SCHEMA_VERSION;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn sample_session() -> SessionResult {
        serde_json::from_str(
            r#"{
                "difficulty": "medium",
                "operation_mode": "division",
                "total_problems": 5,
                "correct_answers": 5,
                "total_attempts": 5,
                "total_time_secs": 20.0,
                "average_time_secs": 4.0,
                "accuracy": 100.0,
                "timestamp": "2026-05-04T08:30:00Z"
            }"#,
        )
        .unwrap()
    }

    fn make_test_export(config: &Config) -> ExportData {
        ExportData {
            mathdr_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            profile: ProfileData::default(),
            history: SessionHistoryData::new(vec![sample_session()]),
        }
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let (_dir, store) = make_test_store();
        let profile = store.load_profile().unwrap();
        assert_eq!(profile.total_sessions, 0);
        assert!(store.load_history().sessions.is_empty());
    }

    #[test]
    fn test_corrupt_profile_is_none_and_corrupt_history_defaults() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROFILE_FILE), "{ not json").unwrap();
        fs::write(store.file_path(HISTORY_FILE), "oops").unwrap();
        assert!(store.load_profile().is_none());
        assert_eq!(store.load_history().schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_export_rebuilds_unreadable_profile() {
        let (_dir, store) = make_test_store();
        store
            .save_history(&SessionHistoryData::new(vec![sample_session(), sample_session()]))
            .unwrap();
        fs::write(store.file_path(PROFILE_FILE), "{ not json").unwrap();

        let export = store.export_all(&Config::default());
        assert_eq!(export.history.sessions.len(), 2);
        assert_eq!(export.profile.total_sessions, 2);
        assert_eq!(export.profile.streak_days, 1);
        assert_eq!(export.profile.last_practice_date.as_deref(), Some("2026-05-04"));
        assert!(export.profile.total_score > 0.0);
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let (dir, store) = make_test_store();
        let mut profile = ProfileData::default();
        profile.total_sessions = 3;
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile().unwrap().total_sessions, 3);
        assert!(!dir.path().join("profile.tmp").exists());
    }

    #[test]
    fn test_round_trip_export_import() {
        let (_dir, store) = make_test_store();
        let config = Config::default();

        let mut profile = ProfileData::default();
        profile.streak_days = 4;
        store.save_profile(&profile).unwrap();
        store
            .save_history(&SessionHistoryData::new(vec![sample_session()]))
            .unwrap();

        let export = store.export_all(&config);
        assert_eq!(export.mathdr_export_version, EXPORT_VERSION);

        let (_dir2, store2) = make_test_store();
        store2.import_all(&export).unwrap();

        let imported_profile = store2.load_profile().unwrap();
        assert_eq!(imported_profile.streak_days, 4);
        let history = store2.load_history();
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.sessions[0].total_problems, 5);
    }

    #[test]
    fn test_export_file_round_trip() {
        let (dir, store) = make_test_store();
        let path = dir.path().join("backup.json");
        store.export_to_file(&Config::default(), &path).unwrap();
        let read = JsonStore::read_export(&path).unwrap();
        assert_eq!(read.mathdr_export_version, EXPORT_VERSION);
    }

    #[test]
    fn test_version_rejection() {
        let (_dir, store) = make_test_store();
        let mut export = make_test_export(&Config::default());
        export.mathdr_export_version = 99;

        let err = store.import_all(&export).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 99, expected: EXPORT_VERSION }
        ));
        assert!(err.to_string().contains("unsupported export version: 99"));
    }

    #[test]
    fn test_import_staging_failure_preserves_originals() {
        let (dir, store) = make_test_store();

        let mut profile = ProfileData::default();
        profile.total_sessions = 42;
        store.save_profile(&profile).unwrap();
        let original_content = fs::read_to_string(store.file_path(PROFILE_FILE)).unwrap();

        // A store pointing at a directory that doesn't exist fails to stage.
        let bad_dir = dir.path().join("nonexistent_subdir");
        let bad_store = JsonStore {
            base_dir: bad_dir.clone(),
        };
        let err = bad_store
            .import_all(&make_test_export(&Config::default()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Staging(_)));
        assert!(!bad_dir.exists());

        let after_content = fs::read_to_string(store.file_path(PROFILE_FILE)).unwrap();
        assert_eq!(original_content, after_content);
    }

    #[test]
    fn test_import_into_empty_store_creates_files() {
        let (_dir, store) = make_test_store();
        assert!(!store.file_path(PROFILE_FILE).exists());

        store
            .import_all(&make_test_export(&Config::default()))
            .unwrap();

        assert!(store.file_path(PROFILE_FILE).exists());
        assert!(store.file_path(HISTORY_FILE).exists());
        assert!(!store.file_path("profile.json.bak").exists());
    }

    #[test]
    fn test_check_interrupted_import_detects_bak_files() {
        let (_dir, store) = make_test_store();
        assert!(!store.check_interrupted_import());

        fs::write(store.file_path("session_history.json.bak"), "{}").unwrap();
        assert!(store.check_interrupted_import());
        assert!(!store.file_path("session_history.json.bak").exists());
    }
}
