use directories::ProjectDirs;
use quiz_core::config::QuizConfig;
use quiz_core::history::ScoreHistory;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const APP_NAME: &str = "times_quiz";
const ORG_NAME: &str = "practice";
const SCORES_FILE: &str = "scores.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine data directory")]
    NoDataDir,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where saved scores and settings live.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn open() -> Result<Self, StorageError> {
        ProjectDirs::from("com", ORG_NAME, APP_NAME)
            .map(|dirs| Self::at(dirs.data_dir()))
            .ok_or(StorageError::NoDataDir)
    }

    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn save_scores(&self, history: &ScoreHistory) -> Result<(), StorageError> {
        self.write_json(SCORES_FILE, history)
    }

    pub fn load_scores(&self) -> Result<Option<ScoreHistory>, StorageError> {
        self.read_json(SCORES_FILE)
    }

    pub fn clear_scores(&self) -> Result<(), StorageError> {
        let path = self.dir.join(SCORES_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    pub fn save_settings(&self, config: &QuizConfig) -> Result<(), StorageError> {
        self.write_json(SETTINGS_FILE, config)
    }

    pub fn load_settings(&self) -> Result<Option<QuizConfig>, StorageError> {
        Ok(self.read_json::<QuizConfig>(SETTINGS_FILE)?.map(QuizConfig::clamped))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "saved");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StorageError> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }
}

pub fn load_scores_or_new(storage: Option<&Storage>) -> ScoreHistory {
    let Some(storage) = storage else {
        return ScoreHistory::new();
    };
    match storage.load_scores() {
        Ok(history) => history.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "could not load saved scores, starting fresh");
            ScoreHistory::new()
        }
    }
}

pub fn load_settings_or_default(storage: Option<&Storage>) -> QuizConfig {
    let Some(storage) = storage else {
        return QuizConfig::default();
    };
    match storage.load_settings() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "could not load settings, using defaults");
            QuizConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quiz_core::session::SessionResult;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "times_quiz_{}_{}_{}",
            name,
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_files_load_as_none() {
        let storage = Storage::at(scratch_dir("missing"));
        assert!(storage.load_scores().unwrap().is_none());
        assert!(storage.load_settings().unwrap().is_none());
        assert!(storage.clear_scores().is_ok());
    }

    #[test]
    fn scores_and_settings_persist() {
        let dir = scratch_dir("persist");
        let storage = Storage::at(&dir);

        let mut history = ScoreHistory::new();
        history.record(&SessionResult {
            score: 18,
            questions: 19,
            max_factor: 9,
            finished_at: Utc::now(),
        });
        storage.save_scores(&history).unwrap();
        storage.save_settings(&QuizConfig::with_max_factor(9)).unwrap();

        assert_eq!(storage.load_scores().unwrap(), Some(history));
        assert_eq!(storage.load_settings().unwrap().map(|c| c.max_factor), Some(9));

        storage.clear_scores().unwrap();
        assert!(storage.load_scores().unwrap().is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_scores_fall_back_to_empty() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SCORES_FILE), "{ not json").unwrap();
        let storage = Storage::at(&dir);

        assert!(matches!(storage.load_scores(), Err(StorageError::Json { .. })));
        assert!(load_scores_or_new(Some(&storage)).is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn legacy_score_lists_load() {
        let dir = scratch_dir("legacy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SCORES_FILE), "[4, 11]").unwrap();

        let history = load_scores_or_new(Some(&Storage::at(&dir)));
        assert_eq!(history.highest(), 11);
        let _ = fs::remove_dir_all(dir);
    }
}
