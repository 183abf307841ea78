use crate::session::SessionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_factor: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<DateTime<Utc>>,
}

impl From<&SessionResult> for ScoreRecord {
    fn from(result: &SessionResult) -> Self {
        Self {
            score: result.score,
            max_factor: Some(result.max_factor),
            played_at: Some(result.finished_at),
        }
    }
}

// Older saves are a bare list of scores.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Record(ScoreRecord),
    Score(u32),
}

impl StoredEntry {
    fn into_record(self) -> ScoreRecord {
        match self {
            StoredEntry::Record(record) => record,
            StoredEntry::Score(score) => ScoreRecord {
                score,
                max_factor: None,
                played_at: None,
            },
        }
    }
}

/// Scores of every finished round, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreHistory {
    records: Vec<ScoreRecord>,
}

impl<'de> Deserialize<'de> for ScoreHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<StoredEntry>::deserialize(deserializer)?;
        Ok(Self {
            records: entries.into_iter().map(StoredEntry::into_record).collect(),
        })
    }
}

impl Serialize for ScoreHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn record(&mut self, result: &SessionResult) {
        self.records.push(ScoreRecord::from(result));
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn highest(&self) -> u32 {
        self.records.iter().map(|r| r.score).max().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Chart points, with sessions numbered from 1.
    pub fn series(&self) -> Vec<(usize, u32)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (i + 1, r.score))
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        (1..=self.records.len())
            .map(|n| format!("Session {}", n))
            .collect()
    }
}
