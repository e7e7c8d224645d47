//! JSON file storage implementation.
//!
//! Stores one JSON file per row under `<root>/<table>/<id>.json` and the goals
//! under `<root>/goals.json`.

use std::path::{Path, PathBuf};
use fitlog_core::{
    EntryId, FastingSession, FitnessGoals, ReadingEntry, SleepEntry, Timestamped, WeightEntry,
    WorkoutEntry,
};
use serde::{de::DeserializeOwned, Serialize};
use super::{Storage, Result};
use tokio::fs;
use tracing::{debug, warn};

const FASTING: &str = "fasting";
const WEIGHT: &str = "weight";
const WORKOUT: &str = "workout";
const SLEEP: &str = "sleep";
const READING: &str = "reading";

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, making the table directories under `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for table in [FASTING, WEIGHT, WORKOUT, SLEEP, READING] {
            fs::create_dir_all(root.join(table)).await?;
        }

        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn row_path(&self, table: &str, id: EntryId) -> PathBuf {
        self.root.join(table).join(format!("{}.json", id))
    }

    fn goals_path(&self) -> PathBuf {
        self.root.join("goals.json")
    }

    async fn write_row<T: Serialize + Timestamped>(&self, table: &str, row: &T) -> Result<()> {
        let path = self.row_path(table, row.id());
        write_json(&path, row).await?;
        debug!("Saved {} row {}", table, row.id());
        Ok(())
    }

    async fn list_table<T: DeserializeOwned + Timestamped>(&self, table: &str) -> Result<Vec<T>> {
        let mut rows: Vec<T> = list_dir(&self.root.join(table)).await?;
        rows.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then(a.id().cmp(&b.id())));
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_fasting(&mut self, session: &FastingSession) -> Result<()> {
        self.write_row(FASTING, session).await
    }

    async fn load_fasting(&self, id: EntryId) -> Result<Option<FastingSession>> {
        read_json(&self.row_path(FASTING, id)).await
    }

    async fn list_fasting(&self) -> Result<Vec<FastingSession>> {
        self.list_table(FASTING).await
    }

    async fn save_weight(&mut self, entry: &WeightEntry) -> Result<()> {
        self.write_row(WEIGHT, entry).await
    }

    async fn list_weights(&self) -> Result<Vec<WeightEntry>> {
        self.list_table(WEIGHT).await
    }

    async fn save_workout(&mut self, entry: &WorkoutEntry) -> Result<()> {
        self.write_row(WORKOUT, entry).await
    }

    async fn list_workouts(&self) -> Result<Vec<WorkoutEntry>> {
        self.list_table(WORKOUT).await
    }

    async fn save_sleep(&mut self, entry: &SleepEntry) -> Result<()> {
        self.write_row(SLEEP, entry).await
    }

    async fn list_sleep(&self) -> Result<Vec<SleepEntry>> {
        self.list_table(SLEEP).await
    }

    async fn save_reading(&mut self, entry: &ReadingEntry) -> Result<()> {
        self.write_row(READING, entry).await
    }

    async fn list_reading(&self) -> Result<Vec<ReadingEntry>> {
        self.list_table(READING).await
    }

    async fn load_goals(&self) -> Result<FitnessGoals> {
        Ok(read_json(&self.goals_path()).await?.unwrap_or_default())
    }

    async fn save_goals(&mut self, goals: &FitnessGoals) -> Result<()> {
        write_json(&self.goals_path(), goals).await?;
        debug!("Saved goals");
        Ok(())
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable row {}: {}", entry.path().display(), e),
        }
    }
    Ok(items)
}
