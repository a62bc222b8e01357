//! Persistence boundary for the engine's collections.
//!
//! Each collection is a synchronous key-value read/write under a fixed
//! namespace key. [`JsonFileStore`] keeps one JSON document per namespace in
//! a data directory; [`MemoryStore`] backs tests and throwaway sessions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Achievement, Challenge, Habit, HabitTemplate, MoodEntry};

pub const HABITS_KEY: &str = "habits";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const CHALLENGES_KEY: &str = "challenges";
pub const MOODS_KEY: &str = "moods";
pub const TEMPLATES_KEY: &str = "templates";

/// Load/save contract for every collection the engine owns. Implementations
/// must round-trip all fields losslessly and preserve element order.
pub trait Persistence {
    fn load_habits(&self) -> EngineResult<Vec<Habit>>;
    fn save_habits(&self, habits: &[Habit]) -> EngineResult<()>;

    fn load_achievements(&self) -> EngineResult<Vec<Achievement>>;
    fn save_achievements(&self, achievements: &[Achievement]) -> EngineResult<()>;

    fn load_challenges(&self) -> EngineResult<Vec<Challenge>>;
    fn save_challenges(&self, challenges: &[Challenge]) -> EngineResult<()>;

    fn load_moods(&self) -> EngineResult<Vec<MoodEntry>>;
    fn save_moods(&self, moods: &[MoodEntry]) -> EngineResult<()>;

    fn load_templates(&self) -> EngineResult<Vec<HabitTemplate>>;
    fn save_templates(&self, templates: &[HabitTemplate]) -> EngineResult<()>;
}

/// File-backed store: `<data_dir>/<namespace>.json` per collection.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open the store, creating the data directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| EngineError::Persistence(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> EngineResult<Vec<T>> {
        let path = self.file(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| EngineError::Persistence(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| EngineError::Persistence(format!("parse {}: {e}", path.display())))
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> EngineResult<()> {
        let path = self.file(key);
        let content = serde_json::to_string_pretty(items)
            .map_err(|e| EngineError::Persistence(format!("encode {key}: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| EngineError::Persistence(format!("write {}: {e}", path.display())))
    }
}

impl Persistence for JsonFileStore {
    fn load_habits(&self) -> EngineResult<Vec<Habit>> {
        self.load(HABITS_KEY)
    }

    fn save_habits(&self, habits: &[Habit]) -> EngineResult<()> {
        self.save(HABITS_KEY, habits)
    }

    fn load_achievements(&self) -> EngineResult<Vec<Achievement>> {
        self.load(ACHIEVEMENTS_KEY)
    }

    fn save_achievements(&self, achievements: &[Achievement]) -> EngineResult<()> {
        self.save(ACHIEVEMENTS_KEY, achievements)
    }

    fn load_challenges(&self) -> EngineResult<Vec<Challenge>> {
        self.load(CHALLENGES_KEY)
    }

    fn save_challenges(&self, challenges: &[Challenge]) -> EngineResult<()> {
        self.save(CHALLENGES_KEY, challenges)
    }

    fn load_moods(&self) -> EngineResult<Vec<MoodEntry>> {
        self.load(MOODS_KEY)
    }

    fn save_moods(&self, moods: &[MoodEntry]) -> EngineResult<()> {
        self.save(MOODS_KEY, moods)
    }

    fn load_templates(&self) -> EngineResult<Vec<HabitTemplate>> {
        self.load(TEMPLATES_KEY)
    }

    fn save_templates(&self, templates: &[HabitTemplate]) -> EngineResult<()> {
        self.save(TEMPLATES_KEY, templates)
    }
}

/// In-memory store keyed by the same namespaces; serializes through JSON so
/// round-trip behavior matches the file store.
#[derive(Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn load<T: DeserializeOwned>(&self, key: &'static str) -> EngineResult<Vec<T>> {
        match self.slots.borrow().get(key) {
            None => Ok(Vec::new()),
            Some(content) => serde_json::from_str(content)
                .map_err(|e| EngineError::Persistence(format!("parse {key}: {e}"))),
        }
    }

    fn save<T: Serialize>(&self, key: &'static str, items: &[T]) -> EngineResult<()> {
        let content = serde_json::to_string(items)
            .map_err(|e| EngineError::Persistence(format!("encode {key}: {e}")))?;
        self.slots.borrow_mut().insert(key, content);
        Ok(())
    }
}

impl Persistence for MemoryStore {
    fn load_habits(&self) -> EngineResult<Vec<Habit>> {
        self.load(HABITS_KEY)
    }

    fn save_habits(&self, habits: &[Habit]) -> EngineResult<()> {
        self.save(HABITS_KEY, habits)
    }

    fn load_achievements(&self) -> EngineResult<Vec<Achievement>> {
        self.load(ACHIEVEMENTS_KEY)
    }

    fn save_achievements(&self, achievements: &[Achievement]) -> EngineResult<()> {
        self.save(ACHIEVEMENTS_KEY, achievements)
    }

    fn load_challenges(&self) -> EngineResult<Vec<Challenge>> {
        self.load(CHALLENGES_KEY)
    }

    fn save_challenges(&self, challenges: &[Challenge]) -> EngineResult<()> {
        self.save(CHALLENGES_KEY, challenges)
    }

    fn load_moods(&self) -> EngineResult<Vec<MoodEntry>> {
        self.load(MOODS_KEY)
    }

    fn save_moods(&self, moods: &[MoodEntry]) -> EngineResult<()> {
        self.save(MOODS_KEY, moods)
    }

    fn load_templates(&self) -> EngineResult<Vec<HabitTemplate>> {
        self.load(TEMPLATES_KEY)
    }

    fn save_templates(&self, templates: &[HabitTemplate]) -> EngineResult<()> {
        self.save(TEMPLATES_KEY, templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::{Category, Difficulty, LogEntry};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn sample_habit(name: &str) -> Habit {
        let mut logs = BTreeMap::new();
        logs.insert(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            LogEntry::Completed,
        );
        logs.insert(
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            LogEntry::Skipped,
        );
        let mut notes = BTreeMap::new();
        // A note may exist on a date with no log entry.
        notes.insert(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            "felt great".to_string(),
        );
        Habit {
            id: Uuid::new_v4(),
            name: name.into(),
            emoji: "🏃".into(),
            color: "#22c55e".into(),
            category: Category::Fitness,
            difficulty: Difficulty::Hard,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap(),
            logs,
            notes,
            is_archived: false,
        }
    }

    #[test]
    fn file_store_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.load_habits().unwrap().is_empty());
        assert!(store.load_achievements().unwrap().is_empty());
        assert!(store.load_templates().unwrap().is_empty());
    }

    #[test]
    fn file_store_round_trips_habits_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let habits = vec![sample_habit("Run"), sample_habit("Read"), sample_habit("Write")];
        store.save_habits(&habits).unwrap();

        let loaded = store.load_habits().unwrap();
        let names: Vec<&str> = loaded.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Run", "Read", "Write"]);

        // Tri-state logs and log-less notes survive the round trip.
        let run = &loaded[0];
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let d5 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(run.logs.get(&d1), Some(&LogEntry::Completed));
        assert_eq!(run.logs.get(&d2), Some(&LogEntry::Skipped));
        assert!(!run.logs.contains_key(&d5));
        assert_eq!(run.notes.get(&d5).map(String::as_str), Some("felt great"));
        assert_eq!(run.created_at, habits[0].created_at);
    }

    #[test]
    fn memory_store_round_trips_moods() {
        let store = MemoryStore::new();
        let moods = vec![MoodEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            mood: 4,
            note: Some("good day".into()),
        }];
        store.save_moods(&moods).unwrap();
        assert_eq!(store.load_moods().unwrap(), moods);
    }
}
