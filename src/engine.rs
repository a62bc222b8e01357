//! Mutation coordinator: the single entry point through which every change
//! to the habit collections flows.
//!
//! Each mutation runs the same sequence — validate, apply to a copy of the
//! collection, persist, evaluate achievements, persist any new unlocks —
//! synchronously and in full before the call returns, so derived state never
//! goes stale relative to the logs. A failed save leaves the in-memory state
//! exactly as it was before the call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::achievements;
use crate::clock::{Clock, IdSource, SystemClock, UuidSource};
use crate::error::{EngineError, EngineResult};
use crate::models::habit::{CreateHabit, Habit, LogStatus, UpdateHabit};
use crate::models::{Achievement, Challenge, HabitTemplate, MoodEntry};
use crate::stats::{self, DailySummary, StreakStats};
use crate::store::Persistence;

/// Result of one mutation: the changed value plus the achievements that
/// mutation freshly unlocked (distinct from the full persisted set).
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub value: T,
    pub unlocked: Vec<Achievement>,
}

pub struct Engine<S: Persistence> {
    store: S,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
    habits: Vec<Habit>,
    achievements: Vec<Achievement>,
    /// Unlocks not yet dismissed by the caller. Shares entries with the
    /// persisted set but has its own lifetime; dismissal never touches the
    /// persisted set.
    fresh: Vec<Achievement>,
    challenges: Vec<Challenge>,
    moods: BTreeMap<NaiveDate, MoodEntry>,
    templates: Vec<HabitTemplate>,
}

impl<S: Persistence> Engine<S> {
    /// Open an engine over `store` with the system clock and random ids.
    pub fn open(store: S) -> EngineResult<Self> {
        Self::with_collaborators(store, Box::new(SystemClock), Box::new(UuidSource))
    }

    /// Open with injected clock/id collaborators (deterministic tests).
    pub fn with_collaborators(
        store: S,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdSource>,
    ) -> EngineResult<Self> {
        let habits = store.load_habits()?;
        let achievements = store.load_achievements()?;
        let challenges = store.load_challenges()?;
        let moods = store
            .load_moods()?
            .into_iter()
            .map(|m| (m.date, m))
            .collect();
        let templates = store.load_templates()?;

        tracing::debug!(
            habits = habits.len(),
            achievements = achievements.len(),
            "engine loaded"
        );

        Ok(Self {
            store,
            clock,
            ids,
            habits,
            achievements,
            fresh: Vec::new(),
            challenges,
            moods,
            templates,
        })
    }

    // ------------------------------------------------------------------
    // Habit mutations
    // ------------------------------------------------------------------

    pub fn create_habit(&mut self, req: CreateHabit) -> EngineResult<Applied<Habit>> {
        req.validate()?;

        let habit = Habit {
            id: self.ids.next_id(),
            name: req.name,
            emoji: req.emoji.unwrap_or_else(|| "🎯".into()),
            color: req.color.unwrap_or_else(|| "#6366f1".into()),
            category: req.category.unwrap_or_default(),
            difficulty: req.difficulty.unwrap_or_default(),
            created_at: self.clock.now(),
            logs: BTreeMap::new(),
            notes: BTreeMap::new(),
            is_archived: false,
        };

        let mut next = self.habits.clone();
        next.push(habit.clone());
        let unlocked = self.commit_habits(next)?;

        tracing::info!(habit_id = %habit.id, name = %habit.name, "habit created");
        Ok(Applied {
            value: habit,
            unlocked,
        })
    }

    /// Create a habit from a stored template, copying its descriptive
    /// fields. The habit gets a fresh id, timestamp, and empty logs.
    pub fn create_habit_from_template(&mut self, template_id: Uuid) -> EngineResult<Applied<Habit>> {
        let template = self
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| EngineError::NotFound("Template not found".into()))?
            .clone();

        self.create_habit(CreateHabit {
            name: template.name,
            emoji: Some(template.emoji),
            color: Some(template.color),
            category: Some(template.category),
            difficulty: Some(template.difficulty),
        })
    }

    /// Partial update: `None` fields keep their current value.
    pub fn update_habit(&mut self, id: Uuid, req: UpdateHabit) -> EngineResult<Applied<Habit>> {
        req.validate()?;
        let idx = self.habit_index(id)?;

        let mut next = self.habits.clone();
        {
            let habit = &mut next[idx];
            if let Some(name) = req.name {
                habit.name = name;
            }
            if let Some(emoji) = req.emoji {
                habit.emoji = emoji;
            }
            if let Some(color) = req.color {
                habit.color = color;
            }
            if let Some(category) = req.category {
                habit.category = category;
            }
            if let Some(difficulty) = req.difficulty {
                habit.difficulty = difficulty;
            }
            if let Some(is_archived) = req.is_archived {
                habit.is_archived = is_archived;
            }
        }
        let updated = next[idx].clone();
        let unlocked = self.commit_habits(next)?;

        tracing::info!(habit_id = %id, "habit updated");
        Ok(Applied {
            value: updated,
            unlocked,
        })
    }

    /// Archive or unarchive without touching logs. Archived habits stay in
    /// storage but drop out of streak and achievement consideration.
    pub fn set_archived(&mut self, id: Uuid, archived: bool) -> EngineResult<Applied<Habit>> {
        self.update_habit(
            id,
            UpdateHabit {
                is_archived: Some(archived),
                ..UpdateHabit::default()
            },
        )
    }

    /// Hard delete. Removes the habit from all later derived statistics;
    /// already-unlocked achievements are not revoked.
    pub fn delete_habit(&mut self, id: Uuid) -> EngineResult<Applied<()>> {
        self.habit_index(id)?;

        let mut next = self.habits.clone();
        next.retain(|h| h.id != id);
        let unlocked = self.commit_habits(next)?;

        tracing::info!(habit_id = %id, "habit deleted");
        Ok(Applied {
            value: (),
            unlocked,
        })
    }

    /// Cycle the log for exactly one (habit, date) pair:
    /// unrecorded → completed → skipped → unrecorded.
    pub fn toggle_log(&mut self, id: Uuid, date: NaiveDate) -> EngineResult<Applied<LogStatus>> {
        let idx = self.habit_index(id)?;

        let status = self.habits[idx].log_status(date).toggled();
        let mut next = self.habits.clone();
        match status.as_entry() {
            Some(entry) => {
                next[idx].logs.insert(date, entry);
            }
            None => {
                next[idx].logs.remove(&date);
            }
        }
        let unlocked = self.commit_habits(next)?;

        tracing::info!(habit_id = %id, %date, ?status, "log toggled");
        Ok(Applied {
            value: status,
            unlocked,
        })
    }

    /// Attach a free-text note to a date. Empty or whitespace text removes
    /// the note instead.
    pub fn set_note(&mut self, id: Uuid, date: NaiveDate, text: &str) -> EngineResult<Applied<()>> {
        let idx = self.habit_index(id)?;

        let mut next = self.habits.clone();
        if text.trim().is_empty() {
            next[idx].notes.remove(&date);
        } else {
            next[idx].notes.insert(date, text.to_string());
        }
        let unlocked = self.commit_habits(next)?;

        Ok(Applied {
            value: (),
            unlocked,
        })
    }

    // ------------------------------------------------------------------
    // Challenge / mood / template mutations
    // ------------------------------------------------------------------

    /// Mark a challenge active, inserting it if not yet known.
    pub fn start_challenge(&mut self, id: &str, title: &str) -> EngineResult<Applied<Challenge>> {
        if id.trim().is_empty() {
            return Err(EngineError::Validation("Challenge id is required".into()));
        }

        let mut next = self.challenges.clone();
        let challenge = match next.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.is_active = true;
                existing.clone()
            }
            None => {
                let challenge = Challenge {
                    id: id.to_string(),
                    title: title.to_string(),
                    is_active: true,
                };
                next.push(challenge.clone());
                challenge
            }
        };

        self.store.save_challenges(&next)?;
        self.challenges = next;
        let unlocked = self.run_unlocks()?;

        tracing::info!(challenge_id = %id, "challenge started");
        Ok(Applied {
            value: challenge,
            unlocked,
        })
    }

    pub fn complete_challenge(&mut self, id: &str) -> EngineResult<Applied<Challenge>> {
        let mut next = self.challenges.clone();
        let challenge = next
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound("Challenge not found".into()))?;
        challenge.is_active = false;
        let challenge = challenge.clone();

        self.store.save_challenges(&next)?;
        self.challenges = next;
        let unlocked = self.run_unlocks()?;

        tracing::info!(challenge_id = %id, "challenge completed");
        Ok(Applied {
            value: challenge,
            unlocked,
        })
    }

    /// Upsert the mood for a date; one entry per date, last write wins.
    pub fn set_mood(
        &mut self,
        date: NaiveDate,
        mood: i32,
        note: Option<String>,
    ) -> EngineResult<Applied<MoodEntry>> {
        if !(1..=5).contains(&mood) {
            return Err(EngineError::Validation("Mood must be between 1 and 5".into()));
        }

        let entry = MoodEntry { date, mood, note };
        let mut next = self.moods.clone();
        next.insert(date, entry.clone());

        let flat: Vec<MoodEntry> = next.values().cloned().collect();
        self.store.save_moods(&flat)?;
        self.moods = next;
        let unlocked = self.run_unlocks()?;

        Ok(Applied {
            value: entry,
            unlocked,
        })
    }

    /// Store a reusable habit preset.
    pub fn create_template(&mut self, req: CreateHabit) -> EngineResult<Applied<HabitTemplate>> {
        req.validate()?;

        let template = HabitTemplate {
            id: self.ids.next_id(),
            name: req.name,
            emoji: req.emoji.unwrap_or_else(|| "🎯".into()),
            color: req.color.unwrap_or_else(|| "#6366f1".into()),
            category: req.category.unwrap_or_default(),
            difficulty: req.difficulty.unwrap_or_default(),
        };

        let mut next = self.templates.clone();
        next.push(template.clone());
        self.store.save_templates(&next)?;
        self.templates = next;
        let unlocked = self.run_unlocks()?;

        Ok(Applied {
            value: template,
            unlocked,
        })
    }

    /// Drop an achievement from the fresh-unlock notification list. The
    /// persisted unlocked set is never touched; dismissing an id that is
    /// not pending is a no-op.
    pub fn dismiss_achievement(&mut self, id: &str) {
        self.fresh.retain(|a| a.id != id);
    }

    // ------------------------------------------------------------------
    // Queries (served from memory, no persistence traffic)
    // ------------------------------------------------------------------

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: Uuid) -> EngineResult<&Habit> {
        self.habits
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| EngineError::NotFound("Habit not found".into()))
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn freshly_unlocked(&self) -> &[Achievement] {
        &self.fresh
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn moods(&self) -> impl Iterator<Item = &MoodEntry> {
        self.moods.values()
    }

    pub fn templates(&self) -> &[HabitTemplate] {
        &self.templates
    }

    /// Streak statistics as of the clock's "today".
    pub fn habit_stats(&self, id: Uuid) -> EngineResult<StreakStats> {
        self.habit_stats_at(id, self.clock.today())
    }

    pub fn habit_stats_at(&self, id: Uuid, reference: NaiveDate) -> EngineResult<StreakStats> {
        Ok(stats::streak_stats(self.habit(id)?, reference))
    }

    pub fn daily_summary(&self, date: NaiveDate) -> DailySummary {
        stats::daily_summary(&self.habits, date)
    }

    pub fn daily_summary_today(&self) -> DailySummary {
        self.daily_summary(self.clock.today())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn habit_index(&self, id: Uuid) -> EngineResult<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| EngineError::NotFound("Habit not found".into()))
    }

    /// Persist a new habit collection and run achievement evaluation.
    /// `self.habits` is only replaced after the save succeeds, so a
    /// persistence failure leaves state at the last persisted snapshot.
    fn commit_habits(&mut self, next: Vec<Habit>) -> EngineResult<Vec<Achievement>> {
        self.store.save_habits(&next)?;
        self.habits = next;
        self.run_unlocks()
    }

    /// Evaluate the catalog against current state immediately after a
    /// persisted mutation, merge and persist any new unlocks, and queue
    /// them for one-time notification.
    fn run_unlocks(&mut self) -> EngineResult<Vec<Achievement>> {
        let new = achievements::evaluate(
            &self.habits,
            &self.achievements,
            self.clock.today(),
            self.clock.now(),
        );
        if new.is_empty() {
            return Ok(new);
        }

        let mut merged = self.achievements.clone();
        merged.extend(new.iter().cloned());
        self.store.save_achievements(&merged)?;
        self.achievements = merged;
        self.fresh.extend(new.iter().cloned());

        tracing::info!(count = new.len(), "achievements unlocked");
        Ok(new)
    }
}
