//! Achievement catalog and evaluation.
//!
//! The catalog is a fixed, ordered table of (id, predicate) rules over the
//! aggregate habit state. Evaluation is pure: it returns only achievements
//! whose condition newly holds, in catalog order, and never re-awards an id
//! already present in the unlocked set.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::models::achievement::Achievement;
use crate::models::habit::{Habit, LogEntry};
use crate::stats::streak_stats;

/// Aggregate view the rule predicates run against. Archived habits are
/// filtered out before any predicate sees them.
pub struct EvalContext<'a> {
    active: Vec<&'a Habit>,
    today: NaiveDate,
}

impl<'a> EvalContext<'a> {
    fn new(habits: &'a [Habit], today: NaiveDate) -> Self {
        Self {
            active: habits.iter().filter(|h| !h.is_archived).collect(),
            today,
        }
    }

    fn habit_count(&self) -> usize {
        self.active.len()
    }

    fn total_completions(&self) -> u32 {
        self.active.iter().map(|h| h.total_completions()).sum()
    }

    fn max_current_streak(&self) -> u32 {
        self.active
            .iter()
            .map(|h| streak_stats(h, self.today).current_streak)
            .max()
            .unwrap_or(0)
    }

    /// True when some habit is completed on every one of the last 7 days
    /// (today inclusive).
    fn has_perfect_week(&self) -> bool {
        self.active.iter().any(|h| {
            (0..7).all(|back| {
                self.today
                    .checked_sub_days(Days::new(back))
                    .map(|d| h.logs.get(&d) == Some(&LogEntry::Completed))
                    .unwrap_or(false)
            })
        })
    }
}

struct Rule {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    badge: &'static str,
    unlocked: fn(&EvalContext) -> bool,
}

const CATALOG: &[Rule] = &[
    Rule {
        id: "first-habit",
        title: "First Steps",
        description: "Create your first habit",
        badge: "🌱",
        unlocked: |ctx| ctx.habit_count() >= 1,
    },
    Rule {
        id: "first-completion",
        title: "Day One",
        description: "Complete a habit for the first time",
        badge: "✅",
        unlocked: |ctx| ctx.total_completions() >= 1,
    },
    Rule {
        id: "week-streak",
        title: "One Week Strong",
        description: "Reach a 7-day streak on any habit",
        badge: "🔥",
        unlocked: |ctx| ctx.max_current_streak() >= 7,
    },
    Rule {
        id: "fortnight-streak",
        title: "Two Week Titan",
        description: "Reach a 14-day streak on any habit",
        badge: "⚡",
        unlocked: |ctx| ctx.max_current_streak() >= 14,
    },
    Rule {
        id: "month-streak",
        title: "Monthly Master",
        description: "Reach a 30-day streak on any habit",
        badge: "🏆",
        unlocked: |ctx| ctx.max_current_streak() >= 30,
    },
    Rule {
        id: "quarter-streak",
        title: "Quarter Champion",
        description: "Reach a 90-day streak on any habit",
        badge: "💎",
        unlocked: |ctx| ctx.max_current_streak() >= 90,
    },
    Rule {
        id: "fifty-completions",
        title: "Fifty Club",
        description: "Log 50 total completions",
        badge: "🎯",
        unlocked: |ctx| ctx.total_completions() >= 50,
    },
    Rule {
        id: "century-completions",
        title: "Century",
        description: "Log 100 total completions",
        badge: "💯",
        unlocked: |ctx| ctx.total_completions() >= 100,
    },
    Rule {
        id: "double-century",
        title: "Double Century",
        description: "Log 200 total completions",
        badge: "🚀",
        unlocked: |ctx| ctx.total_completions() >= 200,
    },
    Rule {
        id: "habit-collector",
        title: "Habit Collector",
        description: "Track 5 habits at once",
        badge: "📋",
        unlocked: |ctx| ctx.habit_count() >= 5,
    },
    Rule {
        id: "perfect-week",
        title: "Perfect Week",
        description: "Complete a habit every day for the last 7 days",
        badge: "🌟",
        unlocked: |ctx| ctx.has_perfect_week(),
    },
];

/// Evaluate the catalog against the current habit set. Returns the newly
/// qualifying achievements in catalog declaration order; ids already in
/// `already_unlocked` are never returned again.
pub fn evaluate(
    habits: &[Habit],
    already_unlocked: &[Achievement],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let ctx = EvalContext::new(habits, today);

    CATALOG
        .iter()
        .filter(|rule| !already_unlocked.iter().any(|a| a.id == rule.id))
        .filter(|rule| (rule.unlocked)(&ctx))
        .map(|rule| Achievement {
            id: rule.id.to_string(),
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            badge: rule.badge.to_string(),
            completed_date: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::{Category, Difficulty};
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn habit(name: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: name.into(),
            emoji: "🎯".into(),
            color: "#6366f1".into(),
            category: Category::default(),
            difficulty: Difficulty::default(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            logs: BTreeMap::new(),
            notes: BTreeMap::new(),
            is_archived: false,
        }
    }

    fn complete_range(h: &mut Habit, from: NaiveDate, days: u64) {
        for back in 0..days {
            h.logs
                .insert(from + Days::new(back), LogEntry::Completed);
        }
    }

    #[test]
    fn empty_state_unlocks_nothing() {
        let unlocked = evaluate(&[], &[], date(2024, 6, 1), now());
        assert!(unlocked.is_empty());
    }

    #[test]
    fn first_habit_unlocks_on_creation() {
        let habits = vec![habit("Read")];
        let unlocked = evaluate(&habits, &[], date(2024, 6, 1), now());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first-habit");
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut h = habit("Read");
        complete_range(&mut h, date(2024, 5, 25), 8);
        let habits = vec![h];

        let first = evaluate(&habits, &[], date(2024, 6, 1), now());
        assert!(!first.is_empty());

        let second = evaluate(&habits, &first, date(2024, 6, 1), now());
        assert!(second.is_empty());
    }

    #[test]
    fn returned_order_follows_catalog_not_discovery() {
        let mut h = habit("Read");
        // 14-day streak qualifies week-streak AND fortnight-streak plus the
        // creation/completion rules; order must match catalog declaration.
        complete_range(&mut h, date(2024, 5, 19), 14);
        let habits = vec![h];

        let ids: Vec<String> = evaluate(&habits, &[], date(2024, 6, 1), now())
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "first-habit",
                "first-completion",
                "week-streak",
                "fortnight-streak",
                "perfect-week",
            ]
        );
    }

    #[test]
    fn archived_habits_do_not_contribute() {
        let mut h = habit("Read");
        complete_range(&mut h, date(2024, 5, 3), 30);
        h.is_archived = true;
        let habits = vec![h];

        let unlocked = evaluate(&habits, &[], date(2024, 6, 1), now());
        assert!(unlocked.is_empty());
    }

    #[test]
    fn total_completions_unlock_without_a_long_streak() {
        // 200 completions spread thin: every other day across several habits
        // so no individual streak comes near 30.
        let mut habits = Vec::new();
        for i in 0..4 {
            let mut h = habit(&format!("Habit {i}"));
            let mut d = date(2024, 1, 1);
            for _ in 0..50 {
                h.logs.insert(d, LogEntry::Completed);
                d = d + Days::new(2);
            }
            habits.push(h);
        }

        let ids: Vec<String> = evaluate(&habits, &[], date(2024, 6, 1), now())
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert!(ids.contains(&"double-century".to_string()));
        assert!(!ids.contains(&"month-streak".to_string()));
    }

    #[test]
    fn perfect_week_requires_all_seven_days() {
        let mut h = habit("Read");
        complete_range(&mut h, date(2024, 5, 27), 6);
        let almost = evaluate(&[h.clone()], &[], date(2024, 6, 1), now());
        assert!(!almost.iter().any(|a| a.id == "perfect-week"));

        h.logs.insert(date(2024, 5, 26), LogEntry::Completed);
        let full = evaluate(&[h], &[], date(2024, 6, 1), now());
        assert!(full.iter().any(|a| a.id == "perfect-week"));
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, rule) in CATALOG.iter().enumerate() {
            assert!(
                !CATALOG[i + 1..].iter().any(|r| r.id == rule.id),
                "duplicate catalog id {}",
                rule.id
            );
        }
    }
}
