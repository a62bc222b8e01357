pub mod achievement;
pub mod challenge;
pub mod habit;
pub mod mood;
pub mod template;

pub use achievement::Achievement;
pub use challenge::Challenge;
pub use habit::{Category, CreateHabit, Difficulty, Habit, LogEntry, LogStatus, UpdateHabit};
pub use mood::MoodEntry;
pub use template::HabitTemplate;
