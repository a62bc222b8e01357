use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use habitkit::config::Config;
use habitkit::models::{Achievement, Category, CreateHabit, Difficulty, UpdateHabit};
use habitkit::{Engine, EngineResult, JsonFileStore};

#[derive(Parser)]
#[command(name = "habitkit", version, about = "Habit tracking from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a habit
    Add {
        name: String,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Update a habit's descriptive fields
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Hard-delete a habit
    Remove { id: Uuid },
    /// Archive a habit (kept in storage, excluded from stats)
    Archive { id: Uuid },
    /// Bring an archived habit back
    Unarchive { id: Uuid },
    /// Cycle a date's log: unrecorded -> completed -> skipped -> unrecorded
    Toggle {
        id: Uuid,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Attach a note to a date (empty text removes it)
    Note {
        id: Uuid,
        text: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Streak and completion statistics for a habit
    Stats {
        id: Uuid,
        /// Reference date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Completed-vs-active overview for one day
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Unlocked achievements
    Achievements,
    /// Dismiss a fresh-unlock notification
    Dismiss { id: String },
    /// Challenge management
    Challenge {
        #[command(subcommand)]
        action: ChallengeAction,
    },
    /// Record today's mood (1-5)
    Mood {
        value: i32,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Habit template management
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum ChallengeAction {
    /// Start (or restart) a challenge
    Start { id: String, title: String },
    /// Mark a challenge completed
    Complete { id: String },
    /// List challenges
    List,
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Save a reusable habit preset
    Add {
        name: String,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// List templates
    List,
    /// Create a habit from a template
    Use { id: Uuid },
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitkit=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> EngineResult<()> {
    let config = Config::from_env();
    let store = JsonFileStore::open(&config.data_dir)?;
    let mut engine = Engine::open(store)?;

    match cli.command {
        Commands::Add {
            name,
            emoji,
            color,
            category,
            difficulty,
        } => {
            let applied = engine.create_habit(CreateHabit {
                name,
                emoji,
                color,
                category,
                difficulty,
            })?;
            println!("{} {} ({})", applied.value.emoji, applied.value.name, applied.value.id);
            report_unlocked(&applied.unlocked);
        }
        Commands::List { all } => {
            for habit in engine.habits().iter().filter(|h| all || !h.is_archived) {
                let stats = engine.habit_stats(habit.id)?;
                let flag = if habit.is_archived { " [archived]" } else { "" };
                println!(
                    "{} {}  streak {}  best {}  rate {:.0}%  ({}){}",
                    habit.emoji,
                    habit.name,
                    stats.current_streak,
                    stats.longest_streak,
                    stats.completion_rate,
                    habit.id,
                    flag
                );
            }
        }
        Commands::Update {
            id,
            name,
            emoji,
            color,
            category,
            difficulty,
        } => {
            let applied = engine.update_habit(
                id,
                UpdateHabit {
                    name,
                    emoji,
                    color,
                    category,
                    difficulty,
                    is_archived: None,
                },
            )?;
            println!("updated {}", applied.value.name);
            report_unlocked(&applied.unlocked);
        }
        Commands::Remove { id } => {
            engine.delete_habit(id)?;
            println!("deleted {id}");
        }
        Commands::Archive { id } => {
            let applied = engine.set_archived(id, true)?;
            println!("archived {}", applied.value.name);
        }
        Commands::Unarchive { id } => {
            let applied = engine.set_archived(id, false)?;
            println!("unarchived {}", applied.value.name);
        }
        Commands::Toggle { id, date } => {
            let date = date.unwrap_or_else(today);
            let applied = engine.toggle_log(id, date)?;
            println!("{date}: {:?}", applied.value);
            report_unlocked(&applied.unlocked);
        }
        Commands::Note { id, text, date } => {
            let date = date.unwrap_or_else(today);
            engine.set_note(id, date, &text)?;
            println!("note saved for {date}");
        }
        Commands::Stats { id, date } => {
            let stats = match date {
                Some(d) => engine.habit_stats_at(id, d)?,
                None => engine.habit_stats(id)?,
            };
            let habit = engine.habit(id)?;
            println!("{} {}", habit.emoji, habit.name);
            println!("  current streak : {}", stats.current_streak);
            println!("  longest streak : {}", stats.longest_streak);
            println!("  completion rate: {:.1}%", stats.completion_rate);
            println!("  missed days    : {}", stats.missed_days);
        }
        Commands::Summary { date } => {
            let summary = match date {
                Some(d) => engine.daily_summary(d),
                None => engine.daily_summary_today(),
            };
            println!(
                "{}: {}/{} habits completed ({:.0}%)",
                summary.date, summary.completed_habits, summary.total_habits, summary.completion_rate
            );
        }
        Commands::Achievements => {
            for a in engine.achievements() {
                println!(
                    "{} {} — {} (unlocked {})",
                    a.badge,
                    a.title,
                    a.description,
                    a.completed_date.date_naive()
                );
            }
        }
        Commands::Dismiss { id } => {
            engine.dismiss_achievement(&id);
        }
        Commands::Challenge { action } => match action {
            ChallengeAction::Start { id, title } => {
                let applied = engine.start_challenge(&id, &title)?;
                println!("started: {}", applied.value.title);
            }
            ChallengeAction::Complete { id } => {
                let applied = engine.complete_challenge(&id)?;
                println!("completed: {}", applied.value.title);
            }
            ChallengeAction::List => {
                for c in engine.challenges() {
                    let state = if c.is_active { "active" } else { "done" };
                    println!("[{state}] {} ({})", c.title, c.id);
                }
            }
        },
        Commands::Mood { value, date, note } => {
            let date = date.unwrap_or_else(today);
            let applied = engine.set_mood(date, value, note)?;
            println!("{}: mood {}", applied.value.date, applied.value.mood);
        }
        Commands::Template { action } => match action {
            TemplateAction::Add {
                name,
                emoji,
                color,
                category,
                difficulty,
            } => {
                let applied = engine.create_template(CreateHabit {
                    name,
                    emoji,
                    color,
                    category,
                    difficulty,
                })?;
                println!("template saved ({})", applied.value.id);
            }
            TemplateAction::List => {
                for t in engine.templates() {
                    println!("{} {} [{}] ({})", t.emoji, t.name, t.category, t.id);
                }
            }
            TemplateAction::Use { id } => {
                let applied = engine.create_habit_from_template(id)?;
                println!("{} {} ({})", applied.value.emoji, applied.value.name, applied.value.id);
                report_unlocked(&applied.unlocked);
            }
        },
    }

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn report_unlocked(unlocked: &[Achievement]) {
    for a in unlocked {
        println!("🎉 unlocked: {} {} — {}", a.badge, a.title, a.description);
    }
}
