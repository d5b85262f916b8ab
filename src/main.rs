use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use questkeeper::AppState;
use questkeeper::clock::{SystemClock, format_countdown};
use questkeeper::config::AppConfig;
use questkeeper::database::PgStore;
use questkeeper::identity::StaticIdentity;
use questkeeper::mastery::Frequency;
use questkeeper::services::SessionView;
use questkeeper::services::cache::FileCache;

#[derive(Parser)]
#[command(name = "questkeeper", about = "Track quests, streaks and mastery")]
struct Cli {
    /// Quest to operate on.
    #[arg(long, global = true)]
    quest: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the quest and print its progress.
    Status,
    /// Flip a task's completion.
    Toggle { task: Uuid },
    /// Submit today's completion.
    Submit,
    /// Add a task to the quest.
    AddTask { name: String },
    /// Create a new quest.
    NewQuest {
        name: String,
        #[arg(long, default_value = "Daily")]
        frequency: String,
    },
    /// Show the account-wide mastery track.
    Profile,
    /// Show the time left today.
    Countdown {
        #[arg(long, default_value_t = 5)]
        ticks: u32,
    },
}

fn print_view(view: &SessionView) {
    let Some(quest) = &view.quest else {
        println!("(cached) {} tasks", view.tasks.len());
        return;
    };
    println!("{} ({})", quest.name, quest.frequency);
    println!(
        "Streak: {} day{} | Mastery Level: {} | XP: {} / {}",
        quest.streak,
        if quest.streak == 1 { "" } else { "s" },
        quest.mastery.level,
        quest.mastery.xp,
        quest.mastery.threshold()
    );
    if let Some(due) = quest.due_date {
        println!("Due: {due}");
    }
    if let Some(failed) = quest.failed_at {
        println!("Last failed: {failed}");
    }
    println!("Progress: {:.0}%", view.progress * 100.0);
    for task in &view.tasks {
        let mark = if task.completed { "x" } else { " " };
        println!("  [{mark}] {} ({})", task.name, task.id);
    }
    if view.submitted_today {
        println!("Submitted today.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration.")?;
    let store = PgStore::connect(&config.database_url)
        .await
        .context("Failed to connect to the database.")?;

    let app = AppState {
        store: Arc::new(store),
        cache: Arc::new(FileCache::new(config.cache_dir.clone())),
        clock: Arc::new(SystemClock),
        identity: Arc::new(StaticIdentity(config.user_id)),
        config: config.engine,
    };

    if let Command::NewQuest { name, frequency } = &cli.command {
        let quest = app
            .create_quest(name, Some(Frequency::parse(frequency)))
            .await?;
        println!("Created quest {} ({})", quest.name, quest.id);
        return Ok(());
    }

    if let Command::Profile = &cli.command {
        let mastery = app.account_mastery().await?;
        println!("Lv. {}", mastery.level);
        println!("XP: {} / {}", mastery.xp, mastery.threshold());
        println!("Progress: {:.0}%", mastery.progress() * 100.0);
        return Ok(());
    }

    let quest_id = cli.quest.context("--quest is required for this command")?;
    let mut session = app.session(quest_id)?;
    if let Err(e) = session.open().await {
        eprintln!("Could not refresh quest: {e}");
    }

    match cli.command {
        Command::Status => print_view(&session.view()),
        Command::Toggle { task } => {
            let done = session.toggle_task(task).await?;
            println!("Task {} {}", task, if done { "completed" } else { "reopened" });
            print_view(&session.view());
        }
        Command::Submit => {
            let report = session.submit_quest().await?;
            if report.missed {
                println!("Streak broken. Starting again at {}.", report.streak);
            } else {
                println!("Streak: {}", report.streak);
            }
            let m = report.quest_leveling.mastery;
            println!("Quest mastery: level {} ({} / {})", m.level, m.xp, m.threshold());
            match (report.account_leveling, report.account_error) {
                (Some(acc), _) => println!("Account: level {} ({} xp)", acc.mastery.level, acc.mastery.xp),
                (None, Some(err)) => eprintln!("Account XP not saved: {err}"),
                (None, None) => {}
            }
            println!("Next due: {}", report.due_date);
        }
        Command::AddTask { name } => {
            let task = session.add_task(&name).await?;
            println!("Added task {} ({})", task.name, task.id);
        }
        Command::Countdown { ticks } => {
            let mut rx = session.start_countdown();
            println!("Time left: {}", format_countdown(*rx.borrow()));
            for _ in 0..ticks {
                if rx.changed().await.is_err() {
                    break;
                }
                println!("Time left: {}", format_countdown(*rx.borrow()));
            }
            session.close();
        }
        Command::NewQuest { .. } | Command::Profile => {}
    }
    Ok(())
}
