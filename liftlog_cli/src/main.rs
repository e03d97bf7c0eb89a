use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a workout session (interactive)
    Start {
        /// Workout template id to seed the session from
        #[arg(long)]
        template: Option<String>,

        /// Session name for free sessions
        #[arg(long)]
        name: Option<String>,

        /// Run a scripted session (for testing) - one completed bench set
        #[arg(long)]
        auto: bool,
    },

    /// Show the statistics dashboard
    Stats,

    /// List workout history, optionally filtered or pruned
    History {
        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Delete a record by id
        #[arg(long)]
        delete: Option<uuid::Uuid>,
    },

    /// Show achievements and total points
    Achievements,

    /// List catalog workout and exercise templates
    Templates,

    /// Export history to CSV
    Export {
        /// Output path (defaults to <data-dir>/workouts.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    match cli.command {
        Some(Commands::Start {
            template,
            name,
            auto,
        }) => cmd_start(config, template, name, auto),
        Some(Commands::Stats) => cmd_stats(config),
        Some(Commands::History { from, to, delete }) => cmd_history(config, from, to, delete),
        Some(Commands::Achievements) => cmd_achievements(config),
        Some(Commands::Templates) => cmd_templates(),
        Some(Commands::Export { output }) => cmd_export(config, output),
        None => cmd_stats(config),
    }
}

fn cmd_start(
    config: Config,
    template: Option<String>,
    name: Option<String>,
    auto: bool,
) -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let mut engine = WorkoutEngine::open(config)?;
    let signals = engine.subscribe_session_signals();
    let mut timer = RestTimer::new(engine.default_rest_seconds());

    match template.as_deref() {
        Some(id) => {
            let Some(workout) = catalog.workout(id) else {
                eprintln!("Unknown workout template: {}", id);
                eprintln!("Run `liftlog templates` to list available templates.");
                return Ok(());
            };
            engine.session_manager().start_from_template(workout, catalog);
        }
        None => {
            let session_name = name.unwrap_or_else(|| "Workout".to_string());
            engine.session_manager().start_free(&session_name);
        }
    }

    if auto {
        return run_scripted_session(&mut engine, catalog);
    }

    run_interactive_session(&mut engine, catalog, &mut timer, signals)
}

/// Scripted session used by integration tests: one completed bench set
fn run_scripted_session(engine: &mut WorkoutEngine, catalog: &Catalog) -> Result<()> {
    let manager = engine.session_manager();
    if let Some(bench) = catalog.exercise("bench_press") {
        manager.add_exercise(bench);
    }
    manager.add_set("bench_press");
    if let Some(set_id) = manager
        .active()
        .and_then(|s| s.exercises.first())
        .and_then(|e| e.sets.first())
        .map(|s| s.id)
    {
        manager.update_set("bench_press", set_id, SetField::Weight, "100");
        manager.update_set("bench_press", set_id, SetField::Reps, "5");
        manager.complete_set("bench_press", set_id);
    }

    match engine.finish_active(600)? {
        Some(outcome) => print_finish_outcome(&outcome),
        None => println!("No active session to finish."),
    }
    Ok(())
}

fn run_interactive_session(
    engine: &mut WorkoutEngine,
    catalog: &Catalog,
    timer: &mut RestTimer,
    signals: std::sync::mpsc::Receiver<SessionSignal>,
) -> Result<()> {
    println!("\nSession started. Type 'h' for help.\n");
    let mut last_instant = Instant::now();

    loop {
        // Forward completion signals to the timer; a new one replaces the
        // running countdown
        for signal in signals.try_iter() {
            match signal {
                SessionSignal::SetCompleted { .. } => timer.on_set_completed(),
            }
        }

        // Advance the countdown by elapsed wall seconds
        let elapsed = last_instant.elapsed().as_secs();
        if elapsed > 0 {
            last_instant = Instant::now();
            for _ in 0..elapsed {
                if let Some(TimerEvent::Expired) = timer.tick() {
                    println!("\x07  Rest over - back to work!");
                }
            }
        }

        if let Some(session) = engine.active_session() {
            display_session(session, timer);
        }

        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF: treat like cancel
            engine.cancel_session();
            println!("Session cancelled.");
            return Ok(());
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["h"] | ["help"] => print_session_help(),
            ["a", exercise_id] => match catalog.exercise(exercise_id) {
                Some(template) => engine.session_manager().add_exercise(template),
                None => println!("Unknown exercise: {}", exercise_id),
            },
            ["s", index] => {
                if let Some(id) = exercise_id_at(engine, index) {
                    engine.session_manager().add_set(&id);
                }
            }
            ["w", index, set_number, value] => {
                if let Some((id, set_id)) = set_at(engine, index, set_number) {
                    engine
                        .session_manager()
                        .update_set(&id, set_id, SetField::Weight, value);
                }
            }
            ["r", index, set_number, value] => {
                if let Some((id, set_id)) = set_at(engine, index, set_number) {
                    engine
                        .session_manager()
                        .update_set(&id, set_id, SetField::Reps, value);
                }
            }
            ["c", index, set_number] => {
                if let Some((id, set_id)) = set_at(engine, index, set_number) {
                    match engine.session_manager().complete_set(&id, set_id) {
                        Some(SetAction::Completed) => println!("Set completed."),
                        Some(SetAction::Deleted) => println!("Completed set removed."),
                        None => {}
                    }
                }
            }
            ["d", index, set_number] => {
                if let Some((id, set_id)) = set_at(engine, index, set_number) {
                    engine.session_manager().delete_set(&id, set_id);
                }
            }
            ["g", index] => {
                if let Some(session) = engine.active_session() {
                    let name = parse_index(index)
                        .and_then(|i| session.exercises.get(i))
                        .map(|e| e.name.clone());
                    match name.as_deref().and_then(|n| engine.previous_performance(n)) {
                        Some(ghost) => {
                            println!("Last time:");
                            for set in &ghost.sets {
                                println!(
                                    "  #{}  {} x {}",
                                    set.set_number, set.weight, set.reps
                                );
                            }
                        }
                        None => println!("No previous performance found."),
                    }
                }
            }
            ["tp"] => timer.toggle_pause(),
            ["tr"] => timer.reset(),
            ["ts"] => timer.skip(),
            ["t+"] => timer.adjust(ADJUST_STEP_SECONDS),
            ["t-"] => timer.adjust(-ADJUST_STEP_SECONDS),
            ["f"] | ["finish"] => {
                let elapsed_seconds = engine
                    .active_session()
                    .map(|s| (Utc::now() - s.started_at).num_seconds().max(0) as u32)
                    .unwrap_or(0);
                timer.cancel();
                match engine.finish_active(elapsed_seconds)? {
                    Some(outcome) => print_finish_outcome(&outcome),
                    None => println!("No active session to finish."),
                }
                return Ok(());
            }
            ["q"] | ["quit"] => {
                timer.cancel();
                engine.cancel_session();
                println!("Session cancelled - nothing recorded.");
                return Ok(());
            }
            [] => {}
            _ => println!("Unrecognized command. Type 'h' for help."),
        }
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn exercise_id_at(engine: &WorkoutEngine, index: &str) -> Option<String> {
    let session = engine.active_session()?;
    let exercise = session.exercises.get(parse_index(index)?)?;
    Some(exercise.id.clone())
}

fn set_at(engine: &WorkoutEngine, index: &str, set_number: &str) -> Option<(String, uuid::Uuid)> {
    let session = engine.active_session()?;
    let exercise = session.exercises.get(parse_index(index)?)?;
    let set = exercise.sets.get(parse_index(set_number)?)?;
    Some((exercise.id.clone(), set.id))
}

fn display_session(session: &ActiveSession, timer: &RestTimer) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", session.name);
    println!("╰─────────────────────────────────────────╯");

    for (i, exercise) in session.exercises.iter().enumerate() {
        println!("  {}. {}", i + 1, exercise.name);
        if !exercise.expanded {
            continue;
        }
        for (j, set) in exercise.sets.iter().enumerate() {
            let mark = if set.completed { "✓" } else { " " };
            println!(
                "     [{}] set {}  {} x {}",
                mark,
                j + 1,
                if set.weight.is_empty() { "-" } else { set.weight.as_str() },
                if set.reps.is_empty() { "-" } else { set.reps.as_str() },
            );
        }
    }

    match timer.state() {
        TimerState::Running => println!("  ⏱ rest: {}s", timer.remaining_seconds()),
        TimerState::Paused => println!("  ⏱ rest: {}s (paused)", timer.remaining_seconds()),
        _ => {}
    }
    println!();
}

fn print_session_help() {
    println!("  a <exercise_id>      add exercise from the catalog");
    println!("  s <ex>               add a set");
    println!("  w <ex> <set> <val>   set weight");
    println!("  r <ex> <set> <val>   set reps");
    println!("  c <ex> <set>         complete set (again: remove it)");
    println!("  d <ex> <set>         delete set");
    println!("  g <ex>               show previous performance");
    println!("  tp/tr/ts/t+/t-       rest timer: pause, reset, skip, adjust");
    println!("  f                    finish session");
    println!("  q                    cancel session");
}

fn print_finish_outcome(outcome: &FinishOutcome) {
    let record = &outcome.record;
    println!("\n✓ Workout saved!");
    println!("  {}", record.date_label);
    println!("  Duration: {}s", record.duration_seconds);
    println!("  Volume: {}", record.total_volume);
    println!("  Sets: {}  Reps: {}", record.total_sets, record.total_reps);

    for achievement in &outcome.newly_unlocked {
        println!("  ★ Achievement unlocked: {}", achievement.name);
    }
}

fn cmd_stats(config: Config) -> Result<()> {
    let engine = WorkoutEngine::open(config)?;
    let stats = engine.stats();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  STATISTICS");
    println!("╰─────────────────────────────────────────╯");
    println!("  Total workouts:    {}", stats.total_workouts);
    println!("  This week:         {}", stats.this_week_workouts);
    println!("  This month:        {}", stats.this_month_workouts);
    println!("  Total volume:      {}", stats.total_volume);
    println!("  Avg duration:      {}s", stats.average_duration_seconds);
    println!("  Current streak:    {} days", stats.current_streak_days);

    if let Some(ref favorite) = stats.favorite_exercise {
        println!("  Favorite exercise: {}", favorite);
    }

    if !stats.personal_records.is_empty() {
        println!("\n  Personal records:");
        let mut records: Vec<_> = stats.personal_records.iter().collect();
        records.sort_by(|a, b| a.0.cmp(b.0));
        for (exercise_id, pr) in records {
            println!(
                "    {}  {} x {}  ({})",
                exercise_id,
                pr.weight,
                pr.reps,
                pr.date.with_timezone(&Local).format("%b %-d, %Y")
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_history(
    config: Config,
    from: Option<String>,
    to: Option<String>,
    delete: Option<uuid::Uuid>,
) -> Result<()> {
    let mut engine = WorkoutEngine::open(config)?;

    if let Some(id) = delete {
        if engine.delete_record(id)? {
            println!("✓ Deleted record {}", id);
        } else {
            println!("No record with id {}", id);
        }
        return Ok(());
    }

    let start = match from {
        Some(raw) => parse_date_arg(&raw, false)?,
        None => DateTime::<Utc>::MIN_UTC,
    };
    let end = match to {
        Some(raw) => parse_date_arg(&raw, true)?,
        None => DateTime::<Utc>::MAX_UTC,
    };

    let records = engine.query_by_date_range(start, end);
    if records.is_empty() {
        println!("No workouts recorded.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  volume={}  sets={}  duration={}s",
            record.id, record.date_label, record.total_volume, record.total_sets,
            record.duration_seconds
        );
    }
    Ok(())
}

/// Parse a YYYY-MM-DD argument as a local-day boundary
fn parse_date_arg(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = raw
        .parse::<NaiveDate>()
        .map_err(|e| Error::Other(format!("Invalid date '{}': {}", raw, e)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    date.and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::Other(format!("Ambiguous local time for '{}'", raw)))
}

fn cmd_achievements(config: Config) -> Result<()> {
    let engine = WorkoutEngine::open(config)?;
    let book = engine.achievements();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ACHIEVEMENTS  ({} points)", book.total_points);
    println!("╰─────────────────────────────────────────╯");

    for achievement in &book.achievements {
        let mark = if achievement.unlocked { "★" } else { "·" };
        let when = achievement
            .unlocked_at
            .map(|t| {
                format!(
                    "  unlocked {}",
                    t.with_timezone(&Local).format("%b %-d, %Y")
                )
            })
            .unwrap_or_default();
        println!("  {} {}{}", mark, achievement.name, when);
    }
    println!();
    Ok(())
}

fn cmd_templates() -> Result<()> {
    let catalog = get_default_catalog();

    println!("\nWorkout templates:");
    let mut workouts: Vec<_> = catalog.workouts.values().collect();
    workouts.sort_by(|a, b| a.id.cmp(&b.id));
    for workout in workouts {
        println!("  {}  ({})", workout.id, workout.name);
        for exercise_id in &workout.exercises {
            if let Some(exercise) = catalog.exercise(exercise_id) {
                println!("    - {}", exercise.name);
            }
        }
    }

    println!("\nExercises:");
    let mut exercises: Vec<_> = catalog.exercises.values().collect();
    exercises.sort_by(|a, b| a.id.cmp(&b.id));
    for exercise in exercises {
        println!("  {}  ({})", exercise.id, exercise.name);
    }
    println!();
    Ok(())
}

fn cmd_export(config: Config, output: Option<PathBuf>) -> Result<()> {
    let csv_path = output.unwrap_or_else(|| config.data.data_dir.join("workouts.csv"));
    let engine = WorkoutEngine::open(config)?;

    let count = engine.export_csv(&csv_path)?;
    println!("✓ Exported {} workouts to CSV", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}
