use std::error::Error;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{self, FileKv, JsonStore};
use crate::model::{Bucket, Status, Task};
use crate::ops::reminder::ReminderScheduler;
use crate::ops::resolver;
use crate::ops::session::SessionTracker;
use crate::store::{ClientResolution, Store};
use crate::util::{Clock, Scheduler, SystemClock, TickScheduler};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    let config = io::read_config(&data_dir)?;

    let backend = JsonStore::open(&data_dir.join(&config.data.file))?;
    let mut store = Store::load(Box::new(backend))?;

    // Once per calendar day, on load: carry stale today-tasks over.
    let clock = SystemClock;
    let mut kv = FileKv::open(&data_dir.join("session.json"));
    let mut tracker = SessionTracker::new(&clock, &mut kv);
    if tracker.new_day() {
        store.sweep_carryover(clock.today())?;
        tracker.touch();
    }

    match cli.command {
        Commands::Add(args) => cmd_add(&mut store, args, json),
        Commands::List(args) => cmd_list(&store, args, json),
        Commands::Next(args) => cmd_next(&store, args, json),
        Commands::All => cmd_all(&store, json),
        Commands::Missed => cmd_missed(&store, json),
        Commands::Search(args) => cmd_search(&store, args, json),
        Commands::Done(args) => cmd_done(&mut store, args, json),
        Commands::Delete(args) => cmd_delete(&mut store, args),
        Commands::Today(args) => cmd_today(&mut store, args, json),
        Commands::Backlog(args) => cmd_backlog(&mut store, args, json),
        Commands::Remind(args) => cmd_remind(&mut store, args, json),
        Commands::Snooze(args) => cmd_snooze(&mut store, args, config.reminders.snooze_minutes, json),
        Commands::Sweep => cmd_sweep(&mut store, json),
        Commands::Watch(args) => cmd_watch(&store, config.reminders.poll_secs, args, json),
        Commands::Client(cmd) => match cmd {
            ClientCmd::Add(args) => cmd_client_add(&mut store, args, json),
            ClientCmd::List => cmd_client_list(&store, json),
            ClientCmd::Delete(args) => cmd_client_delete(&mut store, args),
        },
    }
}

/// The data directory: `-C` flag, then $NEXTUP_DIR, then the current dir.
fn resolve_data_dir(flag: Option<&str>) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(dir) = flag {
        let path = PathBuf::from(dir);
        if !path.is_dir() {
            return Err(format!("data dir does not exist: {}", dir).into());
        }
        return Ok(path);
    }
    if let Ok(dir) = std::env::var("NEXTUP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(std::env::current_dir()?)
}

fn client_name<'a>(store: &'a Store, task: &Task) -> Option<&'a str> {
    task.client_id
        .as_deref()
        .and_then(|id| store.client(id))
        .map(|c| c.name.as_str())
}

fn client_id_by_name(store: &Store, name: &str) -> Result<String, Box<dyn Error>> {
    store
        .client_by_name(name)
        .map(|c| c.id.clone())
        .ok_or_else(|| format!("unknown client: {}", name).into())
}

fn print_tasks(store: &Store, tasks: &[&Task], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let out = TaskListJson {
            tasks: tasks
                .iter()
                .map(|t| TaskJson::from_task(t, client_name(store, t)))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let lines: Vec<String> = tasks
            .iter()
            .map(|t| task_line(t, client_name(store, t)))
            .collect();
        print_task_list(&lines);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

fn cmd_add(store: &mut Store, args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let raw = args.text.join(" ");
    let clock = SystemClock;
    let (task, resolution) = store.add_task(
        &raw,
        clock.today(),
        args.client.as_deref(),
        args.create_clients,
    )?;

    if json {
        let out = TaskJson::from_task(&task, client_name(store, &task));
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if let ClientResolution::Created(id) = &resolution
        && let Some(client) = store.client(id)
    {
        println!("created client {} ({})", client.name, client.id);
    }
    println!("added {}", task_line(&task, client_name(store, &task)));
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(store: &Store, args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let client_id = match args.client.as_deref() {
        Some(name) => Some(client_id_by_name(store, name)?),
        None => None,
    };
    let bucket = match args.bucket.as_deref() {
        Some(name) => Some(
            Bucket::from_arg(name)
                .ok_or_else(|| format!("unknown bucket: {} (today, backlog, carryover)", name))?,
        ),
        None => None,
    };

    let tasks: Vec<&Task> = store
        .iter_tasks()
        .filter(|t| {
            let status_ok = if args.done {
                t.status == Status::Done
            } else {
                t.is_open()
            };
            let client_ok = client_id
                .as_deref()
                .is_none_or(|id| t.client_id.as_deref() == Some(id));
            let bucket_ok = bucket.is_none_or(|b| t.bucket == b);
            status_ok && client_ok && bucket_ok
        })
        .collect();

    print_tasks(store, &tasks, json)
}

fn cmd_next(store: &Store, args: NextArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let candidates: Vec<&Task> = match args.client.as_deref() {
        Some(name) => {
            let id = client_id_by_name(store, name)?;
            resolver::client_open_tasks(store.iter_tasks(), &id)
        }
        None => resolver::open_tasks(store.iter_tasks()),
    };
    let next = resolver::next_action(&candidates);

    if json {
        let out = NextActionJson {
            next: next.map(|t| TaskJson::from_task(t, client_name(store, t))),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    match next {
        Some(task) => println!("next: {}", task_line(task, client_name(store, task))),
        None => println!("nothing to do."),
    }
    Ok(())
}

fn cmd_all(store: &Store, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let tasks: Vec<&Task> = store.iter_tasks().collect();
        return print_tasks(store, &tasks, true);
    }
    for bucket in [Bucket::Today, Bucket::Carryover, Bucket::Backlog] {
        let group = resolver::bucket_tasks(store.iter_tasks(), bucket);
        if group.is_empty() {
            continue;
        }
        println!("{} ({})", bucket.label(), group.len());
        for task in group {
            println!("  {}", task_line(task, client_name(store, task)));
        }
    }
    let done: Vec<&Task> = store.iter_tasks().filter(|t| !t.is_open()).collect();
    if !done.is_empty() {
        println!("done ({})", done.len());
        for task in done {
            println!("  {}", task_line(task, client_name(store, task)));
        }
    }
    Ok(())
}

fn cmd_missed(store: &Store, json: bool) -> Result<(), Box<dyn Error>> {
    let missed = resolver::missed_tasks(store.iter_tasks());
    if json {
        return print_tasks(store, &missed, true);
    }
    if missed.is_empty() {
        println!("all caught up.");
        return Ok(());
    }
    println!(
        "👋 welcome back — {} missed task{}",
        missed.len(),
        if missed.len() == 1 { "" } else { "s" }
    );
    for task in missed {
        println!("  {}", task_line(task, client_name(store, task)));
    }
    Ok(())
}

fn cmd_search(store: &Store, args: SearchArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let hits = resolver::search_tasks(store.iter_tasks(), &args.query);
    print_tasks(store, &hits, json)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn report_mutation(
    store: &Store,
    result: Option<Task>,
    id: &str,
    verb: &str,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    match result {
        Some(task) => {
            if json {
                let out = TaskJson::from_task(&task, client_name(store, &task));
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{} {}", verb, task_line(&task, client_name(store, &task)));
            }
        }
        None => println!("no such task: {} (nothing to do)", id),
    }
    Ok(())
}

fn cmd_done(store: &mut Store, args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let result = store.toggle_task(&args.id, SystemClock.now())?;
    let verb = match &result {
        Some(t) if t.status == Status::Done => "done",
        _ => "reopened",
    };
    report_mutation(store, result, &args.id, verb, json)
}

fn cmd_delete(store: &mut Store, args: IdArg) -> Result<(), Box<dyn Error>> {
    if store.delete_task(&args.id)? {
        println!("deleted {}", args.id);
    } else {
        println!("no such task: {} (nothing to do)", args.id);
    }
    Ok(())
}

fn cmd_today(store: &mut Store, args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let result = store.reschedule_today(&args.id, SystemClock.today())?;
    report_mutation(store, result, &args.id, "moved to today:", json)
}

fn cmd_backlog(store: &mut Store, args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let result = store.move_to_backlog(&args.id)?;
    report_mutation(store, result, &args.id, "moved to backlog:", json)
}

fn cmd_remind(store: &mut Store, args: RemindArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let result = store.remind_task_in(&args.id, args.minutes, SystemClock.now())?;
    report_mutation(store, result, &args.id, "reminder set:", json)
}

fn cmd_snooze(
    store: &mut Store,
    args: SnoozeArgs,
    default_minutes: i64,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let minutes = args.minutes.unwrap_or(default_minutes);
    let result = store.snooze_task(&args.id, minutes, SystemClock.now())?;
    report_mutation(store, result, &args.id, "snoozed:", json)
}

fn cmd_sweep(store: &mut Store, json: bool) -> Result<(), Box<dyn Error>> {
    let moved = store.sweep_carryover(SystemClock.today())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&SweepJson { moved })?);
    } else if moved.is_empty() {
        println!("nothing to carry over.");
    } else {
        println!("carried over: {}", moved.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reminder watch loop
// ---------------------------------------------------------------------------

fn poll_reminders(store: &Store, scheduler: &mut ReminderScheduler, json: bool) {
    let tasks: Vec<&Task> = store.iter_tasks().collect();
    let Some(id) = scheduler.poll(&tasks, SystemClock.now()) else {
        return;
    };
    let Some(task) = store.task(&id) else {
        return;
    };
    if json {
        let out = TaskJson::from_task(task, client_name(store, task));
        if let Ok(line) = serde_json::to_string(&out) {
            println!("{}", line);
        }
    } else {
        println!(
            "🔔 {}  (nx done {} | nx snooze {} | ignore to dismiss)",
            task_line(task, client_name(store, task)),
            task.id,
            task.id
        );
    }
}

fn cmd_watch(store: &Store, poll_secs: u64, args: WatchArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut scheduler = ReminderScheduler::new();

    // one pass immediately on start
    poll_reminders(store, &mut scheduler, json);
    if args.once {
        return Ok(());
    }

    // ticks arrive over a channel so polling stays on this thread
    let (tx, rx) = mpsc::channel();
    let _handle = TickScheduler.schedule(
        Duration::from_secs(poll_secs),
        Box::new(move || {
            let _ = tx.send(());
        }),
    );
    while rx.recv().is_ok() {
        poll_reminders(store, &mut scheduler, json);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

fn cmd_client_add(store: &mut Store, args: ClientAddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let name = args.name.join(" ");
    let client = store.add_client(&name)?;
    if json {
        let out = ClientJson::from_client(&client, 0);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("added client {} ({})", client.name, client.id);
    }
    Ok(())
}

fn cmd_client_list(store: &Store, json: bool) -> Result<(), Box<dyn Error>> {
    let clients: Vec<ClientJson> = store
        .iter_clients()
        .map(|c| ClientJson::from_client(c, store.open_task_count(&c.id)))
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
        return Ok(());
    }
    if clients.is_empty() {
        println!("no clients yet.");
        return Ok(());
    }
    for c in clients {
        println!(
            "{} {}  ({})  {} open task{}",
            c.emoji,
            c.name,
            c.id,
            c.open_tasks,
            if c.open_tasks == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn cmd_client_delete(store: &mut Store, args: IdArg) -> Result<(), Box<dyn Error>> {
    if store.delete_client(&args.id)? {
        println!("deleted client {} and its tasks", args.id);
    } else {
        println!("no such client: {} (nothing to do)", args.id);
    }
    Ok(())
}
