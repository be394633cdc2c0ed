//! segment-runner: headless driver for the queue segmentation scheduler.
//!
//! Usage:
//!   segment-runner --seed 12345 --db shift.db --session 2026-10-15
//!   segment-runner --config scheduler.json --now 600
//!   segment-runner --ipc-mode            (JSON lines on stdin/stdout)

use anyhow::Result;
use segmenter_core::{
    clock::ShiftClock,
    command::OperatorCommand,
    config::SchedulerConfig,
    engine::SegmentationEngine,
    queue::QUEUES,
    store::ScheduleStore,
    time::format_minutes,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Serialize)]
struct AgentView {
    id:           String,
    nickname:     String,
    status:       String,
    productivity: u32,
    total:        u32,
    assignments:  serde_json::Value,
}

#[derive(serde::Serialize)]
struct UiState {
    session_id:      String,
    generation_runs: u64,
    slots:           Vec<String>,
    locked:          usize,
    results:         serde_json::Value,
    agents:          Vec<AgentView>,
    ending_soon:     Option<String>,
    below_quota:     Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", rand::random::<u64>());
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let config = match string_arg(&args, "--config") {
        Some(path) => SchedulerConfig::load(path)?,
        None => SchedulerConfig::default(),
    };
    // The scheduling day follows the shift clock, not the host's zone.
    let session_id = string_arg(&args, "--session")
        .map(str::to_string)
        .unwrap_or_else(|| ShiftClock::new(config.utc_offset_minutes).today());

    if !ipc_mode {
        println!("Queue segmentation: segment-runner");
        println!("  seed:      {seed}");
        println!("  db:        {db}");
        println!("  session:   {session_id}");
        println!();
    }

    let store = ScheduleStore::open(db)?;
    store.migrate()?;
    let mut engine = SegmentationEngine::resume(session_id, seed, config, store)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let now = parse_arg(&args, "--now", engine.clock.now_minutes());
        let report = engine.generate_at(now)?;
        if report.purged_breaks > 0 {
            println!("  purged {} expired break(s)", report.purged_breaks);
        }
        print_results(&engine);
        print_history(&engine);
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SegmentationEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        let line = buffer.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let reply = match serde_json::from_str::<OperatorCommand>(line) {
            Ok(command) => match engine.submit(command) {
                Ok(_) => serde_json::to_value(build_ui_state(engine)?)?,
                Err(e) => {
                    log::warn!("command rejected: {e}");
                    serde_json::json!({ "error": e.to_string() })
                }
            },
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SegmentationEngine) -> Result<UiState> {
    let session = &engine.session;
    let agents = session
        .roster
        .iter()
        .map(|a| -> Result<AgentView> {
            Ok(AgentView {
                id:           a.id.clone(),
                nickname:     a.nickname.clone(),
                status:       a.status.label().to_string(),
                productivity: a.productivity,
                total:        a.total(),
                assignments:  serde_json::to_value(a.assignments())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UiState {
        session_id:      engine.session_id.clone(),
        generation_runs: engine.generation_runs(),
        slots:           session.slots.labels().to_vec(),
        locked:          session.slots.locked_count(),
        results:         serde_json::to_value(session.ordered_results())?,
        agents,
        ending_soon:     engine.ending_soon().map(str::to_string),
        below_quota:     session
            .agents_below_quota()
            .iter()
            .map(|a| a.nickname.clone())
            .collect(),
    })
}

fn print_results(engine: &SegmentationEngine) {
    let session = &engine.session;
    println!("=== SEGMENTATION (run {}) ===", engine.generation_runs());
    for slot in session.slots.labels() {
        let Some(result) = session.result(slot) else {
            println!("  {slot:<15} (not generated)");
            continue;
        };
        if let Some(warning) = &result.warning {
            println!("  {slot:<15} WARNING: {warning}");
            continue;
        }
        let edited = if result.edited { " (edited)" } else { "" };
        println!("  {slot:<15} {} required{edited}", result.total_required);
        for queue in QUEUES {
            let names = result.names(queue);
            if !names.is_empty() {
                println!("    {:<8} {}", queue.label(), names.join(", "));
            }
        }
    }

    let mut on_break = Vec::new();
    for (agent_id, breaks) in session.breaks.iter() {
        for b in breaks {
            on_break.push(format!(
                "{} {} {}-{}",
                session.roster.display_name(agent_id),
                b.name,
                b.start,
                b.end
            ));
        }
    }
    if !on_break.is_empty() {
        println!();
        println!("=== BREAKS ===");
        for line in on_break {
            println!("  {line}");
        }
    }
}

fn print_history(engine: &SegmentationEngine) {
    let session = &engine.session;
    println!();
    println!("=== ASSIGNMENT HISTORY ===");
    let header: Vec<String> = QUEUES.iter().map(|q| format!("{:>8}", q.label())).collect();
    println!("  {:<14}{} {:>6}", "agent", header.join(""), "total");
    for agent in session.roster.present() {
        let counts: Vec<String> = QUEUES
            .iter()
            .map(|q| format!("{:>8}", agent.count(*q)))
            .collect();
        println!("  {:<14}{} {:>6}", agent.nickname, counts.join(""), agent.total());
    }

    let below = session.agents_below_quota();
    if !below.is_empty() {
        let names: Vec<&str> = below.iter().map(|a| a.nickname.as_str()).collect();
        println!();
        println!(
            "  below {}% productivity: {}",
            session.productivity_quota,
            names.join(", ")
        );
    }
    if let Some(slot) = engine.ending_soon() {
        println!("  {slot} ends soon (at {})", slot_end_label(slot));
    }
}

fn slot_end_label(slot: &str) -> String {
    segmenter_core::time::parse_slot_interval(slot)
        .map(|interval| format_minutes(interval.end))
        .unwrap_or_else(|| slot.to_string())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
