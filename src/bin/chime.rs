use anyhow::{Context, Result, anyhow, bail};
use chime::config::Config;
use chime::context::{AppContext, StandardContext};
use chime::model::{Alarm, Countdown, RepeatDays, TimerState, format_hms, parse_command};
use chime::storage::AlarmStorage;
use chime::store::AlarmStore;
use chime::system::{AlarmMessage, spawn_alarm_actor};
use chime::transcript::join_iat_results;
use chrono::{Local, NaiveTime, TimeDelta, Timelike};
use notify_rust::Notification;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

const WATCH_RELOAD_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || matches!(args[0].as_str(), "--help" | "-h" | "help") {
        chime::cli::print_help("chime");
        return Ok(());
    }

    let mut root = None;
    if matches!(args[0].as_str(), "--root" | "-r") {
        if args.len() < 2 {
            bail!("--root requires a path");
        }
        root = Some(PathBuf::from(args[1].clone()));
        args.drain(..2);
    }

    let ctx = StandardContext::new(root);
    let config = Config::load_or_default(&ctx)?;
    init_logging(&config);

    let Some((command, rest)) = args.split_first() else {
        chime::cli::print_help("chime");
        return Ok(());
    };

    match command.as_str() {
        "parse" => cmd_parse(&config, &rest.join(" ")),
        "add" => cmd_add(&ctx, &config, &rest.join(" ")),
        "voice" => cmd_voice(&ctx, &config, rest.first().map(String::as_str)),
        "add-at" => cmd_add_at(&ctx, &config, rest),
        "list" => cmd_list(&ctx, &config),
        "next" => cmd_next(&ctx, &config),
        "enable" => cmd_set_enabled(&ctx, rest.first(), true),
        "disable" => cmd_set_enabled(&ctx, rest.first(), false),
        "remove" => cmd_remove(&ctx, rest.first()),
        "snooze" => cmd_snooze(&ctx, rest.first()),
        "timer" => cmd_timer(rest.first()).await,
        "watch" => cmd_watch(&ctx, &config).await,
        other => Err(anyhow!("Unknown command '{}'. See 'chime --help'.", other)),
    }
}

fn init_logging(config: &Config) {
    let level = env::var("CHIME_LOG")
        .ok()
        .and_then(|v| v.parse::<log::LevelFilter>().ok())
        .unwrap_or_else(|| config.log_filter());

    let log_config = ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Off)
        .set_time_level(log::LevelFilter::Debug)
        .build();

    // Fails only if a logger is already installed.
    let _ = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_store(ctx: &dyn AppContext) -> Result<AlarmStore> {
    Ok(AlarmStore::from_alarms(AlarmStorage::load(ctx)?))
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn describe(alarm: &Alarm, config: &Config) -> String {
    let label = if alarm.label.is_empty() {
        String::new()
    } else {
        format!("  {}", alarm.label)
    };
    format!(
        "{}  {}  {:<5}  {}{}",
        short_id(&alarm.id),
        alarm.time_string(),
        if alarm.enabled { "on" } else { "off" },
        alarm.repeat_days.describe_in(config.language),
        label
    )
}

fn apply_defaults(alarm: &mut Alarm, config: &Config) {
    alarm.vibrate = config.default_vibrate;
    alarm.snooze_minutes = config.default_snooze_minutes;
}

fn cmd_parse(config: &Config, text: &str) -> Result<()> {
    match parse_command(text) {
        Some(cmd) => {
            println!("time:   {:02}:{:02}", cmd.hour, cmd.minute);
            println!("repeat: {}", cmd.repeat_days.describe_in(config.language));
            println!("label:  {}", cmd.label);
        }
        None => println!("Not an alarm command."),
    }
    Ok(())
}

fn add_from_text(ctx: &dyn AppContext, config: &Config, text: &str) -> Result<()> {
    let cmd = parse_command(text).ok_or_else(|| anyhow!("Not an alarm command: '{}'", text))?;
    let mut alarm = Alarm::from_command(&cmd)?;
    apply_defaults(&mut alarm, config);

    let trigger = alarm.next_trigger(&Local::now());
    println!("{}", describe(&alarm, config));
    println!("Rings at {}", trigger.format("%Y-%m-%d %H:%M"));
    AlarmStorage::modify(ctx, |store| {
        store.add(alarm);
        Ok(())
    })
}

fn cmd_add(ctx: &dyn AppContext, config: &Config, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Usage: chime add <text>");
    }
    add_from_text(ctx, config, text)
}

fn cmd_voice(ctx: &dyn AppContext, config: &Config, source: Option<&str>) -> Result<()> {
    let source = source.ok_or_else(|| anyhow!("Usage: chime voice <result.json|->"))?;
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    let transcript = join_iat_results(raw.lines().filter(|l| !l.trim().is_empty()));
    log::info!("Transcript: {}", transcript);
    println!("Heard: {}", transcript);
    add_from_text(ctx, config, &transcript)
}

fn cmd_add_at(ctx: &dyn AppContext, config: &Config, rest: &[String]) -> Result<()> {
    let time_str = rest
        .first()
        .ok_or_else(|| anyhow!("Usage: chime add-at <HH:MM> [days] [label]"))?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", time_str))?;

    let mut alarm = Alarm::new(time.hour(), time.minute())?;
    apply_defaults(&mut alarm, config);

    let mut label_start = 1;
    if let Some(days) = rest.get(1).and_then(|d| RepeatDays::parse_cli(d)) {
        alarm.repeat_days = days;
        label_start = 2;
    }
    alarm.label = rest.get(label_start..).unwrap_or_default().join(" ");

    println!("{}", describe(&alarm, config));
    AlarmStorage::modify(ctx, |store| {
        store.add(alarm);
        Ok(())
    })
}

fn cmd_list(ctx: &dyn AppContext, config: &Config) -> Result<()> {
    let store = load_store(ctx)?;
    if store.is_empty() {
        println!("No alarms.");
    }
    for alarm in store.alarms() {
        println!("{}", describe(alarm, config));
    }
    Ok(())
}

fn cmd_next(ctx: &dyn AppContext, config: &Config) -> Result<()> {
    let store = load_store(ctx)?;
    let now = Local::now();
    match store.next_due(&now) {
        Some((alarm, trigger)) => {
            let wait = trigger.signed_duration_since(now);
            println!("{}", describe(alarm, config));
            println!(
                "Rings at {} (in {}h {:02}m)",
                trigger.format("%a %Y-%m-%d %H:%M"),
                wait.num_hours(),
                wait.num_minutes() % 60
            );
        }
        None => println!("No enabled alarms."),
    }
    Ok(())
}

fn require_id(id: Option<&String>) -> Result<&str> {
    id.map(String::as_str)
        .ok_or_else(|| anyhow!("Missing alarm id (see 'chime list')"))
}

fn cmd_set_enabled(ctx: &dyn AppContext, id: Option<&String>, enabled: bool) -> Result<()> {
    let prefix = require_id(id)?;
    let full_id = AlarmStorage::modify(ctx, |store| {
        let full_id = store.find_by_prefix(prefix)?.id.clone();
        store.set_enabled(&full_id, enabled);
        Ok(full_id)
    })?;
    println!("Alarm {} {}", short_id(&full_id), if enabled { "on" } else { "off" });
    Ok(())
}

fn cmd_remove(ctx: &dyn AppContext, id: Option<&String>) -> Result<()> {
    let prefix = require_id(id)?;
    let removed = AlarmStorage::modify(ctx, |store| {
        let full_id = store.find_by_prefix(prefix)?.id.clone();
        Ok(store.remove(&full_id))
    })?;
    if let Some(removed) = removed {
        println!("Removed alarm at {}", removed.time_string());
    }
    Ok(())
}

fn cmd_snooze(ctx: &dyn AppContext, id: Option<&String>) -> Result<()> {
    let prefix = require_id(id)?;
    let snoozed = AlarmStorage::modify(ctx, |store| {
        let alarm = store.find_by_prefix(prefix)?.snoozed(&Local::now());
        store.update(alarm.clone());
        Ok(alarm)
    })?;
    println!("Snoozed until {}", snoozed.time_string());
    Ok(())
}

async fn cmd_timer(duration: Option<&String>) -> Result<()> {
    let duration = duration.ok_or_else(|| anyhow!("Usage: chime timer <HH:MM:SS>"))?;
    let total = Countdown::parse_hms(duration).ok_or_else(|| anyhow!("Invalid duration '{}'", duration))?;
    let mut countdown = Countdown::from_duration(total);
    if !countdown.start(Instant::now()) {
        bail!("Timer duration must be greater than zero");
    }

    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                if countdown.tick(now) {
                    break;
                }
                eprint!(
                    "\r{}  {:>3}%",
                    format_hms(countdown.remaining(now)),
                    countdown.progress_percent(now)
                );
            }
            _ = tokio::signal::ctrl_c() => {
                countdown.pause(Instant::now());
                eprintln!();
                println!("Stopped with {} left", format_hms(countdown.remaining(Instant::now())));
                return Ok(());
            }
        }
    }

    debug_assert_eq!(countdown.state(), TimerState::Finished);
    eprintln!();
    println!("Time is up ({})", format_hms(countdown.total()));
    notify("Timer", &format!("{} elapsed", format_hms(countdown.total())));
    Ok(())
}

async fn cmd_watch(ctx: &dyn AppContext, config: &Config) -> Result<()> {
    let store = load_store(ctx)?;
    let mut last_modified = AlarmStorage::modified(ctx)?;
    let (ui_tx, mut ui_rx) = mpsc::channel(16);
    let grace = TimeDelta::minutes(i64::from(config.fire_grace_minutes));
    let actor = spawn_alarm_actor(ui_tx, grace);
    actor
        .send(store.alarms().to_vec())
        .await
        .map_err(|_| anyhow!("Alarm scheduler stopped unexpectedly"))?;

    match store.next_due(&Local::now()) {
        Some((alarm, trigger)) => println!(
            "Watching {} alarm(s). Next: {} at {}",
            store.len(),
            alarm.time_string(),
            trigger.format("%a %H:%M")
        ),
        None => println!("No enabled alarms. Waiting..."),
    }

    let mut reload = tokio::time::interval(WATCH_RELOAD_INTERVAL);
    loop {
        tokio::select! {
            msg = ui_rx.recv() => {
                let Some(msg) = msg else { break };
                if let AlarmMessage::Fire(alarm) = &msg {
                    let title = if alarm.label.is_empty() { "Alarm" } else { alarm.label.as_str() };
                    println!("⏰ {} {}", alarm.time_string(), title);
                    notify(title, &alarm.time_string());
                }
                if let Err(e) = AlarmStorage::modify(ctx, |store| Ok(store.record_fired(msg.alarm()))) {
                    log::error!("Failed to save alarms: {:#}", e);
                }
            }
            _ = reload.tick() => {
                let modified = match AlarmStorage::modified(ctx) {
                    Ok(m) => m,
                    Err(e) => {
                        log::warn!("Failed to check alarm file: {:#}", e);
                        continue;
                    }
                };
                if modified == last_modified {
                    continue;
                }
                match AlarmStorage::load(ctx) {
                    Ok(alarms) => {
                        log::info!("Alarm file changed, re-arming {} alarm(s)", alarms.len());
                        last_modified = modified;
                        if actor.send(alarms).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Failed to reload alarms: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn notify(summary: &str, body: &str) {
    let summary = summary.to_string();
    let body = body.to_string();
    std::thread::spawn(move || {
        if let Err(e) = Notification::new()
            .summary(&summary)
            .body(&body)
            .appname("Chime")
            .show()
        {
            log::warn!("Desktop notification failed: {}", e);
        }
    });
}
