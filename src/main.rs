// Dayplan
// Command-line entry point

use chrono::{Datelike, Local};
use tokio::sync::mpsc;

use dayplan::config::Config;
use dayplan::models::task::sort_agenda;
use dayplan::services::api::{HttpStore, PlannerStore};
use dayplan::services::calendar::CalendarAggregator;
use dayplan::services::notification::NotificationService;
use dayplan::services::reminder::{
    AlertPermission, PermissionProbe, ReminderScheduler, SchedulerCommand,
};

/// Desktop environments surface no permission prompt for the notification
/// protocol; being able to reach the session bus is the grant.
struct DesktopProbe;

impl PermissionProbe for DesktopProbe {
    fn current(&self) -> AlertPermission {
        AlertPermission::Granted
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("Starting Dayplan");

    let config = Config::load()?;
    let store = HttpStore::new(config.api_base_url.as_str())?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "agenda".to_string());
    match command.as_str() {
        "agenda" => print_agenda(&store).await?,
        "month" => print_month(&store).await?,
        "watch" => watch(&store, &config).await?,
        other => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: dayplan [agenda|month|watch]");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn print_agenda(store: &HttpStore) -> anyhow::Result<()> {
    let lists = store.fetch_tasks().await?;

    let mut active = lists.today_active;
    sort_agenda(&mut active);

    println!("Today ({})", Local::now().date_naive());
    for task in &active {
        let time = task
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        println!("  {time}  {}", task.title);
    }
    if !lists.today_completed.is_empty() {
        println!("Completed: {}", lists.today_completed.len());
    }

    match store.fetch_stats().await {
        Ok(stats) => println!(
            "{}/{} done ({:.0}%)",
            stats.completed_tasks, stats.total_tasks, stats.completion_rate
        ),
        Err(err) => log::warn!("stats unavailable: {err}"),
    }
    Ok(())
}

async fn print_month(store: &HttpStore) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let lists = store.fetch_tasks().await?;

    let aggregator = CalendarAggregator::new();
    let view = aggregator
        .load_month_via(store, today.year(), today.month(), &lists.templates)
        .await
        .ok_or_else(|| anyhow::anyhow!("month load was invalidated"))?;

    for (day, occurrences) in &view {
        if occurrences.is_empty() {
            continue;
        }
        println!("{day}");
        for occurrence in occurrences {
            let marker = if occurrence.is_virtual() { "~" } else { " " };
            println!("  {marker} {}", occurrence.title());
        }
    }
    Ok(())
}

async fn watch(store: &HttpStore, config: &Config) -> anyhow::Result<()> {
    let mut scheduler = ReminderScheduler::new(config.reminder_lead_minutes)
        .with_poll_period(std::time::Duration::from_secs(config.poll_interval_secs));
    scheduler.initialize(&DesktopProbe)?;

    let sink = NotificationService::new();
    let (control, control_rx) = mpsc::channel::<SchedulerCommand>(8);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = control.send(SchedulerCommand::Stop).await;
        }
    });

    log::info!(
        "watching for reminders ({} minute lead)",
        config.reminder_lead_minutes
    );
    let final_state = scheduler.run(store, &sink, control_rx).await?;
    log::info!("reminder scheduler exited in state {final_state:?}");
    Ok(())
}
