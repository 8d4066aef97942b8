//! Browse command - interactive paging driven from stdin.
//!
//! Every line typed adjusts the current request and schedules a reload.
//! Rapid edits collapse into one load after the debounce delay; a load
//! still running when a newer one starts is cancelled and its result
//! dropped.

use std::io::BufRead;
use std::path::PathBuf;

use catloader::local::SharedActiveDataset;
use catloader::query::{PageRequest, SortOrder};
use catloader::reload::{ChannelNotifier, NotificationKind, ReloadScheduler};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::common::{load_local_dataset, parse_filter, print_view, RequestArgs};
use crate::error::CliError;
use crate::runner::{CliRunner, RemoteArgs};

const HELP: &str = "\
Commands:
  page N | next | prev     change page
  limit N                  rows per page
  search TEXT              free-text search (empty clears)
  sort COLUMN [desc]       sort by column (no column clears)
  filter COLUMN=JSON       add a filter predicate
  clear                    drop search, sort and filters
  reload                   load now, skipping the debounce
  stats                    cache statistics
  quit";

/// Arguments for the browse command.
pub struct BrowseArgs {
    pub dataset: String,
    pub request: RequestArgs,
    pub local: Option<PathBuf>,
    pub json: bool,
}

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Edit(PageRequest),
    Reload,
    Stats,
    Help,
    Quit,
}

/// Run the browse command.
pub async fn run(
    runner: &CliRunner,
    remote: &RemoteArgs,
    args: BrowseArgs,
) -> Result<(), CliError> {
    runner.log_startup("browse");

    let active = SharedActiveDataset::new();
    if let Some(path) = &args.local {
        active.set(load_local_dataset(path, &args.dataset)?);
    }

    let service = runner.create_service(remote, active)?;
    let (notifier, mut notifications) = ChannelNotifier::new();
    let scheduler = ReloadScheduler::new(
        service.clone(),
        notifier,
        runner.config().reload_config(),
    );
    let mut views = scheduler.subscribe();

    let mut request = args.request.to_request()?;
    let mut lines = spawn_stdin_reader();

    println!("{}", HELP);
    scheduler.reload_now(args.dataset.as_str(), request.clone());

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_input(&line, &request) {
                    Ok(Input::Edit(next)) => {
                        request = next;
                        scheduler.schedule(args.dataset.as_str(), request.clone());
                    }
                    Ok(Input::Reload) => {
                        scheduler.reload_now(args.dataset.as_str(), request.clone());
                    }
                    Ok(Input::Stats) => println!("{}", service.stats().format()),
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Quit) => break,
                    Err(e) => eprintln!("{}", e),
                }
            }

            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if let Some(view) = view {
                    print_view(&view, args.json)?;
                }
            }

            Some(notification) = notifications.recv() => {
                let prefix = match notification.kind {
                    NotificationKind::Error => "error",
                    NotificationKind::Warning => "warning",
                    NotificationKind::Info => "info",
                };
                eprintln!("[{}] {}", prefix, notification.message);
            }
        }
    }

    scheduler.shutdown();
    info!("Browse session ended");
    Ok(())
}

/// Read stdin lines on a plain thread; stdin has no async reader here.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}

/// Apply one line of input to the current request.
fn parse_input(line: &str, current: &PageRequest) -> Result<Input, CliError> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let mut next = current.clone();

    let parse_number = |what: &str| -> Result<u32, CliError> {
        rest.parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| CliError::Input(format!("{} needs a positive number", what)))
    };

    match command {
        "" | "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" | "q" => return Ok(Input::Quit),
        "reload" => return Ok(Input::Reload),
        "stats" => return Ok(Input::Stats),
        "page" => next.page = parse_number("page")?,
        "next" => next.page = current.page.saturating_add(1),
        "prev" => next.page = current.page.saturating_sub(1).max(1),
        "limit" => {
            next.limit = parse_number("limit")?;
            next.page = 1;
        }
        "search" => {
            next.search = (!rest.is_empty()).then(|| rest.to_string());
            next.page = 1;
        }
        "sort" => {
            let mut parts = rest.split_whitespace();
            match parts.next() {
                Some(column) => {
                    let order = match parts.next() {
                        Some(order) => order.parse::<SortOrder>().map_err(CliError::Input)?,
                        None => SortOrder::Asc,
                    };
                    next = next.with_sort(column, order);
                }
                None => {
                    next.sort_by = None;
                    next.sort_order = SortOrder::Asc;
                }
            }
            next.page = 1;
        }
        "filter" => {
            let (column, predicate) = parse_filter(rest)?;
            next = next.with_filter(column, predicate);
            next.page = 1;
        }
        "clear" => {
            next.search = None;
            next.sort_by = None;
            next.sort_order = SortOrder::Asc;
            next.filters = None;
            next.page = 1;
        }
        other => {
            return Err(CliError::Input(format!(
                "unknown command '{}' (type 'help')",
                other
            )))
        }
    }

    Ok(Input::Edit(next))
}
