//! Page command - load one page of a dataset and print it.

use std::path::PathBuf;

use catloader::local::SharedActiveDataset;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{load_local_dataset, print_view, RequestArgs};
use crate::error::CliError;
use crate::runner::{CliRunner, RemoteArgs};

/// Arguments for the page command.
pub struct PageArgs {
    pub dataset: String,
    pub request: RequestArgs,
    pub local: Option<PathBuf>,
    pub stats: bool,
    pub json: bool,
}

/// Run the page command.
pub async fn run(runner: &CliRunner, remote: &RemoteArgs, args: PageArgs) -> Result<(), CliError> {
    runner.log_startup("page");

    let active = SharedActiveDataset::new();
    if let Some(path) = &args.local {
        let dataset = load_local_dataset(path, &args.dataset)?;
        info!(
            dataset = %dataset.id,
            rows = dataset.records.len(),
            "Serving dataset from local file"
        );
        active.set(dataset);
    }

    let service = runner.create_service(remote, active)?;
    let request = args.request.to_request()?;

    let view = service
        .load_view(&args.dataset, &request, &CancellationToken::new())
        .await?;
    print_view(&view, args.json)?;

    if args.stats {
        eprintln!();
        eprintln!("{}", service.stats().format());
    }

    Ok(())
}
