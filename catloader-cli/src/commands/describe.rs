//! Describe command - show a dataset's columns and size.

use crate::error::CliError;
use crate::runner::{CliRunner, RemoteArgs};
use catloader::local::SharedActiveDataset;

/// Run the describe command.
pub async fn run(
    runner: &CliRunner,
    remote: &RemoteArgs,
    dataset: &str,
    json: bool,
) -> Result<(), CliError> {
    runner.log_startup("describe");
    let service = runner.create_service(remote, SharedActiveDataset::new())?;

    let entry = service.ensure_loaded(dataset).await?;

    if json {
        let out = serde_json::to_string_pretty(&entry.descriptor)
            .map_err(|e| CliError::Input(format!("failed to encode descriptor: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    println!("Dataset: {}", catloader::dataset::normalize(dataset));
    println!("  Rows:    {}", entry.total_rows);
    println!("  Columns: {}", entry.total_columns);
    println!();

    if entry.descriptor.columns.is_empty() {
        // Server sent no column metadata; names come from the first rows
        for name in &entry.columns {
            println!("  {}", name);
        }
        return Ok(());
    }

    for column in &entry.descriptor.columns {
        match &column.unit {
            Some(unit) => println!("  {:<24} {:<10} [{}]", column.name, column.dtype, unit),
            None => println!("  {:<24} {}", column.name, column.dtype),
        }
    }

    Ok(())
}
