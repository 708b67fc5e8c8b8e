use anyhow::Result;
use tracing::info;

use crate::cli::ExportArgs;
use crate::dataset::export::export_csv;

pub fn cmd_export(args: ExportArgs) -> Result<()> {
    let rows = export_csv(&args.input, &args.output)?;
    info!(rows, "CSV written to {}", args.output.display());
    Ok(())
}
