use anyhow::{bail, Result};
use tracing::info;

use crate::cli::IngestArgs;
use crate::dataset::ingest::ingest;

pub fn cmd_ingest(args: IngestArgs) -> Result<()> {
    if !args.root.is_dir() {
        bail!("{} is not a directory", args.root.display());
    }

    let written = ingest(&args.root, &args.output, &args.prefix)?;
    let total: usize = written.iter().map(|(_, count)| count).sum();
    info!(categories = written.len(), articles = total, "ingest finished");
    Ok(())
}
