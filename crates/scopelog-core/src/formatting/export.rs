//! Export of record collections to text files

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::{extract, LogFormatter};
use crate::domain::LogModel;

/// Render `records` and write them to `path`, one line per record.
///
/// Missing parent directories are created. The formatter's header, if any,
/// is written first. The file is replaced as a whole; nothing is written if
/// any step before the final write fails.
pub fn export<M: LogModel>(
    records: &[M],
    path: impl AsRef<Path>,
    formatter: &dyn LogFormatter,
) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory: {:?}", parent))?;
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    if let Some(header) = formatter.header().filter(|h| !h.is_empty()) {
        lines.push(header.to_string());
    }
    lines.extend(records.iter().map(|record| formatter.format(&extract(record))));

    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    debug!("Exported {} records to {:?}", records.len(), path);
    Ok(())
}
