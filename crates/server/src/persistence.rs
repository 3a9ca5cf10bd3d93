//! Write-only dump of every remaining row to the configured persistent
//! file: no header, eight tab-separated columns per line, appended rather
//! than truncated. There is no load path.

use corelib::Cluster;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn dump_all(cluster: &Cluster, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
    let mut rows_written = 0;

    for (_, handle) in cluster.all_data_handles() {
        let data = handle.lock();
        for (key, value) in data.iter() {
            writeln!(file, "{}", value.to_persisted_line(key))?;
            rows_written += 1;
        }
    }

    info!(rows_written, path = %path.as_ref().display(), "persisted remaining rows");
    Ok(())
}
