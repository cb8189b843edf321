//! Daily verification reports: rendered markdown, one file per tick.

use std::path::PathBuf;

use crate::error::StoreError;
use crate::fsio::write_text_atomic;
use crate::layout::StateDir;

/// Write a rendered report as `<utc_date>_day<idx>_<change_id>.md` under
/// the reports directory. Returns the written path.
pub fn write_report(
    dirs: &StateDir,
    utc_date: &str,
    day_index: u32,
    change_id: &str,
    markdown: &str,
) -> Result<PathBuf, StoreError> {
    let name = format!("{}_day{}_{}.md", utc_date, day_index, change_id);
    let path = dirs.reports_dir().join(name);
    write_text_atomic(&path, markdown)?;
    Ok(path)
}
