//! Local text file source for monthly macro records.

use crate::domain::error::AnalyticsError;
use crate::domain::macro_data::{parse_records, MacroLoad};
use std::fs;
use std::path::Path;

/// Read and parse a `MMYY,actual,forecast` file. Malformed lines are logged
/// and skipped; a missing or unreadable file is an error.
pub fn load_macro_file<P: AsRef<Path>>(path: P) -> Result<MacroLoad, AnalyticsError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let load = parse_records(&text);

    for skipped in &load.skipped {
        tracing::warn!(
            file = %path.display(),
            line = skipped.line_number,
            "skipping macro record: {}",
            skipped.reason
        );
    }
    tracing::debug!(
        file = %path.display(),
        records = load.records.len(),
        skipped = load.skipped.len(),
        "loaded macro records"
    );

    Ok(load)
}
