//! Append-only submission audit log.
//!
//! JSON-lines, one record per audited attempt. Appends take an exclusive
//! `fs2` lock so concurrent writers cannot interleave partial lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use contact_relay_core::error::Result;
use contact_relay_core::models::AuditRecord;
use fs2::FileExt;

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one record as a single JSON line.
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let result = (&file).write_all(line.as_bytes()).and_then(|()| (&file).flush());
        let _ = FileExt::unlock(&file);
        result?;
        Ok(())
    }

    /// Read back all records (tests, operator tooling). Lines that fail to
    /// parse are skipped rather than aborting the read.
    pub fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
