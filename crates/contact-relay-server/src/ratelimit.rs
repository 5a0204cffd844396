//! Per-actor rate-limit ledger store, file-backed and file-locked.
//!
//! One JSON file per actor under a temp-scoped directory, named by the
//! SHA-1 of the actor key so arbitrary addresses map to safe filenames.
//! The prune-check-append sequence runs under an exclusive `fs2` lock so
//! concurrent requests from the same actor cannot both observe "under
//! limit" and both pass.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use contact_relay_core::error::{Error, Result};
use contact_relay_core::ledger::Ledger;
use fs2::FileExt;
use sha1::{Digest, Sha1};

pub struct FileLedgerStore {
    dir: PathBuf,
}

impl FileLedgerStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Atomically prune, check, and append for one actor.
    ///
    /// Returns `Err(RateLimited)` when the actor already has `max` in-window
    /// entries; otherwise the attempt is appended and persisted. The append
    /// happens at check time (attempts count, not only successes), so a
    /// burst of failing requests cannot probe the window for free.
    pub fn check_and_record(&self, actor: &str, max: u32, window_secs: u64, now: i64) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.ledger_path(actor);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;

        let result = Self::locked_update(&mut file, max, window_secs, now);

        // Release even when the update failed; the lock also dies with the
        // descriptor, this just makes the order explicit.
        let _ = FileExt::unlock(&file);
        result
    }

    fn locked_update(file: &mut fs::File, max: u32, window_secs: u64, now: i64) -> Result<()> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        // A corrupt or empty ledger file resets the window rather than
        // blocking the actor forever.
        let mut ledger: Ledger = serde_json::from_str(&contents).unwrap_or_default();

        ledger.prune(window_secs, now);
        if !ledger.allow(max) {
            return Err(Error::RateLimited);
        }
        ledger.record(now);

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serde_json::to_string(&ledger)?.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Read-only view of an actor's pruned ledger (diagnostics, tests).
    pub fn snapshot(&self, actor: &str, window_secs: u64, now: i64) -> Result<Ledger> {
        let path = self.ledger_path(actor);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Ledger::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ledger: Ledger = serde_json::from_str(&contents).unwrap_or_default();
        ledger.prune(window_secs, now);
        Ok(ledger)
    }

    fn ledger_path(&self, actor: &str) -> PathBuf {
        let mut hasher = Sha1::new();
        hasher.update(actor.as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.dir.join(format!("{digest}.json"))
    }
}

/// Remove ledger files untouched for longer than `max_age_secs`.
///
/// The store is temp-directory scoped, so this is housekeeping rather than
/// correctness: pruning already ignores stale entries on read.
pub fn sweep_stale_ledgers(dir: &Path, max_age_secs: u64) -> Result<usize> {
    let mut removed = 0;
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let age = modified.elapsed().unwrap_or_default();
        if age.as_secs() > max_age_secs {
            let _ = fs::remove_file(entry.path());
            removed += 1;
        }
    }
    Ok(removed)
}
