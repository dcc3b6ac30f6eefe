// 💾 Ledger Store - Durable record of who-owes-whom entries
// One CSV row per entry: debtor, creditor, cents, note, unix-seconds.
// Every append rewrites the whole file from the in-memory sequence, so the
// file on disk is always exactly the serialization of memory - recovery
// after a crash is just a reload.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::money::Money;
use crate::roster::{PartyId, Roster};

// ============================================================================
// DEBT ENTRY
// ============================================================================

/// One recorded transaction: `debtor` owes `creditor` `amount`.
///
/// Immutable once created; entries accumulate in insertion order, which is
/// also chronological order and file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtEntry {
    pub debtor: PartyId,
    pub creditor: PartyId,
    pub amount: Money,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl DebtEntry {
    /// Create an entry stamped with the current time.
    ///
    /// A party cannot owe themselves: `debtor == creditor` is rejected here,
    /// before anything reaches the ledger.
    pub fn new(
        debtor: PartyId,
        creditor: PartyId,
        amount: Money,
        note: String,
    ) -> Result<DebtEntry, LedgerError> {
        if debtor == creditor {
            return Err(LedgerError::SameParty);
        }
        let now = Utc::now();
        // Ledger rows carry unix seconds; keep the in-memory timestamp at
        // the same resolution so a reloaded ledger compares equal.
        let created_at = now.with_nanosecond(0).unwrap_or(now);
        Ok(DebtEntry {
            debtor,
            creditor,
            amount,
            note,
            created_at,
        })
    }
}

// ============================================================================
// LEDGER ERRORS
// ============================================================================

/// Entry-level failures a caller must tell apart from plain I/O errors.
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// A name that is not in the roster. Never resolved silently.
    UnknownParty { name: String },
    /// Debtor and creditor are the same party.
    SameParty,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::UnknownParty { name } => {
                write!(f, "unknown party {:?}: not in the roster", name)
            }
            LedgerError::SameParty => write!(f, "debtor and creditor are the same party"),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// FILE FORMAT
// ============================================================================

/// On-disk row shape. The `csv` crate handles quoting, so notes may contain
/// commas, quotes, and newlines without corrupting the file.
#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    debtor: String,
    creditor: String,
    cents: i64,
    note: String,
    created_at: i64,
}

// ============================================================================
// LEDGER STORE
// ============================================================================

/// In-memory entry sequence plus its backing file.
///
/// Constructed once at startup and handed to whoever needs it - there is no
/// process-global ledger. Callers that share a store across requests wrap it
/// in `Arc<Mutex<..>>` so "append + rewrite" stays one atomic unit.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    roster: Roster,
    entries: Vec<DebtEntry>,
}

impl LedgerStore {
    /// Load the ledger file, resolving every row against the roster.
    ///
    /// A missing file is a valid empty ledger. A file that exists but does
    /// not parse - or that references a party not in the roster - is an
    /// error: silently dropping existing rows would corrupt balances.
    pub fn open(path: impl Into<PathBuf>, roster: Roster) -> Result<LedgerStore> {
        let path = path.into();
        let entries = load_entries(&path, &roster)?;
        Ok(LedgerStore {
            path,
            roster,
            entries,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn entries(&self) -> &[DebtEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and rewrite the whole file from memory.
    ///
    /// If the rewrite fails the entry is still in the in-memory sequence;
    /// the caller reports the error and the next successful append persists
    /// everything again. The process never dies on a failed write.
    pub fn append(&mut self, entry: DebtEntry) -> Result<()> {
        tracing::debug!(
            debtor = self.roster.name(entry.debtor),
            creditor = self.roster.name(entry.creditor),
            amount = %entry.amount,
            "appending ledger entry"
        );
        self.entries.push(entry);
        if let Err(e) = self.rewrite() {
            tracing::error!("ledger rewrite failed: {:#}", e);
            return Err(e);
        }
        Ok(())
    }

    fn rewrite(&self) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .with_context(|| {
                format!("failed to open ledger file {} for writing", self.path.display())
            })?;

        for entry in &self.entries {
            let raw = RawEntry {
                debtor: self.roster.name(entry.debtor).to_string(),
                creditor: self.roster.name(entry.creditor).to_string(),
                cents: entry.amount.cents,
                note: entry.note.clone(),
                created_at: entry.created_at.timestamp(),
            };
            writer.serialize(raw).context("failed to write ledger record")?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush ledger file {}", self.path.display()))?;
        Ok(())
    }
}

fn load_entries(path: &Path, roster: &Roster) -> Result<Vec<DebtEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                "ledger file {} not found, starting with an empty ledger",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to open ledger file {}", path.display()));
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(file);

    let mut entries = Vec::new();
    for (line, row) in reader.deserialize::<RawEntry>().enumerate() {
        let raw = row.with_context(|| {
            format!(
                "corrupt ledger file {}: bad record on line {}",
                path.display(),
                line + 1
            )
        })?;
        let entry = resolve_raw(raw, roster).with_context(|| {
            format!("ledger file {} line {}", path.display(), line + 1)
        })?;
        entries.push(entry);
    }

    tracing::info!(entries = entries.len(), "loaded ledger from {}", path.display());
    Ok(entries)
}

fn resolve_raw(raw: RawEntry, roster: &Roster) -> Result<DebtEntry> {
    let debtor = roster
        .resolve(&raw.debtor)
        .ok_or(LedgerError::UnknownParty { name: raw.debtor })?;
    let creditor = roster
        .resolve(&raw.creditor)
        .ok_or(LedgerError::UnknownParty { name: raw.creditor })?;
    if debtor == creditor {
        return Err(LedgerError::SameParty.into());
    }
    if raw.cents < 0 {
        bail!("negative amount {} cents", raw.cents);
    }
    let created_at = DateTime::from_timestamp(raw.created_at, 0)
        .ok_or_else(|| anyhow::anyhow!("timestamp {} out of range", raw.created_at))?;

    Ok(DebtEntry {
        debtor,
        creditor,
        amount: Money::from_cents(raw.cents),
        note: raw.note,
        created_at,
    })
}

// ============================================================================
// LEGACY MIGRATION
// ============================================================================

/// Convert the older 4-field ledger (person, cents, note, unix-seconds) to
/// the current 5-field layout. In the old format each row named only the
/// person who owed; the creditor is the other participant, so the legacy
/// file must contain exactly two distinct people.
///
/// Returns the number of migrated rows.
pub fn migrate_legacy(old_path: &Path, new_path: &Path) -> Result<usize> {
    #[derive(Debug, Deserialize)]
    struct LegacyRow {
        person: String,
        cents: i64,
        note: String,
        created_at: i64,
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(old_path)
        .with_context(|| format!("failed to open legacy ledger {}", old_path.display()))?;

    let mut rows: Vec<LegacyRow> = Vec::new();
    let mut people: Vec<String> = Vec::new();
    for (line, row) in reader.deserialize::<LegacyRow>().enumerate() {
        let row: LegacyRow = row.with_context(|| {
            format!(
                "corrupt legacy ledger {}: bad record on line {}",
                old_path.display(),
                line + 1
            )
        })?;
        if !people.contains(&row.person) {
            people.push(row.person.clone());
        }
        rows.push(row);
    }

    if people.len() != 2 {
        bail!(
            "legacy ledger {} must name exactly two people, found {}",
            old_path.display(),
            people.len()
        );
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(new_path)
        .with_context(|| format!("failed to open {} for writing", new_path.display()))?;

    let migrated = rows.len();
    for row in rows {
        let creditor = if row.person == people[0] {
            people[1].clone()
        } else {
            people[0].clone()
        };
        writer
            .serialize(RawEntry {
                debtor: row.person,
                creditor,
                cents: row.cents,
                note: row.note,
                created_at: row.created_at,
            })
            .context("failed to write migrated record")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", new_path.display()))?;

    tracing::info!(rows = migrated, "migrated legacy ledger to {}", new_path.display());
    Ok(migrated)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};

    fn test_roster() -> Roster {
        Roster::new(["ben", "mitchell"]).unwrap()
    }

    fn entry(debtor: usize, creditor: usize, cents: i64, note: &str) -> DebtEntry {
        DebtEntry::new(
            PartyId(debtor),
            PartyId(creditor),
            Money::from_cents(cents),
            note.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_ledger_file_means_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("debt.csv"), test_roster()).unwrap();
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_append_then_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");

        let mut store = LedgerStore::open(&path, test_roster()).unwrap();
        store.append(entry(0, 1, 1000, "groceries")).unwrap();
        store.append(entry(1, 0, 300, "coffee")).unwrap();

        let reloaded = LedgerStore::open(&path, test_roster()).unwrap();
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn test_notes_with_delimiters_survive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");

        let tricky = "rent, utilities\nand a \"quoted\" bit";
        let mut store = LedgerStore::open(&path, test_roster()).unwrap();
        store.append(entry(0, 1, 4250, tricky)).unwrap();
        store.append(entry(1, 0, 100, "plain")).unwrap();

        let reloaded = LedgerStore::open(&path, test_roster()).unwrap();
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.entries()[0].note, tricky);
    }

    #[test]
    fn test_unknown_party_in_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");
        fs::write(&path, "ben,stranger,500,lunch,1700000000\n").unwrap();

        let err = LedgerStore::open(&path, test_roster()).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown party"));
    }

    #[test]
    fn test_corrupt_ledger_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");

        // Non-numeric cents column.
        fs::write(&path, "ben,mitchell,lots,lunch,1700000000\n").unwrap();
        assert!(LedgerStore::open(&path, test_roster()).is_err());

        // Truncated record.
        fs::write(&path, "ben,mitchell,500\n").unwrap();
        assert!(LedgerStore::open(&path, test_roster()).is_err());
    }

    #[test]
    fn test_negative_amount_in_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");
        fs::write(&path, "ben,mitchell,-500,refund?,1700000000\n").unwrap();
        assert!(LedgerStore::open(&path, test_roster()).is_err());
    }

    #[test]
    fn test_same_party_entry_rejected_at_creation() {
        let result = DebtEntry::new(
            PartyId(0),
            PartyId(0),
            Money::from_cents(100),
            "self-loan".to_string(),
        );
        assert!(matches!(result, Err(LedgerError::SameParty)));
    }

    #[test]
    fn test_same_party_row_in_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");
        fs::write(&path, "ben,ben,500,self,1700000000\n").unwrap();
        assert!(LedgerStore::open(&path, test_roster()).is_err());
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");

        let mut store = LedgerStore::open(&path, test_roster()).unwrap();
        for i in 0..10 {
            store.append(entry(0, 1, 100 + i, &format!("entry {}", i))).unwrap();
        }

        let reloaded = LedgerStore::open(&path, test_roster()).unwrap();
        let notes: Vec<&str> = reloaded.entries().iter().map(|e| e.note.as_str()).collect();
        assert_eq!(notes[0], "entry 0");
        assert_eq!(notes[9], "entry 9");
    }

    #[test]
    fn test_failed_rewrite_keeps_entry_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist: open() sees a missing file
        // (empty ledger), but every rewrite fails.
        let path = dir.path().join("no-such-dir").join("debt.csv");

        let mut store = LedgerStore::open(&path, test_roster()).unwrap();
        let result = store.append(entry(0, 1, 500, "doomed"));

        assert!(result.is_err());
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].note, "doomed");
    }

    #[test]
    fn test_concurrent_appends_do_not_lose_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debt.csv");

        let store = LedgerStore::open(&path, test_roster()).unwrap();
        let store = Arc::new(Mutex::new(store));

        let mut handles = Vec::new();
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    let mut guard = store.lock().unwrap();
                    guard
                        .append(entry(0, 1, 100, &format!("thread {} entry {}", t, i)))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.lock().unwrap().entries().len(), 100);

        let reloaded = LedgerStore::open(&path, test_roster()).unwrap();
        assert_eq!(reloaded.entries().len(), 100);
    }

    #[test]
    fn test_migrate_legacy_pairs_each_row_with_the_other_person() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.csv");
        let new = dir.path().join("debt.csv");
        fs::write(
            &old,
            "ben,1000,groceries,1700000000\n\
             mitchell,300,coffee,1700000100\n\
             ben,250,bus fare,1700000200\n",
        )
        .unwrap();

        let migrated = migrate_legacy(&old, &new).unwrap();
        assert_eq!(migrated, 3);

        let store = LedgerStore::open(&new, test_roster()).unwrap();
        assert_eq!(store.entries().len(), 3);
        assert_eq!(store.entries()[0].debtor, PartyId(0));
        assert_eq!(store.entries()[0].creditor, PartyId(1));
        assert_eq!(store.entries()[1].debtor, PartyId(1));
        assert_eq!(store.entries()[1].creditor, PartyId(0));
        assert_eq!(store.entries()[2].note, "bus fare");
    }

    #[test]
    fn test_migrate_legacy_requires_exactly_two_people() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.csv");
        let new = dir.path().join("debt.csv");

        fs::write(&old, "ben,1000,solo,1700000000\n").unwrap();
        let err = migrate_legacy(&old, &new).unwrap_err();
        assert!(err.to_string().contains("exactly two"));

        fs::write(
            &old,
            "ben,1,a,1\nmitchell,2,b,2\ncasey,3,c,3\n",
        )
        .unwrap();
        assert!(migrate_legacy(&old, &new).is_err());
    }

    #[test]
    fn test_migrate_legacy_preserves_quoted_notes() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.csv");
        let new = dir.path().join("debt.csv");
        fs::write(
            &old,
            "ben,1000,\"dinner, drinks\",1700000000\nmitchell,1,x,1700000001\n",
        )
        .unwrap();

        migrate_legacy(&old, &new).unwrap();
        let store = LedgerStore::open(&new, test_roster()).unwrap();
        assert_eq!(store.entries()[0].note, "dinner, drinks");
    }
}
