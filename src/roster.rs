// 👥 Party Roster - The fixed set of people sharing the ledger
// Loaded once at startup, immutable for the process lifetime. Entries refer
// to parties by roster position, never by copied name, so a lookup table is
// the single source of party identity.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stable party identifier: the party's position in the roster file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartyId(pub usize);

/// A participant in the shared ledger. Identity is the exact name string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
}

// ============================================================================
// ROSTER
// ============================================================================

/// Ordered list of parties, resolved by exact name match.
///
/// The file format is one name per line (CSV, no header). At least two
/// parties are required: the headline summary is the net relation between
/// the first two.
#[derive(Debug, Clone)]
pub struct Roster {
    parties: Vec<Party>,
}

impl Roster {
    /// Build a roster from names, validating what the file loader validates.
    pub fn new<I, S>(names: I) -> Result<Roster>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parties: Vec<Party> = names
            .into_iter()
            .map(|name| Party { name: name.into() })
            .collect();

        if parties.len() < 2 {
            bail!(
                "roster needs at least two parties, got {}",
                parties.len()
            );
        }
        for (i, party) in parties.iter().enumerate() {
            if party.name.is_empty() {
                bail!("roster entry {} is empty", i + 1);
            }
            if parties[..i].iter().any(|p| p.name == party.name) {
                bail!("duplicate party name in roster: {:?}", party.name);
            }
        }

        Ok(Roster { parties })
    }

    /// Load the roster file. A missing or malformed roster is an error:
    /// the ledger cannot resolve entries without it, so callers treat this
    /// as fatal at startup.
    pub fn load(path: &Path) -> Result<Roster> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("failed to open roster file {}", path.display()))?;

        let mut names = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("failed to read roster file {}, line {}", path.display(), line + 1))?;
            if record.len() != 1 {
                bail!(
                    "roster file {} line {}: expected one name per line, got {} fields",
                    path.display(),
                    line + 1,
                    record.len()
                );
            }
            names.push(record[0].to_string());
        }

        let roster = Roster::new(names)
            .with_context(|| format!("invalid roster file {}", path.display()))?;
        tracing::info!(parties = roster.len(), "loaded roster from {}", path.display());
        Ok(roster)
    }

    /// Write the roster file (used by the `init` bootstrap command).
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("failed to open roster file {} for writing", path.display()))?;

        for party in &self.parties {
            writer
                .write_record([party.name.as_str()])
                .context("failed to write roster record")?;
        }
        writer.flush().context("failed to flush roster file")?;
        Ok(())
    }

    /// Resolve a name to a party id. Exact, case-sensitive match; unknown
    /// names return `None` and callers must handle that explicitly.
    pub fn resolve(&self, name: &str) -> Option<PartyId> {
        self.parties
            .iter()
            .position(|p| p.name == name)
            .map(PartyId)
    }

    pub fn name(&self, id: PartyId) -> &str {
        &self.parties[id.0].name
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
