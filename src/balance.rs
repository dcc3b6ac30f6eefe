// ⚖️ Balance Engine - Net positions derived from the ledger
// Pure functions over the entry sequence; nothing here touches disk.

use crate::money::Money;
use crate::roster::{PartyId, Roster};
use crate::store::DebtEntry;

/// Net position per party, indexed by roster order.
///
/// Each entry moves its amount from debtor to creditor: the debtor's
/// balance goes down, the creditor's goes up. Positive means the party is
/// owed money overall, negative means they owe. The sum across all parties
/// is always zero.
pub fn balances(roster: &Roster, entries: &[DebtEntry]) -> Vec<Money> {
    let mut balances = vec![Money::ZERO; roster.len()];
    for entry in entries {
        balances[entry.debtor.0] = balances[entry.debtor.0].subtract(entry.amount);
        balances[entry.creditor.0] = balances[entry.creditor.0].add(entry.amount);
    }
    balances
}

/// Gross amount each party has been recorded as owing, indexed by roster
/// order. Unlike `balances` this never nets out: it only sums the rows
/// where the party is the debtor.
pub fn owed_totals(roster: &Roster, entries: &[DebtEntry]) -> Vec<Money> {
    let mut totals = vec![Money::ZERO; roster.len()];
    for entry in entries {
        totals[entry.debtor.0] = totals[entry.debtor.0].add(entry.amount);
    }
    totals
}

/// The headline verdict: who owes whom, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub debtor: PartyId,
    pub creditor: PartyId,
    /// Never negative.
    pub amount: Money,
}

/// Settle the first two roster parties against each other.
///
/// Compares their gross owed totals; whoever has been recorded as owing
/// strictly more is the overall debtor for the difference. When the totals
/// are equal (including the empty ledger) the second party is reported as
/// owing the first $0.00.
pub fn summarize(roster: &Roster, entries: &[DebtEntry]) -> Summary {
    let owed = owed_totals(roster, entries);
    if owed[0] > owed[1] {
        Summary {
            debtor: PartyId(0),
            creditor: PartyId(1),
            amount: owed[0].subtract(owed[1]),
        }
    } else {
        Summary {
            debtor: PartyId(1),
            creditor: PartyId(0),
            amount: owed[1].subtract(owed[0]),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
