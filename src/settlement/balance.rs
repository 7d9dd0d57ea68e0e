//! Per-run balance table

use bigdecimal::BigDecimal;
use std::collections::HashMap;

use crate::types::*;

/// Signed net positions indexed by participant, built fresh for every run
///
/// Roster participants keep their roster order; ids first seen in an expense
/// are appended after them with a zero starting balance.
#[derive(Debug, Clone, Default)]
pub struct BalanceTable {
    participants: Vec<ParticipantId>,
    index: HashMap<ParticipantId, usize>,
    balances: Vec<BigDecimal>,
}

impl BalanceTable {
    /// Create a table with every roster participant at zero
    pub fn with_roster(roster: &[ParticipantId]) -> Self {
        let mut table = Self::default();
        for participant in roster {
            table.slot(participant);
        }
        table
    }

    fn slot(&mut self, participant: &str) -> usize {
        if let Some(&slot) = self.index.get(participant) {
            return slot;
        }
        let slot = self.participants.len();
        self.participants.push(participant.to_string());
        self.index.insert(participant.to_string(), slot);
        self.balances.push(BigDecimal::from(0));
        slot
    }

    /// Increase a participant's balance, adding them if unknown
    pub fn credit(&mut self, participant: &str, amount: &BigDecimal) {
        if !self.index.contains_key(participant) {
            tracing::trace!(participant, "participant not on roster, starting from zero");
        }
        let slot = self.slot(participant);
        self.balances[slot] += amount;
    }

    /// Decrease a participant's balance, adding them if unknown
    pub fn debit(&mut self, participant: &str, amount: &BigDecimal) {
        if !self.index.contains_key(participant) {
            tracing::trace!(participant, "participant not on roster, starting from zero");
        }
        let slot = self.slot(participant);
        self.balances[slot] -= amount;
    }

    /// Apply one expense: credit the payer, debit each target an equal share
    pub fn apply_expense(&mut self, expense: &ExpenseRecord) -> SettlementResult<()> {
        let share = expense.share()?;
        if let Some(payer) = expense.payer.participant() {
            self.credit(payer, &expense.amount);
        }
        for target in &expense.targets {
            self.debit(target, &share);
        }
        Ok(())
    }

    /// Apply transfers as payments: the payer's balance rises, the payee's falls
    pub fn apply_transfers(&mut self, transfers: &[Transfer]) {
        for transfer in transfers {
            self.credit(&transfer.from, &transfer.amount);
            self.debit(&transfer.to, &transfer.amount);
        }
    }

    pub fn get(&self, participant: &str) -> Option<&BigDecimal> {
        self.index.get(participant).map(|&slot| &self.balances[slot])
    }

    /// Balances in table order
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &BigDecimal)> {
        self.participants.iter().zip(self.balances.iter())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Sum of all balances; zero up to division residue for valid input
    pub fn total(&self) -> BigDecimal {
        self.balances.iter().sum()
    }

    /// Whether every balance is within `tolerance` of zero
    pub fn is_settled(&self, tolerance: &BigDecimal) -> bool {
        self.balances.iter().all(|b| b.abs() <= *tolerance)
    }

    pub fn to_balances(&self) -> Vec<ParticipantBalance> {
        self.iter()
            .map(|(participant, balance)| ParticipantBalance {
                participant: participant.clone(),
                balance: balance.clone(),
            })
            .collect()
    }
}
