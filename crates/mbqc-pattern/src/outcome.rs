//! Append-only table of measurement outcomes.

use std::collections::BTreeMap;

use mbqc_ir::QubitId;
use serde::{Deserialize, Serialize};

use crate::command::Domain;
use crate::error::{PatternError, PatternResult};

/// Measurement outcomes keyed by qubit.
///
/// Every entry is written exactly once. Reading a qubit that has not been
/// written yet is reported to the caller, which decides how to surface it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTable {
    bits: BTreeMap<QubitId, u8>,
}

impl OutcomeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a measurement.
    pub fn record(&mut self, qubit: QubitId, bit: u8) -> PatternResult<()> {
        if bit > 1 {
            return Err(PatternError::InvalidOutcome { qubit, bit });
        }
        if self.bits.contains_key(&qubit) {
            return Err(PatternError::OutcomeAlreadyRecorded(qubit));
        }
        self.bits.insert(qubit, bit);
        Ok(())
    }

    /// Outcome of a qubit, if recorded.
    pub fn get(&self, qubit: QubitId) -> Option<u8> {
        self.bits.get(&qubit).copied()
    }

    /// Parity of the outcomes in a domain.
    ///
    /// Fails with the first qubit of the domain that has no outcome.
    pub fn parity(&self, domain: &Domain) -> Result<bool, QubitId> {
        domain.iter().try_fold(false, |acc, q| match self.get(q) {
            Some(bit) => Ok(acc ^ (bit == 1)),
            None => Err(q),
        })
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Outcomes in ascending qubit order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u8)> + '_ {
        self.bits.iter().map(|(q, b)| (*q, *b))
    }

    /// Outcomes of the given qubits as a `0`/`1` string, `None` if any is missing.
    pub fn bitstring(&self, qubits: &[QubitId]) -> Option<String> {
        qubits
            .iter()
            .map(|q| self.get(*q).map(|b| if b == 1 { '1' } else { '0' }))
            .collect()
    }
}
