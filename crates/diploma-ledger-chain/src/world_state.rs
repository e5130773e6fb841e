//! Key-value world state the contract runs against.

use std::collections::BTreeMap;

use crate::entry::LedgerEntry;

/// Ledger key-value state, keyed by serial number.
pub trait WorldState {
    fn get_state(&self, key: &str) -> Option<LedgerEntry>;

    fn put_state(&mut self, key: &str, entry: LedgerEntry);
}

/// World state held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorldState {
    entries: BTreeMap<String, LedgerEntry>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Option<LedgerEntry> {
        self.entries.get(key).cloned()
    }

    fn put_state(&mut self, key: &str, entry: LedgerEntry) {
        self.entries.insert(key.to_string(), entry);
    }
}

/// Buffers writes over a base state without touching it.
///
/// Evaluated (read-only) transactions run against an overlay, which is
/// dropped afterwards.
pub struct Overlay<'a, S: WorldState + ?Sized> {
    base: &'a S,
    writes: BTreeMap<String, LedgerEntry>,
}

impl<'a, S: WorldState + ?Sized> Overlay<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }
}

impl<S: WorldState + ?Sized> WorldState for Overlay<'_, S> {
    fn get_state(&self, key: &str) -> Option<LedgerEntry> {
        self.writes
            .get(key)
            .cloned()
            .or_else(|| self.base.get_state(key))
    }

    fn put_state(&mut self, key: &str, entry: LedgerEntry) {
        self.writes.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LedgerStatus;
    use chrono::Utc;
    use diploma_ledger_core::Sha256Digest;

    fn entry(serial: &str) -> LedgerEntry {
        LedgerEntry {
            serial_no: serial.into(),
            student_id: "SV".into(),
            student_name: "A".into(),
            birth_date: String::new(),
            major: String::new(),
            ranking: String::new(),
            gpa: String::new(),
            graduation_year: String::new(),
            record_hash: Sha256Digest::hash(serial.as_bytes()),
            status: LedgerStatus::Issued,
            issued_at: Utc::now(),
            revoked_at: None,
            tx_id: "tx".into(),
        }
    }

    #[test]
    fn test_overlay_does_not_leak() {
        let mut base = MemoryWorldState::new();
        base.put_state("VB001", entry("VB001"));

        let mut overlay = Overlay::new(&base);
        overlay.put_state("VB002", entry("VB002"));
        assert!(overlay.get_state("VB001").is_some());
        assert!(overlay.get_state("VB002").is_some());
        assert_eq!(overlay.pending_writes(), 1);
        drop(overlay);

        assert_eq!(base.len(), 1);
        assert!(base.get_state("VB002").is_none());
    }
}
