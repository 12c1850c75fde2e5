//! Owns the record being built and the finalized, ordered record list.

use std::collections::HashMap;

use log::debug;

use super::record::Record;
use crate::options::DuplicateIdPolicy;

/// How a repeated id was resolved when its record was finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Duplicate {
    pub(crate) id: String,
    /// Line of the level-0 line of the record seen first.
    pub(crate) first_line: usize,
    /// Line of the level-0 line of the repeated record.
    pub(crate) line: usize,
    /// Id the repeated record was stored under, if it was kept separately.
    pub(crate) renamed_to: Option<String>,
    pub(crate) policy: DuplicateIdPolicy,
}

#[derive(Debug)]
pub(crate) struct Accumulator {
    records: Vec<Record>,
    /// id → index into `records`.
    positions: HashMap<String, usize>,
    current: Option<Record>,
    policy: DuplicateIdPolicy,
}

impl Accumulator {
    pub(crate) fn new(policy: DuplicateIdPolicy) -> Self {
        Self {
            records: Vec::new(),
            positions: HashMap::new(),
            current: None,
            policy,
        }
    }

    /// Start a new in-progress record. The previous one must have been
    /// finalized.
    pub(crate) fn open(&mut self, record: Record) {
        debug_assert!(self.current.is_none(), "previous record not finalized");
        self.current = Some(record);
    }

    /// Set a field on the in-progress record; last write wins.
    pub(crate) fn set(&mut self, path: String, value: String) {
        if let Some(record) = self.current.as_mut() {
            record.fields.insert(path, value);
        }
    }

    /// Append to a field on the in-progress record.
    pub(crate) fn append(&mut self, path: &str, text: &str) {
        if let Some(record) = self.current.as_mut() {
            record.fields.append(path, text);
        }
    }

    /// Append to the value of the in-progress record's level-0 line.
    pub(crate) fn append_record_value(&mut self, text: &str) {
        if let Some(record) = self.current.as_mut() {
            record.value.push_str(text);
        }
    }

    /// Move the in-progress record into the result, applying the duplicate-id
    /// policy. Returns the resolution when the id had been seen before.
    pub(crate) fn finalize(&mut self) -> Option<Duplicate> {
        let mut record = self.current.take()?;

        let Some(&pos) = self.positions.get(&record.id) else {
            debug!(
                "record {} ({}) finalized with {} fields",
                record.id,
                record.kind,
                record.fields.len()
            );
            self.positions.insert(record.id.clone(), self.records.len());
            self.records.push(record);
            return None;
        };

        let mut dup = Duplicate {
            id: record.id.clone(),
            first_line: self.records[pos].line,
            line: record.line,
            renamed_to: None,
            policy: self.policy,
        };

        match self.policy {
            DuplicateIdPolicy::Overwrite => {
                debug!("record {} at line {} replaces earlier record", dup.id, dup.line);
                self.records[pos] = record;
            }
            DuplicateIdPolicy::KeepFirst => {
                debug!("record {} at line {} discarded, id already used", dup.id, dup.line);
            }
            DuplicateIdPolicy::AppendSuffix => {
                let renamed = self.unused_suffixed_id(&record.id);
                debug!("record {} at line {} stored as {renamed}", dup.id, dup.line);
                record.id = renamed.clone();
                self.positions.insert(renamed.clone(), self.records.len());
                self.records.push(record);
                dup.renamed_to = Some(renamed);
            }
        }
        Some(dup)
    }

    fn unused_suffixed_id(&self, id: &str) -> String {
        (2usize..)
            .map(|n| format!("{id}-{n}"))
            .find(|candidate| !self.positions.contains_key(candidate))
            .unwrap_or_else(|| unreachable!("an unbounded suffix range always yields a free id"))
    }

    /// Finalized records in first-seen order.
    pub(crate) fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, line: usize, name: &str) -> Record {
        let mut r = Record::new(id, "INDI", line);
        r.fields.insert("NAME", name);
        r
    }

    fn push(acc: &mut Accumulator, r: Record) -> Option<Duplicate> {
        acc.open(r);
        acc.finalize()
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::Overwrite);
        assert!(push(&mut acc, rec("I1", 1, "A")).is_none());
        push(&mut acc, rec("I2", 3, "B"));
        let dup = push(&mut acc, rec("I1", 5, "C")).unwrap();
        assert_eq!(dup.first_line, 1);
        assert_eq!(dup.line, 5);
        assert_eq!(dup.renamed_to, None);
        let records = acc.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "I1");
        assert_eq!(records[0].get("NAME"), Some("C"));
        assert_eq!(records[1].id, "I2");
    }

    #[test]
    fn keep_first_discards_later() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::KeepFirst);
        push(&mut acc, rec("I1", 1, "A"));
        assert!(push(&mut acc, rec("I1", 5, "C")).is_some());
        let records = acc.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("NAME"), Some("A"));
    }

    #[test]
    fn append_suffix_skips_taken_ids() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::AppendSuffix);
        push(&mut acc, rec("I1", 1, "A"));
        push(&mut acc, rec("I1-2", 3, "B"));
        let dup = push(&mut acc, rec("I1", 5, "C")).unwrap();
        assert_eq!(dup.renamed_to.as_deref(), Some("I1-3"));
        let ids: Vec<_> = acc.into_records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["I1", "I1-2", "I1-3"]);
    }

    #[test]
    fn finalize_without_open_record_is_noop() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::Overwrite);
        assert!(acc.finalize().is_none());
        assert_eq!(acc.len(), 0);
    }

    #[test]
    fn record_value_appends_to_open_record() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::Overwrite);
        let mut r = Record::new("N1", "NOTE", 1);
        r.value = "first".into();
        acc.open(r);
        acc.append_record_value("\nsecond");
        acc.finalize();
        assert_eq!(acc.into_records()[0].value, "first\nsecond");
    }

    #[test]
    fn set_without_open_record_is_ignored() {
        let mut acc = Accumulator::new(DuplicateIdPolicy::Overwrite);
        acc.set("NAME".into(), "x".into());
        assert!(acc.finalize().is_none());
        assert!(acc.into_records().is_empty());
    }
}
