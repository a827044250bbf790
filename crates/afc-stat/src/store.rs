//! Named collection of accumulators with create/fill/merge operations.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use afc_core::errors::{AfcError, ErrorInfo};
use indexmap::IndexMap;

use crate::accum::{CountAccumulator, ProfileAccumulator};

fn store_error(code: &str, message: impl Into<String>, name: &str) -> AfcError {
    AfcError::Store(ErrorInfo::new(code, message).with_context("accumulator", name))
}

/// A registered accumulator, either frequency or profile flavoured.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Frequency accumulator counting events per bin.
    Count(CountAccumulator),
    /// Profile accumulator tracking a running mean per bin.
    Profile(ProfileAccumulator),
}

impl Accumulator {
    fn kind(&self) -> &'static str {
        match self {
            Accumulator::Count(_) => "count",
            Accumulator::Profile(_) => "profile",
        }
    }
}

/// Insertion-ordered mapping from symbolic accumulator name to
/// accumulator.
///
/// Accumulators are created once, when a feature is enabled, and filled
/// many times afterwards. The engine only ever creates and fills; the
/// read accessors exist for the exporting collaborator and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorStore {
    name: String,
    entries: IndexMap<String, Accumulator>,
}

impl AccumulatorStore {
    /// Creates an empty store labelled with a run name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Returns the run name the store was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of registered accumulators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no accumulator is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over accumulator names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Registers a frequency accumulator under the given name.
    pub fn create_count(&mut self, name: &str) -> Result<(), AfcError> {
        self.register(name, Accumulator::Count(CountAccumulator::new()))
    }

    /// Registers a profile accumulator under the given name.
    pub fn create_profile(&mut self, name: &str) -> Result<(), AfcError> {
        self.register(name, Accumulator::Profile(ProfileAccumulator::new()))
    }

    fn register(&mut self, name: &str, accumulator: Accumulator) -> Result<(), AfcError> {
        if self.entries.contains_key(name) {
            return Err(store_error(
                "duplicate-accumulator",
                "accumulator name already registered",
                name,
            ));
        }
        self.entries.insert(name.to_string(), accumulator);
        Ok(())
    }

    /// Increments the given bin of a frequency accumulator.
    pub fn fill_count(&mut self, name: &str, bin: u32) -> Result<(), AfcError> {
        match self.entries.get_mut(name) {
            Some(Accumulator::Count(acc)) => {
                acc.fill(bin);
                Ok(())
            }
            Some(other) => Err(store_error(
                "kind-mismatch",
                format!("expected a count accumulator, found {}", other.kind()),
                name,
            )),
            None => Err(store_error(
                "unknown-accumulator",
                "no accumulator registered under this name",
                name,
            )),
        }
    }

    /// Records a value into the given bin of a profile accumulator.
    pub fn fill_profile(&mut self, name: &str, bin: u32, value: f64) -> Result<(), AfcError> {
        match self.entries.get_mut(name) {
            Some(Accumulator::Profile(acc)) => {
                acc.fill(bin, value);
                Ok(())
            }
            Some(other) => Err(store_error(
                "kind-mismatch",
                format!("expected a profile accumulator, found {}", other.kind()),
                name,
            )),
            None => Err(store_error(
                "unknown-accumulator",
                "no accumulator registered under this name",
                name,
            )),
        }
    }

    /// Returns a frequency accumulator by name, if registered as such.
    pub fn count(&self, name: &str) -> Option<&CountAccumulator> {
        match self.entries.get(name) {
            Some(Accumulator::Count(acc)) => Some(acc),
            _ => None,
        }
    }

    /// Returns a profile accumulator by name, if registered as such.
    pub fn profile(&self, name: &str) -> Option<&ProfileAccumulator> {
        match self.entries.get(name) {
            Some(Accumulator::Profile(acc)) => Some(acc),
            _ => None,
        }
    }

    /// Combines another store into this one.
    ///
    /// Accumulators sharing a name are merged bin-wise (counts summed,
    /// profile statistics recombined); names present only in `other` are
    /// inserted. A name registered with different kinds on the two sides
    /// is a `Store` error.
    pub fn merge(&mut self, other: AccumulatorStore) -> Result<(), AfcError> {
        for (name, incoming) in other.entries {
            match (self.entries.get_mut(&name), incoming) {
                (Some(Accumulator::Count(mine)), Accumulator::Count(theirs)) => {
                    mine.merge(&theirs);
                }
                (Some(Accumulator::Profile(mine)), Accumulator::Profile(theirs)) => {
                    mine.merge(&theirs);
                }
                (Some(mine), theirs) => {
                    return Err(store_error(
                        "kind-mismatch",
                        format!(
                            "cannot merge {} accumulator into {}",
                            theirs.kind(),
                            mine.kind()
                        ),
                        &name,
                    ));
                }
                (None, theirs) => {
                    self.entries.insert(name, theirs);
                }
            }
        }
        Ok(())
    }

    /// Writes every accumulator to a CSV file.
    ///
    /// Counts leave the mean and variance columns empty; profiles report
    /// entries, mean and population variance per occupied bin.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "accumulator,kind,bin,entries,mean,variance")?;
        for (name, accumulator) in &self.entries {
            match accumulator {
                Accumulator::Count(acc) => {
                    for (bin, count) in acc.bins() {
                        writeln!(file, "{name},count,{bin},{count},,")?;
                    }
                }
                Accumulator::Profile(acc) => {
                    for (bin, stats) in acc.bins() {
                        let mean = stats.mean().unwrap_or(0.0);
                        let variance = stats.variance().unwrap_or(0.0);
                        writeln!(
                            file,
                            "{name},profile,{bin},{},{mean:.9},{variance:.9}",
                            stats.entries
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
