//! Database - the working state of one search branch.
//!
//! Holds the functional-indexed fact store, the prefix store recording how
//! far each compiled rule has progressed, and the FIFO work queue. A
//! database is a value: branching clones it, so successors never share
//! mutable state. Terms are hashconsed elsewhere, so a clone copies ids,
//! not term structure.

use crate::prop::{format_fact, ArgVec, ValueVec};
use crate::subst::Subst;
use crate::symbol::{NameId, SymbolStore};
use crate::term::{format_term, TermStore};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHasher};
use std::collections::VecDeque;
use std::hash::BuildHasherDefault;

/// Insertion-ordered map with Fx hashing. Iteration order is insertion
/// order, which keeps fact iteration stable within a run.
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// Insertion-ordered set with Fx hashing.
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// One entry of the work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// A newly inserted fact to propagate.
    Fact {
        name: NameId,
        args: ArgVec,
        values: ValueVec,
    },
    /// A newly reached rule prefix to extend.
    Prefix { name: NameId, args: Subst },
}

/// Outcome of inserting a fact into the functional store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The fact was new; a queue entry was appended.
    Inserted,
    /// The fact was already present (or marked uninteresting) with the same
    /// values; nothing changed.
    Redundant,
    /// The relation already maps these arguments to different values.
    Inconsistent { existing: ValueVec },
}

type FactTable = FxIndexMap<ArgVec, ValueVec>;

/// The database: facts, prefix store, and work queue.
#[derive(Debug, Clone, Default)]
pub struct Database {
    /// Functional fact store: one value tuple per (relation, argument list).
    facts: FxHashMap<NameId, FactTable>,
    /// Facts proved redundant by some terminal step; consulted on insertion
    /// to suppress re-firing, never enqueued.
    uninteresting: FxHashMap<NameId, FactTable>,
    /// Substitutions that have reached each rule prefix. No two stored
    /// substitutions under one prefix are pointwise equal.
    prefixes: FxHashMap<NameId, FxIndexSet<Subst>>,
    /// FIFO work queue.
    queue: VecDeque<WorkItem>,
}

impl Database {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact, enforcing the functional invariant.
    ///
    /// A fact already present (in the main store or the uninteresting set)
    /// with equal values is `Redundant` and leaves the database unchanged,
    /// queue included. Different values for the same key are
    /// `Inconsistent`. Otherwise the fact is stored and a queue entry
    /// appended.
    pub fn insert_fact(&mut self, name: NameId, args: ArgVec, values: ValueVec) -> InsertOutcome {
        if let Some(existing) = self.uninteresting.get(&name).and_then(|rel| rel.get(&args)) {
            return if *existing == values {
                InsertOutcome::Redundant
            } else {
                InsertOutcome::Inconsistent {
                    existing: existing.clone(),
                }
            };
        }
        let rel = self.facts.entry(name).or_default();
        if let Some(existing) = rel.get(&args) {
            return if *existing == values {
                InsertOutcome::Redundant
            } else {
                InsertOutcome::Inconsistent {
                    existing: existing.clone(),
                }
            };
        }
        rel.insert(args.clone(), values.clone());
        self.queue.push_back(WorkItem::Fact { name, args, values });
        InsertOutcome::Inserted
    }

    /// Record a fact in the uninteresting set. The fact participates in
    /// insertion checks but is never enqueued for propagation.
    pub fn insert_uninteresting(
        &mut self,
        name: NameId,
        args: ArgVec,
        values: ValueVec,
    ) -> InsertOutcome {
        if let Some(existing) = self.facts.get(&name).and_then(|rel| rel.get(&args)) {
            return if *existing == values {
                InsertOutcome::Redundant
            } else {
                InsertOutcome::Inconsistent {
                    existing: existing.clone(),
                }
            };
        }
        let rel = self.uninteresting.entry(name).or_default();
        if let Some(existing) = rel.get(&args) {
            return if *existing == values {
                InsertOutcome::Redundant
            } else {
                InsertOutcome::Inconsistent {
                    existing: existing.clone(),
                }
            };
        }
        rel.insert(args, values);
        InsertOutcome::Inserted
    }

    /// Record that a prefix has been reached with a substitution.
    ///
    /// If an equal substitution is already stored the database is unchanged;
    /// otherwise the substitution is stored and a queue entry appended.
    /// Returns whether the substitution was new.
    pub fn extend_prefix(&mut self, name: NameId, subst: Subst) -> bool {
        let set = self.prefixes.entry(name).or_default();
        if set.contains(&subst) {
            return false;
        }
        set.insert(subst.clone());
        self.queue.push_back(WorkItem::Prefix { name, args: subst });
        true
    }

    /// Pop the oldest work item, if any.
    pub fn pop_queue(&mut self) -> Option<WorkItem> {
        self.queue.pop_front()
    }

    /// Whether the work queue is empty (the database is saturated).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending work items.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// All facts of one relation in insertion order.
    pub fn facts_for(&self, name: NameId) -> impl Iterator<Item = (&ArgVec, &ValueVec)> {
        self.facts
            .get(&name)
            .into_iter()
            .flat_map(|rel| rel.iter())
    }

    /// The value tuple for a relation at an argument list, if present.
    pub fn value_of(&self, name: NameId, args: &[crate::term::TermId]) -> Option<&ValueVec> {
        self.facts.get(&name).and_then(|rel| rel.get(args))
    }

    /// Whether a fact is present with exactly these values.
    pub fn contains_fact(
        &self,
        name: NameId,
        args: &[crate::term::TermId],
        values: &[crate::term::TermId],
    ) -> bool {
        self.value_of(name, args)
            .map(|stored| stored.as_slice() == values)
            .unwrap_or(false)
    }

    /// Substitutions stored for a prefix, in insertion order.
    pub fn substs_for(&self, name: NameId) -> impl Iterator<Item = &Subst> {
        self.prefixes
            .get(&name)
            .into_iter()
            .flat_map(|set| set.iter())
    }

    /// Total number of stored facts across all relations.
    pub fn fact_count(&self) -> usize {
        self.facts.values().map(|rel| rel.len()).sum()
    }

    /// Render the database as a labelled dump: a `Queue` section in FIFO
    /// order followed by a `Database` section listing facts as propositions
    /// and prefixes as `name{ data/Var, ... }` with bindings sorted by
    /// variable name.
    pub fn dump(&self, terms: &TermStore, symbols: &SymbolStore) -> Result<String, String> {
        let mut out = String::new();

        out.push_str("Queue\n");
        for item in &self.queue {
            out.push_str("  ");
            match item {
                WorkItem::Fact { name, args, values } => {
                    out.push_str(&format_fact(*name, args, values, terms, symbols)?);
                }
                WorkItem::Prefix { name, args } => {
                    out.push_str(&format_prefix(*name, args, terms, symbols)?);
                }
            }
            out.push('\n');
        }

        out.push_str("Database\n");
        let mut relations: Vec<NameId> = self.facts.keys().copied().collect();
        relations.sort_by_key(|name| symbols.resolve(*name).unwrap_or("").to_string());
        for name in relations {
            for (args, values) in self.facts_for(name) {
                out.push_str("  ");
                out.push_str(&format_fact(name, args, values, terms, symbols)?);
                out.push('\n');
            }
        }
        let mut positions: Vec<NameId> = self.prefixes.keys().copied().collect();
        positions.sort_by_key(|name| symbols.resolve(*name).unwrap_or("").to_string());
        for name in positions {
            for subst in self.substs_for(name) {
                out.push_str("  ");
                out.push_str(&format_prefix(name, subst, terms, symbols)?);
                out.push('\n');
            }
        }

        Ok(out)
    }
}

/// Render a reached prefix as `name{ data/Var, ... }`, bindings sorted by
/// variable name.
fn format_prefix(
    name: NameId,
    subst: &Subst,
    terms: &TermStore,
    symbols: &SymbolStore,
) -> Result<String, String> {
    let mut bindings: Vec<(String, String)> = Vec::new();
    for (var, data) in subst.iter() {
        let var_name = symbols
            .resolve(var)
            .ok_or_else(|| format!("Unknown symbol for variable id {:?}", var))?
            .to_string();
        bindings.push((var_name, format_term(data, terms, symbols)?));
    }
    bindings.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    out.push_str(
        symbols
            .resolve(name)
            .ok_or_else(|| format!("Unknown symbol for prefix id {:?}", name))?,
    );
    if bindings.is_empty() {
        out.push_str("{ }");
        return Ok(out);
    }
    out.push_str("{ ");
    for (idx, (var, data)) in bindings.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(data);
        out.push('/');
        out.push_str(var);
    }
    out.push_str(" }");
    Ok(out)
}

#[cfg(test)]
#[path = "tests/db.rs"]
mod tests;
