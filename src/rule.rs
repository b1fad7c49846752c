//! Rule model - compiled prefix chains and conclusion terminals.
//!
//! A source rule with premises `P1, ..., Pn` is lowered into a linear chain
//! of named positions. Each non-terminal position holds one premise and the
//! names of its successors; each terminal position holds a conclusion. The
//! stepper drives these chains in both directions: a new prefix searches the
//! fact store, a new fact searches the waiting prefixes.

use crate::db::{Database, FxIndexMap};
use crate::prop::{ArgVec, Proposition, ValueVec};
use crate::symbol::NameId;
use crate::term::TermId;
use smallvec::SmallVec;

/// The premise guarding one rule position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Premise {
    /// Match a proposition pattern against the fact store.
    Prop(Proposition),
    /// Require two grounded terms to differ.
    Neq { a: TermId, b: TermId },
}

/// A non-terminal rule position: one premise, the variables that must
/// already be bound on entry, and the successor positions.
///
/// The compiler guarantees `shared` is bound by every path reaching the
/// position and that inequality premises only reference `shared`; the
/// stepper relies on this and faults otherwise.
#[derive(Debug, Clone)]
pub struct PartialRule {
    pub premise: Premise,
    pub shared: SmallVec<[NameId; 4]>,
    /// Successor position names; more than one when a single premise chain
    /// fans out to several conclusions.
    pub next: SmallVec<[NameId; 2]>,
}

/// A terminal rule position.
#[derive(Debug, Clone)]
pub enum Conclusion {
    /// Assert one fact chosen from an enumerated set of value alternatives.
    ///
    /// With `exhaustive` set, the alternatives are the only permitted
    /// outcomes and failing all of them is a contradiction; otherwise
    /// declining every alternative is also admissible.
    Choice {
        name: NameId,
        args: ArgVec,
        choices: Vec<ValueVec>,
        exhaustive: bool,
    },
    /// The rule is an integrity constraint; reaching it kills the database.
    Contradiction,
}

/// A compiled program: the rule and conclusion tables plus the seed
/// database (initial prefixes and seed facts already enqueued).
#[derive(Debug, Clone)]
pub struct Program {
    pub rules: FxIndexMap<NameId, PartialRule>,
    pub conclusions: FxIndexMap<NameId, Conclusion>,
    pub seed: Database,
}

impl Program {
    /// Create an empty program with the given seed database.
    pub fn new(seed: Database) -> Self {
        Self {
            rules: FxIndexMap::default(),
            conclusions: FxIndexMap::default(),
            seed,
        }
    }
}
