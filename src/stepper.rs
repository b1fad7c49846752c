//! Stepper - advance one work item, yielding successor databases.
//!
//! `step` consumes a database and returns zero, one, or many successors:
//! an empty list closes the branch as inconsistent, a singleton is a
//! deterministic advance, and several successors model a branching choice.
//! Branch successors share no mutable state; the database value is cloned
//! per alternative.

use crate::db::{Database, InsertOutcome, WorkItem};
use crate::matching::match_slices;
use crate::prop::{ArgVec, ValueVec};
use crate::rule::{Conclusion, PartialRule, Premise, Program};
use crate::subst::{apply, Subst};
use crate::symbol::NameId;
use crate::term::TermStore;

#[cfg(feature = "tracing")]
use crate::trace::debug;

/// Fatal faults of the stepper. Pruned branches are not errors; these
/// indicate a caller bug or a violated compiler invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// `step` was called on a database with an empty queue.
    EmptyQueue,
    /// A work item names a position that is neither a rule nor a
    /// conclusion.
    UnknownPosition(NameId),
    /// A conclusion head references a variable the substitution does not
    /// bind.
    UnboundHeadVariable { position: NameId, var: NameId },
    /// An inequality premise references a variable the substitution does
    /// not bind.
    UnboundGuardVariable { position: NameId, var: NameId },
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::EmptyQueue => write!(f, "step called on a database with an empty queue"),
            StepError::UnknownPosition(_) => {
                write!(f, "work item names an unknown rule position")
            }
            StepError::UnboundHeadVariable { .. } => {
                write!(f, "conclusion head references an unbound variable")
            }
            StepError::UnboundGuardVariable { .. } => {
                write!(f, "inequality premise references an unbound variable")
            }
        }
    }
}

impl std::error::Error for StepError {}

/// Advance one work item.
///
/// The caller must not invoke this on a saturated database; an empty queue
/// is a fatal error, not a fixpoint signal.
pub fn step(program: &Program, db: Database, terms: &TermStore) -> Result<Vec<Database>, StepError> {
    let mut db = db;
    let item = db.pop_queue().ok_or(StepError::EmptyQueue)?;

    match item {
        WorkItem::Prefix { name, args } => {
            if let Some(conclusion) = program.conclusions.get(&name) {
                step_conclusion(name, conclusion, &args, db, terms)
            } else if let Some(rule) = program.rules.get(&name) {
                step_premise(name, rule, &args, db, terms)
            } else {
                Err(StepError::UnknownPosition(name))
            }
        }
        WorkItem::Fact { name, args, values } => {
            step_new_fact(program, name, &args, &values, db, terms)
        }
    }
}

/// A prefix reached a terminal: assert a choice of facts, or contradict.
fn step_conclusion(
    position: NameId,
    conclusion: &Conclusion,
    subst: &Subst,
    db: Database,
    terms: &TermStore,
) -> Result<Vec<Database>, StepError> {
    match conclusion {
        Conclusion::Contradiction => {
            #[cfg(feature = "tracing")]
            debug!(position = ?position, "constraint_violated");
            let _ = position;
            Ok(Vec::new())
        }
        Conclusion::Choice {
            name,
            args,
            choices,
            exhaustive,
        } => {
            let ground_args = args
                .iter()
                .map(|pattern| apply(subst, *pattern, terms))
                .collect::<Result<ArgVec, _>>()
                .map_err(|e| StepError::UnboundHeadVariable {
                    position,
                    var: e.var,
                })?;

            let mut successors = Vec::new();
            let mut redundant_possibility = false;

            // Alternatives branch in declared order; each gets its own copy
            // of the database.
            for choice in choices {
                let ground_values = choice
                    .iter()
                    .map(|pattern| apply(subst, *pattern, terms))
                    .collect::<Result<ValueVec, _>>()
                    .map_err(|e| StepError::UnboundHeadVariable {
                        position,
                        var: e.var,
                    })?;

                let mut branch = db.clone();
                match branch.insert_fact(*name, ground_args.clone(), ground_values) {
                    InsertOutcome::Inserted => successors.push(branch),
                    InsertOutcome::Redundant => {
                        // An existing fact already satisfies this
                        // alternative, so asserting nothing new stays
                        // consistent.
                        redundant_possibility = true;
                    }
                    InsertOutcome::Inconsistent { .. } => {
                        #[cfg(feature = "tracing")]
                        debug!(relation = ?name, "functional_inconsistency");
                    }
                }
            }

            // The no-progress alternative comes last: admissible for open
            // (non-exhaustive) heads, and whenever some alternative was
            // already satisfied.
            if !*exhaustive || redundant_possibility {
                successors.push(db);
            }

            #[cfg(feature = "tracing")]
            if successors.is_empty() {
                debug!(relation = ?name, "choice_exhausted");
            }

            Ok(successors)
        }
    }
}

/// A prefix has a next premise: extend it against the fact store or
/// evaluate its inequality guard.
fn step_premise(
    position: NameId,
    rule: &PartialRule,
    subst: &Subst,
    mut db: Database,
    terms: &TermStore,
) -> Result<Vec<Database>, StepError> {
    debug_assert!(
        rule.shared.iter().all(|var| subst.is_bound(*var)),
        "prefix reached without its shared variables bound"
    );

    match &rule.premise {
        Premise::Prop(pattern) => {
            let mut extensions: Vec<Subst> = Vec::new();
            for (args, values) in db.facts_for(pattern.name) {
                if let Some(s) = match_slices(subst, &pattern.args, args, terms) {
                    if let Some(s) = match_slices(&s, &pattern.values, values, terms) {
                        extensions.push(s);
                    }
                }
            }
            for extension in extensions {
                for successor in &rule.next {
                    db.extend_prefix(*successor, extension.clone());
                }
            }
            Ok(vec![db])
        }
        Premise::Neq { a, b } => {
            let left = apply(subst, *a, terms).map_err(|e| StepError::UnboundGuardVariable {
                position,
                var: e.var,
            })?;
            let right = apply(subst, *b, terms).map_err(|e| StepError::UnboundGuardVariable {
                position,
                var: e.var,
            })?;
            // Ground terms are hashconsed, so structural inequality is an
            // id compare.
            if left != right {
                for successor in &rule.next {
                    db.extend_prefix(*successor, subst.clone());
                }
            }
            Ok(vec![db])
        }
    }
}

/// A new fact searches the waiting prefixes whose next premise it might
/// satisfy.
fn step_new_fact(
    program: &Program,
    name: NameId,
    args: &ArgVec,
    values: &ValueVec,
    mut db: Database,
    terms: &TermStore,
) -> Result<Vec<Database>, StepError> {
    let mut extensions: Vec<(NameId, Subst)> = Vec::new();

    for (position, rule) in program.rules.iter() {
        let Premise::Prop(pattern) = &rule.premise else {
            continue;
        };
        if pattern.name != name {
            continue;
        }
        for sigma in db.substs_for(*position) {
            if let Some(s) = match_slices(sigma, &pattern.args, args, terms) {
                if let Some(s) = match_slices(&s, &pattern.values, values, terms) {
                    for successor in &rule.next {
                        extensions.push((*successor, s.clone()));
                    }
                }
            }
        }
    }

    for (successor, extension) in extensions {
        db.extend_prefix(successor, extension);
    }
    Ok(vec![db])
}

#[cfg(test)]
#[path = "tests/stepper.rs"]
mod tests;
