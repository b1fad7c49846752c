//! Driver - depth-first exploration of the database tree.
//!
//! The driver keeps a stack of working databases. Saturated databases
//! (empty queue) are yielded as models; everything else is handed to the
//! stepper and replaced by its successors. Pruned branches (no successors)
//! silently shrink the model set.

use crate::db::Database;
use crate::rule::Program;
use crate::stepper::{step, StepError};
use crate::term::TermStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use crate::trace::debug;

/// All saturated models found, plus whether the search ran to completion
/// (false when cancelled or timed out with branches still unexplored).
#[derive(Debug)]
pub struct Solution {
    pub models: Vec<Database>,
    pub complete: bool,
}

/// Depth-first search driver over the tree of databases.
pub struct Driver<'p> {
    program: &'p Program,
    terms: &'p TermStore,
    stack: Vec<Database>,
    /// External cancellation flag, checked at loop head.
    cancel: Option<Arc<AtomicBool>>,
    /// Wall-clock deadline, checked at loop head.
    deadline: Option<Instant>,
    /// Called between iterations; may yield control elsewhere but never
    /// touches solver state.
    pause_hook: Option<Box<dyn FnMut() + 'p>>,
    interrupted: bool,
}

impl<'p> Driver<'p> {
    /// Create a driver seeded with the program's initial database.
    pub fn new(program: &'p Program, terms: &'p TermStore) -> Self {
        Self {
            program,
            terms,
            stack: vec![program.seed.clone()],
            cancel: None,
            deadline: None,
            pause_hook: None,
            interrupted: false,
        }
    }

    /// Install a cancellation flag. When set, the remaining stack is
    /// discarded and models found so far are returned.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Bound the search by wall-clock time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Install a hook called at every loop iteration, for interactive
    /// stepping.
    pub fn with_pause_hook(mut self, hook: Box<dyn FnMut() + 'p>) -> Self {
        self.pause_hook = Some(hook);
        self
    }

    /// Whether the search stopped early (cancellation or timeout).
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Number of databases still awaiting exploration.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    /// Run until the next saturated model, exhaustion, or interruption.
    ///
    /// Returns `Ok(None)` when there is nothing further to explore. Fatal
    /// stepper faults propagate as errors.
    pub fn next_model(&mut self) -> Result<Option<Database>, StepError> {
        loop {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    self.interrupted = !self.stack.is_empty();
                    self.stack.clear();
                    return Ok(None);
                }
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.interrupted = !self.stack.is_empty();
                    self.stack.clear();
                    return Ok(None);
                }
            }
            if let Some(hook) = &mut self.pause_hook {
                hook();
            }

            let Some(db) = self.stack.pop() else {
                return Ok(None);
            };

            if db.queue_is_empty() {
                #[cfg(feature = "tracing")]
                debug!(facts = db.fact_count(), "model_saturated");
                return Ok(Some(db));
            }

            let mut successors = step(self.program, db, self.terms)?;
            // Push in reverse so the first alternative is explored first.
            while let Some(successor) = successors.pop() {
                self.stack.push(successor);
            }
        }
    }

    /// Run the search to the end, collecting every saturated model.
    pub fn solve(mut self) -> Result<Solution, StepError> {
        let mut models = Vec::new();
        while let Some(model) = self.next_model()? {
            models.push(model);
        }
        Ok(Solution {
            models,
            complete: !self.interrupted,
        })
    }
}

#[cfg(test)]
#[path = "tests/driver.rs"]
mod tests;
