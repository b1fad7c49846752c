use crate::symbol::{NameId, SymbolStore};
use hashbrown::HashMap;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

/// Unique identifier for a term in the term store.
/// TermIds are stable; two ground terms are structurally equal iff their
/// TermIds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Get the raw u32 value (for debugging/display).
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A term: either a pattern node (may contain variables) or ground data.
///
/// Ground data is the variable-free subset; groundness is witnessed by
/// [`assert_ground`], not encoded as a separate representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A variable, identified by its interned name.
    Var(NameId),
    /// A named constructor applied to zero or more sub-terms.
    Ctor(NameId, SmallVec<[TermId; 4]>),
    /// An integer literal.
    Int(i64),
    /// A string literal; the contents are interned.
    Str(NameId),
    /// The unit value.
    Triv,
}

/// Number of shards for hashcons maps (power of 2 for fast modulo).
const NUM_SHARDS: usize = 16;

/// Thread-safe term store with hashconsing.
///
/// Guarantees:
/// - Structurally equal terms get the same TermId
/// - TermId can be resolved back to the term
/// - All terms (including variables) are hashconsed
pub struct TermStore {
    /// Central storage of all terms, indexed by TermId.
    nodes: RwLock<Vec<Term>>,
    /// Sharded hashcons maps for reducing contention.
    shards: [RwLock<HashMap<Term, TermId>>; NUM_SHARDS],
    /// Counter for generating unique TermIds.
    next_id: AtomicU32,
}

impl TermStore {
    /// Create a new empty term store.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| RwLock::new(HashMap::new()));
        Self {
            nodes: RwLock::new(Vec::new()),
            shards,
            next_id: AtomicU32::new(0),
        }
    }

    /// Intern a term, returning its TermId.
    /// If the term already exists, returns the existing TermId.
    fn intern(&self, term: Term) -> TermId {
        let shard_idx = Self::shard_index(&term);
        let shard = &self.shards[shard_idx];

        // Fast path: check if term exists (read lock)
        {
            let map = shard.read();
            if let Some(&id) = map.get(&term) {
                return id;
            }
        }

        // Slow path: need to insert (write lock)
        let mut map = shard.write();

        // Double-check after acquiring write lock
        if let Some(&id) = map.get(&term) {
            return id;
        }

        let id = TermId(self.next_id.fetch_add(1, Ordering::Relaxed));
        {
            let mut nodes = self.nodes.write();
            let idx = id.0 as usize;
            if nodes.len() <= idx {
                nodes.resize(idx + 1, Term::Triv); // placeholder
            }
            nodes[idx] = term.clone();
        }
        map.insert(term, id);
        id
    }

    /// Create a variable term.
    pub fn var(&self, name: NameId) -> TermId {
        self.intern(Term::Var(name))
    }

    /// Create a constructor term.
    pub fn ctor(&self, name: NameId, children: SmallVec<[TermId; 4]>) -> TermId {
        self.intern(Term::Ctor(name, children))
    }

    /// Create a nullary (0-arity) constructor.
    pub fn ctor0(&self, name: NameId) -> TermId {
        self.ctor(name, SmallVec::new())
    }

    /// Create an integer literal.
    pub fn int(&self, value: i64) -> TermId {
        self.intern(Term::Int(value))
    }

    /// Create a string literal from interned contents.
    pub fn string(&self, contents: NameId) -> TermId {
        self.intern(Term::Str(contents))
    }

    /// Create the unit value.
    pub fn triv(&self) -> TermId {
        self.intern(Term::Triv)
    }

    /// Resolve a TermId to its term.
    /// Returns None if the TermId is invalid.
    pub fn resolve(&self, id: TermId) -> Option<Term> {
        let nodes = self.nodes.read();
        nodes.get(id.0 as usize).cloned()
    }

    /// Check if a term is a variable, returning its name.
    pub fn is_var(&self, id: TermId) -> Option<NameId> {
        match self.resolve(id)? {
            Term::Var(name) => Some(name),
            _ => None,
        }
    }

    /// Get the shard index for a term (for hashconsing distribution).
    fn shard_index(term: &Term) -> usize {
        let mut hasher = FxHasher::default();
        term.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Witness that a term contains a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonGround {
    /// The first variable encountered.
    pub var: NameId,
}

impl std::fmt::Display for NonGround {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "term is not ground: contains a variable")
    }
}

impl std::error::Error for NonGround {}

/// Check that a term is ground (contains no variables).
/// Fails with the first variable found.
pub fn assert_ground(term: TermId, terms: &TermStore) -> Result<(), NonGround> {
    let mut stack: SmallVec<[TermId; 16]> = SmallVec::new();
    stack.push(term);
    while let Some(t) = stack.pop() {
        match terms.resolve(t) {
            Some(Term::Var(name)) => return Err(NonGround { var: name }),
            Some(Term::Ctor(_, children)) => {
                for child in children.iter() {
                    stack.push(*child);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Collect the free variables of a term, deduplicated, in first-occurrence
/// order.
pub fn free_vars(term: TermId, terms: &TermStore) -> Vec<NameId> {
    fn walk(term: TermId, terms: &TermStore, out: &mut Vec<NameId>) {
        match terms.resolve(term) {
            Some(Term::Var(name)) => {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
            Some(Term::Ctor(_, children)) => {
                for child in children.iter() {
                    walk(*child, terms, out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(term, terms, &mut out);
    out
}

/// Render a term in the surface syntax: variables and nullary constructors
/// print bare, applied constructors as `(name arg ...)`, strings quoted, the
/// unit value as `()`.
pub fn format_term(
    term: TermId,
    terms: &TermStore,
    symbols: &SymbolStore,
) -> Result<String, String> {
    fn render(
        term: TermId,
        terms: &TermStore,
        symbols: &SymbolStore,
        out: &mut String,
    ) -> Result<(), String> {
        match terms.resolve(term) {
            Some(Term::Var(name)) => {
                let name = symbols
                    .resolve(name)
                    .ok_or_else(|| format!("Unknown symbol for variable in term {:?}", term))?;
                out.push_str(name);
                Ok(())
            }
            Some(Term::Ctor(func, children)) => {
                let name = symbols
                    .resolve(func)
                    .ok_or_else(|| format!("Unknown symbol for ctor id {:?}", func))?;
                if children.is_empty() {
                    out.push_str(name);
                    Ok(())
                } else {
                    out.push('(');
                    out.push_str(name);
                    for child in children.iter() {
                        out.push(' ');
                        render(*child, terms, symbols, out)?;
                    }
                    out.push(')');
                    Ok(())
                }
            }
            Some(Term::Int(value)) => {
                out.push_str(&value.to_string());
                Ok(())
            }
            Some(Term::Str(contents)) => {
                let contents = symbols
                    .resolve(contents)
                    .ok_or_else(|| format!("Unknown symbol for string in term {:?}", term))?;
                out.push('"');
                out.push_str(contents);
                out.push('"');
                Ok(())
            }
            Some(Term::Triv) => {
                out.push_str("()");
                Ok(())
            }
            None => Err(format!("Unknown term id {:?}", term)),
        }
    }

    let mut out = String::new();
    render(term, terms, symbols, &mut out)?;
    Ok(out)
}

#[cfg(test)]
#[path = "tests/term.rs"]
mod tests;
