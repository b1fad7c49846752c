use crate::symbol::NameId;
use crate::term::{Term, TermId, TermStore};
use lasso::Key as _;
use smallvec::SmallVec;

/// A substitution maps variable names to ground data.
///
/// Bindings are kept sorted by variable key, so structural equality and
/// hashing of two substitutions is pointwise equality over the same keyset.
/// The expected size is bounded by the variable count of one rule, so a flat
/// association list is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Subst {
    bindings: SmallVec<[(NameId, TermId); 4]>,
}

impl Subst {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Self {
            bindings: SmallVec::new(),
        }
    }

    /// Get the binding for a variable, if any.
    pub fn get(&self, var: NameId) -> Option<TermId> {
        self.bindings
            .binary_search_by_key(&var.into_usize(), |(v, _)| v.into_usize())
            .ok()
            .map(|idx| self.bindings[idx].1)
    }

    /// Check if a variable is bound.
    pub fn is_bound(&self, var: NameId) -> bool {
        self.get(var).is_some()
    }

    /// Bind a variable to ground data, overwriting any previous binding.
    pub fn bind(&mut self, var: NameId, data: TermId) {
        match self
            .bindings
            .binary_search_by_key(&var.into_usize(), |(v, _)| v.into_usize())
        {
            Ok(idx) => self.bindings[idx].1 = data,
            Err(idx) => self.bindings.insert(idx, (var, data)),
        }
    }

    /// Produce a new substitution extended with one binding.
    pub fn extended(&self, var: NameId, data: TermId) -> Self {
        let mut out = self.clone();
        out.bind(var, data);
        out
    }

    /// Check if the substitution is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Iterator over (variable, data) pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (NameId, TermId)> + '_ {
        self.bindings.iter().copied()
    }
}

/// A pattern referenced a variable the substitution does not bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnboundVar {
    pub var: NameId,
}

impl std::fmt::Display for UnboundVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pattern references an unbound variable")
    }
}

impl std::error::Error for UnboundVar {}

/// Apply a substitution to a pattern, producing ground data.
///
/// Bindings map to ground data, so there are no chains to follow; an unbound
/// variable in the pattern is an error.
pub fn apply(subst: &Subst, pattern: TermId, terms: &TermStore) -> Result<TermId, UnboundVar> {
    match terms.resolve(pattern) {
        Some(Term::Var(name)) => subst.get(name).ok_or(UnboundVar { var: name }),
        Some(Term::Ctor(func, children)) => {
            let mut new_children: SmallVec<[TermId; 4]> = SmallVec::with_capacity(children.len());
            for child in children.iter() {
                new_children.push(apply(subst, *child, terms)?);
            }
            Ok(terms.ctor(func, new_children))
        }
        // Int/Str/Triv are already ground; unknown ids pass through.
        _ => Ok(pattern),
    }
}
