use lasso::{Spur, ThreadedRodeo};

/// A unique identifier for an interned name.
/// Relation names, constructor names, variable names, and string literal
/// contents all share one interner, so equality is a single integer compare.
pub type NameId = Spur;

/// Thread-safe symbol store for interning names.
///
/// Guarantees:
/// - Same string always produces same NameId
/// - Different strings always produce different NameIds
/// - NameId can be resolved back to the original string
pub struct SymbolStore {
    rodeo: ThreadedRodeo,
}

impl SymbolStore {
    /// Create a new empty symbol store.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a name, returning its unique NameId.
    /// If the name was already interned, returns the existing NameId.
    pub fn intern(&self, name: &str) -> NameId {
        self.rodeo.get_or_intern(name)
    }

    /// Resolve a NameId back to its string representation.
    /// Returns None if the NameId was not created by this store.
    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.rodeo.try_resolve(&id)
    }

    /// Check if a name has already been interned.
    pub fn contains(&self, name: &str) -> bool {
        self.rodeo.contains(name)
    }

    /// Get the NameId for a name if it exists, without interning.
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.rodeo.get(name)
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}
