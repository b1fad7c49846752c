use crate::parser::parse_term;
use crate::prop::{ArgVec, Proposition, ValueVec};
use crate::symbol::SymbolStore;
use crate::term::{TermId, TermStore};

pub(crate) fn setup() -> (SymbolStore, TermStore) {
    (SymbolStore::new(), TermStore::new())
}

/// Parse a term in the surface syntax, panicking on error.
pub(crate) fn term(input: &str, symbols: &SymbolStore, terms: &TermStore) -> TermId {
    parse_term(input, symbols, terms).expect("test term should parse")
}

/// Build a proposition from surface-syntax argument and value terms.
pub(crate) fn prop(
    name: &str,
    args: &[&str],
    values: &[&str],
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Proposition {
    let args: ArgVec = args.iter().map(|a| term(a, symbols, terms)).collect();
    let values: ValueVec = values.iter().map(|v| term(v, symbols, terms)).collect();
    Proposition::new(symbols.intern(name), args, values)
}
