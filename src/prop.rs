use crate::subst::{apply, Subst, UnboundVar};
use crate::symbol::{NameId, SymbolStore};
use crate::term::{format_term, TermId, TermStore};
use smallvec::SmallVec;

/// Argument list of a proposition.
pub type ArgVec = SmallVec<[TermId; 4]>;
/// Value tuple of a proposition.
pub type ValueVec = SmallVec<[TermId; 2]>;

/// A proposition: a relation name with argument and value patterns.
///
/// The functional reading is `name(args...) = values...`. A proposition
/// whose args and values are all ground is a fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proposition {
    pub name: NameId,
    pub args: ArgVec,
    pub values: ValueVec,
}

impl Proposition {
    pub fn new(name: NameId, args: ArgVec, values: ValueVec) -> Self {
        Self { name, args, values }
    }

    /// Total arity: arguments plus values.
    pub fn arity(&self) -> usize {
        self.args.len() + self.values.len()
    }
}

/// Ground a proposition by applying a substitution to its args and values.
pub fn apply_proposition(
    subst: &Subst,
    prop: &Proposition,
    terms: &TermStore,
) -> Result<Proposition, UnboundVar> {
    let args = prop
        .args
        .iter()
        .map(|pattern| apply(subst, *pattern, terms))
        .collect::<Result<ArgVec, _>>()?;
    let values = prop
        .values
        .iter()
        .map(|pattern| apply(subst, *pattern, terms))
        .collect::<Result<ValueVec, _>>()?;
    Ok(Proposition::new(prop.name, args, values))
}

/// Render a proposition: `name arg1 ... argn` when values are absent,
/// `name arg1 ... argn = v1 ... vm` otherwise.
pub fn format_proposition(
    prop: &Proposition,
    terms: &TermStore,
    symbols: &SymbolStore,
) -> Result<String, String> {
    format_fact(prop.name, &prop.args, &prop.values, terms, symbols)
}

/// Render a (name, args, values) triple the same way as a proposition.
pub fn format_fact(
    name: NameId,
    args: &[TermId],
    values: &[TermId],
    terms: &TermStore,
    symbols: &SymbolStore,
) -> Result<String, String> {
    let mut out = String::new();
    out.push_str(
        symbols
            .resolve(name)
            .ok_or_else(|| format!("Unknown symbol for relation id {:?}", name))?,
    );
    for arg in args {
        out.push(' ');
        out.push_str(&format_term(*arg, terms, symbols)?);
    }
    if !values.is_empty() {
        out.push_str(" =");
        for value in values {
            out.push(' ');
            out.push_str(&format_term(*value, terms, symbols)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup;
    use smallvec::smallvec;

    #[test]
    fn format_without_values() {
        let (symbols, terms) = setup();
        let prop = Proposition::new(
            symbols.intern("edge"),
            smallvec![
                terms.ctor0(symbols.intern("a")),
                terms.ctor0(symbols.intern("b"))
            ],
            smallvec![],
        );
        assert_eq!(
            format_proposition(&prop, &terms, &symbols).unwrap(),
            "edge a b"
        );
    }

    #[test]
    fn format_with_values() {
        let (symbols, terms) = setup();
        let prop = Proposition::new(
            symbols.intern("home"),
            smallvec![terms.ctor0(symbols.intern("celeste"))],
            smallvec![terms.ctor0(symbols.intern("uplands"))],
        );
        assert_eq!(
            format_proposition(&prop, &terms, &symbols).unwrap(),
            "home celeste = uplands"
        );
    }

    #[test]
    fn format_nested_and_literal_arguments() {
        let (symbols, terms) = setup();
        let pair = terms.ctor(
            symbols.intern("pair"),
            smallvec![terms.int(3), terms.string(symbols.intern("hi"))],
        );
        let prop = Proposition::new(
            symbols.intern("holds"),
            smallvec![pair, terms.triv()],
            smallvec![],
        );
        assert_eq!(
            format_proposition(&prop, &terms, &symbols).unwrap(),
            "holds (pair 3 \"hi\") ()"
        );
    }

    #[test]
    fn apply_grounds_patterns() {
        let (symbols, terms) = setup();
        let x = symbols.intern("X");
        let prop = Proposition::new(
            symbols.intern("color"),
            smallvec![terms.var(x)],
            smallvec![terms.ctor0(symbols.intern("red"))],
        );
        let subst = Subst::new().extended(x, terms.ctor0(symbols.intern("a")));

        let fact = apply_proposition(&subst, &prop, &terms).expect("grounding");
        assert_eq!(fact.args[0], terms.ctor0(symbols.intern("a")));
        assert_eq!(fact.values[0], terms.ctor0(symbols.intern("red")));
        assert_eq!(fact.arity(), 2);
    }

    #[test]
    fn apply_fails_on_unbound_head_variable() {
        let (symbols, terms) = setup();
        let x = symbols.intern("X");
        let prop = Proposition::new(symbols.intern("p"), smallvec![terms.var(x)], smallvec![]);

        let err = apply_proposition(&Subst::new(), &prop, &terms).unwrap_err();
        assert_eq!(err.var, x);
    }
}
