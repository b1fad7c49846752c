use super::*;
use crate::subst::apply;
use crate::test_utils::{setup, term};

#[test]
fn unbound_variable_captures_data() {
    let (symbols, terms) = setup();
    let pattern = term("X", &symbols, &terms);
    let data = term("a", &symbols, &terms);

    let subst = match_term(&Subst::new(), pattern, data, &terms).expect("should match");
    assert_eq!(subst.get(symbols.intern("X")), Some(data));
}

#[test]
fn bound_variable_must_agree() {
    let (symbols, terms) = setup();
    let x = symbols.intern("X");
    let a = term("a", &symbols, &terms);
    let b = term("b", &symbols, &terms);
    let pattern = terms.var(x);

    let bound = Subst::new().extended(x, a);
    assert!(match_term(&bound, pattern, a, &terms).is_some());
    assert!(match_term(&bound, pattern, b, &terms).is_none());
}

#[test]
fn constructor_names_and_arity_must_agree() {
    let (symbols, terms) = setup();
    let empty = Subst::new();

    let p = term("f X", &symbols, &terms);
    assert!(match_term(&empty, p, term("f a", &symbols, &terms), &terms).is_some());
    assert!(match_term(&empty, p, term("g a", &symbols, &terms), &terms).is_none());
    assert!(match_term(&empty, p, term("f a b", &symbols, &terms), &terms).is_none());
    assert!(match_term(&empty, p, term("f", &symbols, &terms), &terms).is_none());
}

#[test]
fn literals_match_only_themselves() {
    let (symbols, terms) = setup();
    let empty = Subst::new();

    assert!(match_term(&empty, terms.int(3), terms.int(3), &terms).is_some());
    assert!(match_term(&empty, terms.int(3), terms.int(4), &terms).is_none());

    let s1 = term("\"cat\"", &symbols, &terms);
    let s2 = term("\"dog\"", &symbols, &terms);
    assert!(match_term(&empty, s1, s1, &terms).is_some());
    assert!(match_term(&empty, s1, s2, &terms).is_none());

    assert!(match_term(&empty, terms.triv(), terms.triv(), &terms).is_some());
    assert!(match_term(&empty, terms.triv(), terms.int(0), &terms).is_none());
}

#[test]
fn repeated_variable_enforces_equality() {
    let (symbols, terms) = setup();
    let pattern = term("pair X X", &symbols, &terms);

    assert!(match_term(
        &Subst::new(),
        pattern,
        term("pair a a", &symbols, &terms),
        &terms
    )
    .is_some());
    assert!(match_term(
        &Subst::new(),
        pattern,
        term("pair a b", &symbols, &terms),
        &terms
    )
    .is_none());
}

#[test]
fn nested_patterns_bind_deep_variables() {
    let (symbols, terms) = setup();
    let pattern = term("edge (node X) (node Y)", &symbols, &terms);
    let data = term("edge (node a) (node b)", &symbols, &terms);

    let subst = match_term(&Subst::new(), pattern, data, &terms).expect("should match");
    assert_eq!(
        subst.get(symbols.intern("X")),
        Some(term("a", &symbols, &terms))
    );
    assert_eq!(
        subst.get(symbols.intern("Y")),
        Some(term("b", &symbols, &terms))
    );
}

#[test]
fn match_then_apply_reproduces_data() {
    let (symbols, terms) = setup();
    let pattern = term("triple X (wrap Y) X", &symbols, &terms);
    let data = term("triple 1 (wrap \"v\") 1", &symbols, &terms);

    let subst = match_term(&Subst::new(), pattern, data, &terms).expect("should match");
    let rebuilt = apply(&subst, pattern, &terms).expect("apply should succeed");
    assert_eq!(rebuilt, data, "apply after match must reproduce the data");
}

#[test]
fn slices_thread_bindings_across_positions() {
    let (symbols, terms) = setup();
    let x = term("X", &symbols, &terms);
    let y = term("Y", &symbols, &terms);
    let a = term("a", &symbols, &terms);
    let b = term("b", &symbols, &terms);

    // Patterns [X, Y, X] against [a, b, a] bind X=a, Y=b.
    let subst = match_slices(&Subst::new(), &[x, y, x], &[a, b, a], &terms).expect("match");
    assert_eq!(subst.get(symbols.intern("X")), Some(a));
    assert_eq!(subst.get(symbols.intern("Y")), Some(b));

    // [X, X] against [a, b] fails on the second position.
    assert!(match_slices(&Subst::new(), &[x, x], &[a, b], &terms).is_none());
}

#[test]
fn slices_fail_on_arity_mismatch() {
    let (symbols, terms) = setup();
    let x = term("X", &symbols, &terms);
    let a = term("a", &symbols, &terms);

    assert!(match_slices(&Subst::new(), &[x], &[a, a], &terms).is_none());
    assert!(match_slices(&Subst::new(), &[x, x], &[a], &terms).is_none());
    assert!(match_slices(&Subst::new(), &[], &[], &terms).is_some());
}

#[test]
fn failed_match_leaves_input_subst_unchanged() {
    let (symbols, terms) = setup();
    let x = symbols.intern("X");
    let a = term("a", &symbols, &terms);
    let base = Subst::new().extended(x, a);

    let pattern = term("f X", &symbols, &terms);
    let data = term("g a", &symbols, &terms);
    assert!(match_term(&base, pattern, data, &terms).is_none());
    assert_eq!(base.get(x), Some(a), "caller's substitution is untouched");
}
