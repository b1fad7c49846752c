//! First-order one-way matching of patterns against ground data.
//!
//! Matching threads a substitution: a bound variable must agree with the
//! data it meets, an unbound variable captures it. Patterns only ever match
//! ground data, never other patterns, so there is no occurs check.

use crate::subst::Subst;
use crate::term::{Term, TermId, TermStore};
use smallvec::SmallVec;

/// Match a single pattern against ground data, extending `subst`.
/// Returns the extended substitution, or None on mismatch.
pub fn match_term(
    subst: &Subst,
    pattern: TermId,
    data: TermId,
    terms: &TermStore,
) -> Option<Subst> {
    let mut out = subst.clone();
    if match_into(&mut out, pattern, data, terms) {
        Some(out)
    } else {
        None
    }
}

/// Match parallel pattern/data lists pointwise, threading the substitution.
/// Fails on arity mismatch.
pub fn match_slices(
    subst: &Subst,
    patterns: &[TermId],
    data: &[TermId],
    terms: &TermStore,
) -> Option<Subst> {
    if patterns.len() != data.len() {
        return None;
    }
    let mut out = subst.clone();
    for (pattern, datum) in patterns.iter().zip(data.iter()) {
        if !match_into(&mut out, *pattern, *datum, terms) {
            return None;
        }
    }
    Some(out)
}

/// Worklist matcher over hashconsed terms.
///
/// Identical TermIds are identical ground terms, so `pattern == data` short
/// circuits and bound-variable agreement is a single id compare.
fn match_into(subst: &mut Subst, pattern: TermId, data: TermId, terms: &TermStore) -> bool {
    let mut worklist: SmallVec<[(TermId, TermId); 16]> = SmallVec::new();
    worklist.push((pattern, data));

    while let Some((p, d)) = worklist.pop() {
        if p == d {
            continue;
        }
        match (terms.resolve(p), terms.resolve(d)) {
            (Some(Term::Var(name)), _) => match subst.get(name) {
                Some(bound) => {
                    if bound != d {
                        return false;
                    }
                }
                None => subst.bind(name, d),
            },
            (Some(Term::Ctor(f, ps)), Some(Term::Ctor(g, ds))) => {
                if f != g || ps.len() != ds.len() {
                    return false;
                }
                for pair in ps.iter().copied().zip(ds.iter().copied()) {
                    worklist.push(pair);
                }
            }
            (Some(Term::Int(a)), Some(Term::Int(b))) => {
                if a != b {
                    return false;
                }
            }
            (Some(Term::Str(a)), Some(Term::Str(b))) => {
                if a != b {
                    return false;
                }
            }
            (Some(Term::Triv), Some(Term::Triv)) => {}
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
#[path = "tests/matching.rs"]
mod tests;
