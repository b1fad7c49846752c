//! Lowering of source rules into prefix chains.
//!
//! A source rule is a list of premises and one or more heads. Lowering
//! produces one named position per premise, chained in order, with the last
//! premise position fanning out to one conclusion position per head. Every
//! rule's entry position is seeded with the empty substitution, so a rule
//! with no premises fires exactly once.
//!
//! Equality premises are resolved here, not at run time: `V == t` with `V`
//! fresh aliases `V` to `t` throughout the rule, and a ground left side is
//! matched against the right side. Equality of two run-time values is
//! expressed by using one shared variable.

use crate::db::{Database, InsertOutcome};
use crate::matching::match_term;
use crate::prop::{ArgVec, Proposition, ValueVec};
use crate::rule::{Conclusion, PartialRule, Premise, Program};
use crate::subst::Subst;
use crate::symbol::{NameId, SymbolStore};
use crate::term::{assert_ground, free_vars, Term, TermId, TermStore};
use smallvec::SmallVec;

/// A premise as written in a source rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePremise {
    /// Match a proposition against the fact store.
    Prop(Proposition),
    /// Require two bound terms to differ at run time.
    Neq(TermId, TermId),
    /// Compile-time equality, resolved by aliasing.
    Eq(TermId, TermId),
}

/// A head as written in a source rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHead {
    /// Assert a single fact (an exhaustive choice with one alternative).
    Fact(Proposition),
    /// Assert one fact from an enumerated set of value alternatives.
    Choice {
        name: NameId,
        args: ArgVec,
        choices: Vec<ValueVec>,
        exhaustive: bool,
    },
    /// The rule is an integrity constraint.
    Forbid,
}

#[derive(Debug, Clone)]
struct SourceRule {
    premises: Vec<SourcePremise>,
    heads: Vec<SourceHead>,
}

/// Static errors raised during lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A head references a variable no premise binds.
    UndefinedVariableInHead(String),
    /// An inequality references a variable no earlier premise binds.
    UndefinedVariableInInequality(String),
    /// An equality's left side is neither a variable nor ground.
    UngroundEqualityLhs(String),
    /// A seed fact contains a variable.
    UngroundSeedFact(String),
    /// Two seed facts give one argument list different values.
    ConflictingSeedFact(String),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UndefinedVariableInHead(var) => {
                write!(f, "head references undefined variable {}", var)
            }
            CompileError::UndefinedVariableInInequality(var) => {
                write!(f, "inequality references undefined variable {}", var)
            }
            CompileError::UngroundEqualityLhs(var) => {
                write!(
                    f,
                    "left side of equality is not ground (variable {})",
                    var
                )
            }
            CompileError::UngroundSeedFact(var) => {
                write!(f, "seed fact contains variable {}", var)
            }
            CompileError::ConflictingSeedFact(name) => {
                write!(f, "seed facts assign conflicting values to {}", name)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Accumulates source rules and seed facts, then lowers them into a
/// [`Program`].
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    rules: Vec<SourceRule>,
    seeds: Vec<Proposition>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ground seed fact.
    pub fn seed(&mut self, fact: Proposition) -> &mut Self {
        self.seeds.push(fact);
        self
    }

    /// Add a rule with a single head.
    pub fn rule(&mut self, premises: Vec<SourcePremise>, head: SourceHead) -> &mut Self {
        self.rules.push(SourceRule {
            premises,
            heads: vec![head],
        });
        self
    }

    /// Add a rule whose premise chain fans out to several heads.
    pub fn rule_fanout(
        &mut self,
        premises: Vec<SourcePremise>,
        heads: Vec<SourceHead>,
    ) -> &mut Self {
        self.rules.push(SourceRule { premises, heads });
        self
    }

    /// Add an integrity constraint: a rule whose firing is a contradiction.
    pub fn constraint(&mut self, premises: Vec<SourcePremise>) -> &mut Self {
        self.rule(premises, SourceHead::Forbid)
    }

    /// Lower all rules and seeds into a program.
    pub fn build(
        &self,
        symbols: &SymbolStore,
        terms: &TermStore,
    ) -> Result<Program, CompileError> {
        let mut program = Program::new(Database::new());

        for (index, rule) in self.rules.iter().enumerate() {
            lower_rule(index, rule, &mut program, symbols, terms)?;
        }

        for fact in &self.seeds {
            for pattern in fact.args.iter().chain(fact.values.iter()) {
                assert_ground(*pattern, terms)
                    .map_err(|e| CompileError::UngroundSeedFact(var_name(symbols, e.var)))?;
            }
            match program
                .seed
                .insert_fact(fact.name, fact.args.clone(), fact.values.clone())
            {
                InsertOutcome::Inconsistent { .. } => {
                    return Err(CompileError::ConflictingSeedFact(
                        symbols.resolve(fact.name).unwrap_or("?").to_string(),
                    ));
                }
                InsertOutcome::Inserted | InsertOutcome::Redundant => {}
            }
        }

        Ok(program)
    }
}

fn var_name(symbols: &SymbolStore, var: NameId) -> String {
    symbols.resolve(var).unwrap_or("?").to_string()
}

/// Variable aliases collected from equality premises. Targets never contain
/// aliased variables, so one rewriting pass is complete.
#[derive(Debug, Default)]
struct AliasMap {
    entries: Vec<(NameId, TermId)>,
}

impl AliasMap {
    fn get(&self, var: NameId) -> Option<TermId> {
        self.entries
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, t)| *t)
    }

    fn insert(&mut self, var: NameId, target: TermId, terms: &TermStore) {
        if terms.is_var(target) == Some(var) {
            return; // X == X is trivially true
        }
        let target = rewrite(target, self, terms);
        for idx in 0..self.entries.len() {
            let old = self.entries[idx].1;
            let single = AliasMap {
                entries: vec![(var, target)],
            };
            self.entries[idx].1 = rewrite(old, &single, terms);
        }
        self.entries.push((var, target));
    }
}

/// Replace aliased variables in a pattern.
fn rewrite(term: TermId, aliases: &AliasMap, terms: &TermStore) -> TermId {
    match terms.resolve(term) {
        Some(Term::Var(var)) => aliases.get(var).unwrap_or(term),
        Some(Term::Ctor(func, children)) => {
            let mut new_children: SmallVec<[TermId; 4]> = SmallVec::with_capacity(children.len());
            for child in children.iter() {
                new_children.push(rewrite(*child, aliases, terms));
            }
            terms.ctor(func, new_children)
        }
        _ => term,
    }
}

fn rewrite_proposition(prop: &Proposition, aliases: &AliasMap, terms: &TermStore) -> Proposition {
    Proposition::new(
        prop.name,
        prop.args
            .iter()
            .map(|t| rewrite(*t, aliases, terms))
            .collect(),
        prop.values
            .iter()
            .map(|t| rewrite(*t, aliases, terms))
            .collect(),
    )
}

fn lower_rule(
    index: usize,
    rule: &SourceRule,
    program: &mut Program,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<(), CompileError> {
    // Resolve equality premises into aliases first. A ground-vs-ground
    // mismatch means the rule can never fire; it is dropped entirely.
    let mut aliases = AliasMap::default();
    for premise in &rule.premises {
        let SourcePremise::Eq(a, b) = premise else {
            continue;
        };
        let a = rewrite(*a, &aliases, terms);
        let b = rewrite(*b, &aliases, terms);
        if let Some(var) = terms.is_var(a) {
            aliases.insert(var, b, terms);
        } else if let Some(var) = free_vars(a, terms).first().copied() {
            return Err(CompileError::UngroundEqualityLhs(var_name(symbols, var)));
        } else {
            // Ground left side: match the right side against it.
            match match_term(&Subst::new(), b, a, terms) {
                Some(bindings) => {
                    for (var, data) in bindings.iter() {
                        aliases.insert(var, data, terms);
                    }
                }
                None => return Ok(()), // can never hold; rule is vacuous
            }
        }
    }

    // Walk the remaining premises in order, tracking bound variables.
    let mut bound: Vec<NameId> = Vec::new();
    let mut chain: Vec<(Premise, SmallVec<[NameId; 4]>)> = Vec::new();
    for premise in &rule.premises {
        match premise {
            SourcePremise::Prop(prop) => {
                let prop = rewrite_proposition(prop, &aliases, terms);
                let mut premise_vars: Vec<NameId> = Vec::new();
                for pattern in prop.args.iter().chain(prop.values.iter()) {
                    for var in free_vars(*pattern, terms) {
                        if !premise_vars.contains(&var) {
                            premise_vars.push(var);
                        }
                    }
                }
                let shared: SmallVec<[NameId; 4]> = premise_vars
                    .iter()
                    .copied()
                    .filter(|var| bound.contains(var))
                    .collect();
                for var in premise_vars {
                    if !bound.contains(&var) {
                        bound.push(var);
                    }
                }
                chain.push((Premise::Prop(prop), shared));
            }
            SourcePremise::Neq(a, b) => {
                let a = rewrite(*a, &aliases, terms);
                let b = rewrite(*b, &aliases, terms);
                let mut guard_vars: SmallVec<[NameId; 4]> = SmallVec::new();
                for pattern in [a, b] {
                    for var in free_vars(pattern, terms) {
                        if !guard_vars.contains(&var) {
                            guard_vars.push(var);
                        }
                    }
                }
                for var in guard_vars.iter() {
                    if !bound.contains(var) {
                        return Err(CompileError::UndefinedVariableInInequality(var_name(
                            symbols, *var,
                        )));
                    }
                }
                chain.push((Premise::Neq { a, b }, guard_vars));
            }
            SourcePremise::Eq(_, _) => {} // already resolved
        }
    }

    // Validate and lower the heads.
    let mut conclusions: Vec<Conclusion> = Vec::new();
    for head in &rule.heads {
        let conclusion = match head {
            SourceHead::Fact(prop) => {
                let prop = rewrite_proposition(prop, &aliases, terms);
                check_head_vars(prop.args.iter().chain(prop.values.iter()), &bound, symbols, terms)?;
                Conclusion::Choice {
                    name: prop.name,
                    args: prop.args.clone(),
                    choices: vec![prop.values.clone()],
                    exhaustive: true,
                }
            }
            SourceHead::Choice {
                name,
                args,
                choices,
                exhaustive,
            } => {
                let args: ArgVec = args.iter().map(|t| rewrite(*t, &aliases, terms)).collect();
                let choices: Vec<ValueVec> = choices
                    .iter()
                    .map(|choice| choice.iter().map(|t| rewrite(*t, &aliases, terms)).collect())
                    .collect();
                check_head_vars(
                    args.iter().chain(choices.iter().flatten()),
                    &bound,
                    symbols,
                    terms,
                )?;
                Conclusion::Choice {
                    name: *name,
                    args,
                    choices,
                    exhaustive: *exhaustive,
                }
            }
            SourceHead::Forbid => Conclusion::Contradiction,
        };
        conclusions.push(conclusion);
    }

    // Emit named positions: premises first, then one position per head.
    let premise_count = chain.len();
    let positions: Vec<NameId> = (0..premise_count + conclusions.len())
        .map(|j| symbols.intern(&format!("r{}.{}", index, j)))
        .collect();
    let head_positions: SmallVec<[NameId; 2]> =
        positions[premise_count..].iter().copied().collect();

    for (j, (premise, shared)) in chain.into_iter().enumerate() {
        let next = if j + 1 < premise_count {
            SmallVec::from_slice(&[positions[j + 1]])
        } else {
            head_positions.clone()
        };
        program.rules.insert(
            positions[j],
            PartialRule {
                premise,
                shared,
                next,
            },
        );
    }
    for (k, conclusion) in conclusions.into_iter().enumerate() {
        program
            .conclusions
            .insert(positions[premise_count + k], conclusion);
    }

    // Seed the entry: the first premise position, or every conclusion
    // directly when the rule has no premises.
    if premise_count > 0 {
        program.seed.extend_prefix(positions[0], Subst::new());
    } else {
        for position in head_positions {
            program.seed.extend_prefix(position, Subst::new());
        }
    }

    Ok(())
}

fn check_head_vars<'a>(
    patterns: impl Iterator<Item = &'a TermId>,
    bound: &[NameId],
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<(), CompileError> {
    for pattern in patterns {
        for var in free_vars(*pattern, terms) {
            if !bound.contains(&var) {
                return Err(CompileError::UndefinedVariableInHead(var_name(
                    symbols, var,
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/compile.rs"]
mod tests;
