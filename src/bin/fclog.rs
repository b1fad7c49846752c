//! fclog CLI - saturate finite-choice logic programs.
//!
//! Commands:
//! - `fclog run <program> [--dump]` - solve a built-in program
//! - `fclog list` - list built-in programs
//! - `fclog help` - show help
//!
//! Exit code is 0 when at least one saturated model was found, 1 when the
//! program is unsatisfiable, 2 on usage or fatal errors.

use fclog::compile::{CompileError, ProgramBuilder, SourceHead, SourcePremise};
use fclog::driver::Driver;
use fclog::parser::parse_term;
use fclog::prop::{ArgVec, Proposition, ValueVec};
use fclog::rule::Program;
use fclog::symbol::SymbolStore;
use fclog::term::TermStore;

const PROGRAMS: [(&str, &str); 6] = [
    ("reach", "transitive reachability over a four-node chain"),
    ("conflict", "two rules assign one cat conflicting homes"),
    ("choice", "two things, each colored red or blue"),
    ("choice-distinct", "choice plus a constraint forbidding equal colors"),
    ("possibility", "open-world possibility: p may or may not hold"),
    ("shared-home", "inequality constraint: no two cats share a doghouse"),
];

fn main() {
    fclog::trace::init_subscriber();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("run") => {
            let mut name = None;
            let mut dump = false;
            for arg in args {
                match arg.as_str() {
                    "--dump" => dump = true,
                    other if name.is_none() => name = Some(other.to_string()),
                    other => {
                        eprintln!("Unexpected argument: {}", other);
                        std::process::exit(2);
                    }
                }
            }
            let Some(name) = name else {
                eprintln!("Usage: fclog run <program> [--dump]");
                std::process::exit(2);
            };
            run(&name, dump);
        }
        Some("list") => {
            for (name, blurb) in PROGRAMS {
                println!("{:16} {}", name, blurb);
            }
        }
        None | Some("help") | Some("--help") | Some("-h") => print_help(),
        Some(other) => {
            eprintln!("Unknown subcommand: {}", other);
            print_help();
            std::process::exit(2);
        }
    }
}

fn print_help() {
    println!("fclog - saturate finite-choice logic programs\n");
    println!("Usage:");
    println!("  fclog run <program> [--dump]   Solve a built-in program");
    println!("  fclog list                     List built-in programs");
}

fn run(name: &str, dump: bool) {
    let symbols = SymbolStore::new();
    let terms = TermStore::new();

    let program = match build_program(name, &symbols, &terms) {
        Some(Ok(program)) => program,
        Some(Err(err)) => {
            eprintln!("Compile error: {}", err);
            std::process::exit(2);
        }
        None => {
            eprintln!("Unknown program: {} (try `fclog list`)", name);
            std::process::exit(2);
        }
    };

    let solution = match Driver::new(&program, &terms).solve() {
        Ok(solution) => solution,
        Err(err) => {
            eprintln!("Fatal solver error: {}", err);
            std::process::exit(2);
        }
    };

    for (index, model) in solution.models.iter().enumerate() {
        println!("model {}: {} facts", index + 1, model.fact_count());
        if dump {
            match model.dump(&terms, &symbols) {
                Ok(text) => print!("{}", text),
                Err(err) => {
                    eprintln!("Dump error: {}", err);
                    std::process::exit(2);
                }
            }
        }
    }
    println!(
        "{} model(s){}",
        solution.models.len(),
        if solution.complete { "" } else { " (interrupted)" }
    );

    if solution.models.is_empty() {
        std::process::exit(1);
    }
}

fn prop(
    name: &str,
    args: &[&str],
    values: &[&str],
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Proposition {
    let args: ArgVec = args
        .iter()
        .map(|a| parse_term(a, symbols, terms).expect("built-in term"))
        .collect();
    let values: ValueVec = values
        .iter()
        .map(|v| parse_term(v, symbols, terms).expect("built-in term"))
        .collect();
    Proposition::new(symbols.intern(name), args, values)
}

fn build_program(
    name: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Option<Result<Program, CompileError>> {
    let mut builder = ProgramBuilder::new();
    match name {
        "reach" => {
            builder
                .seed(prop("edge", &["a", "b"], &[], symbols, terms))
                .seed(prop("edge", &["b", "c"], &[], symbols, terms))
                .seed(prop("edge", &["c", "d"], &[], symbols, terms))
                .rule(
                    vec![SourcePremise::Prop(prop("edge", &["X", "Y"], &[], symbols, terms))],
                    SourceHead::Fact(prop("path", &["X", "Y"], &[], symbols, terms)),
                )
                .rule(
                    vec![
                        SourcePremise::Prop(prop("edge", &["X", "Y"], &[], symbols, terms)),
                        SourcePremise::Prop(prop("path", &["Y", "Z"], &[], symbols, terms)),
                    ],
                    SourceHead::Fact(prop("path", &["X", "Z"], &[], symbols, terms)),
                );
        }
        "conflict" => {
            builder
                .rule(
                    vec![],
                    SourceHead::Fact(prop("home", &["celeste"], &["uplands"], symbols, terms)),
                )
                .rule(
                    vec![],
                    SourceHead::Fact(prop("home", &["celeste"], &["doghouse"], symbols, terms)),
                );
        }
        "choice" | "choice-distinct" => {
            builder
                .seed(prop("thing", &["a"], &[], symbols, terms))
                .seed(prop("thing", &["b"], &[], symbols, terms))
                .rule(
                    vec![SourcePremise::Prop(prop("thing", &["X"], &[], symbols, terms))],
                    SourceHead::Choice {
                        name: symbols.intern("color"),
                        args: smallvec::smallvec![parse_term("X", symbols, terms).unwrap()],
                        choices: vec![
                            smallvec::smallvec![parse_term("red", symbols, terms).unwrap()],
                            smallvec::smallvec![parse_term("blue", symbols, terms).unwrap()],
                        ],
                        exhaustive: true,
                    },
                );
            if name == "choice-distinct" {
                builder.constraint(vec![
                    SourcePremise::Prop(prop("color", &["a"], &["C"], symbols, terms)),
                    SourcePremise::Prop(prop("color", &["b"], &["C"], symbols, terms)),
                ]);
            }
        }
        "possibility" => {
            builder.rule(
                vec![],
                SourceHead::Choice {
                    name: symbols.intern("p"),
                    args: smallvec::smallvec![],
                    choices: vec![smallvec::smallvec![
                        parse_term("false", symbols, terms).unwrap()
                    ]],
                    exhaustive: false,
                },
            );
        }
        "shared-home" => {
            builder
                .seed(prop("in", &["c1"], &["doghouse"], symbols, terms))
                .seed(prop("in", &["c2"], &["doghouse"], symbols, terms))
                .constraint(vec![
                    SourcePremise::Prop(prop("in", &["X"], &["H"], symbols, terms)),
                    SourcePremise::Prop(prop("in", &["Y"], &["H"], symbols, terms)),
                    SourcePremise::Neq(
                        parse_term("X", symbols, terms).unwrap(),
                        parse_term("Y", symbols, terms).unwrap(),
                    ),
                ]);
        }
        _ => return None,
    }
    Some(builder.build(symbols, terms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_program_compiles() {
        for (name, _) in PROGRAMS {
            let symbols = SymbolStore::new();
            let terms = TermStore::new();
            let program = build_program(name, &symbols, &terms)
                .expect("listed program exists")
                .expect("listed program compiles");
            // Every program has something to do.
            assert!(!program.seed.queue_is_empty());
        }
    }

    #[test]
    fn unknown_program_is_rejected() {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        assert!(build_program("no-such", &symbols, &terms).is_none());
    }

    #[test]
    fn reach_is_satisfiable_and_conflict_is_not() {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let program = build_program("reach", &symbols, &terms).unwrap().unwrap();
        let solution = Driver::new(&program, &terms).solve().unwrap();
        assert_eq!(solution.models.len(), 1);

        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let program = build_program("conflict", &symbols, &terms).unwrap().unwrap();
        let solution = Driver::new(&program, &terms).solve().unwrap();
        assert!(solution.models.is_empty());
    }
}
