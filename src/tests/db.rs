use super::*;
use crate::test_utils::{setup, term};
use smallvec::smallvec;

fn ground(
    s: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> crate::term::TermId {
    term(s, symbols, terms)
}

#[test]
fn insert_new_fact_enqueues_it() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let edge = symbols.intern("edge");
    let a = ground("a", &symbols, &terms);
    let b = ground("b", &symbols, &terms);

    let outcome = db.insert_fact(edge, smallvec![a, b], smallvec![]);
    assert_eq!(outcome, InsertOutcome::Inserted);
    assert!(db.contains_fact(edge, &[a, b], &[]));
    assert_eq!(db.queue_len(), 1);
    assert_eq!(
        db.pop_queue(),
        Some(WorkItem::Fact {
            name: edge,
            args: smallvec![a, b],
            values: smallvec![],
        })
    );
}

#[test]
fn reinsert_is_redundant_and_leaves_queue_alone() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let home = symbols.intern("home");
    let celeste = ground("celeste", &symbols, &terms);
    let uplands = ground("uplands", &symbols, &terms);

    assert_eq!(
        db.insert_fact(home, smallvec![celeste], smallvec![uplands]),
        InsertOutcome::Inserted
    );
    let queue_before = db.queue_len();
    let facts_before = db.fact_count();

    assert_eq!(
        db.insert_fact(home, smallvec![celeste], smallvec![uplands]),
        InsertOutcome::Redundant
    );
    assert_eq!(db.queue_len(), queue_before, "queue must be unchanged");
    assert_eq!(db.fact_count(), facts_before);
}

#[test]
fn conflicting_values_are_inconsistent() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let home = symbols.intern("home");
    let celeste = ground("celeste", &symbols, &terms);
    let uplands = ground("uplands", &symbols, &terms);
    let doghouse = ground("doghouse", &symbols, &terms);

    db.insert_fact(home, smallvec![celeste], smallvec![uplands]);
    match db.insert_fact(home, smallvec![celeste], smallvec![doghouse]) {
        InsertOutcome::Inconsistent { existing } => {
            assert_eq!(existing.as_slice(), &[uplands]);
        }
        other => panic!("expected inconsistency, got {:?}", other),
    }
    // The original mapping survives.
    assert!(db.contains_fact(home, &[celeste], &[uplands]));
}

#[test]
fn one_value_per_key_per_relation() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let color = symbols.intern("color");
    let a = ground("a", &symbols, &terms);
    let b = ground("b", &symbols, &terms);
    let red = ground("red", &symbols, &terms);
    let blue = ground("blue", &symbols, &terms);

    // Different keys may hold different values.
    assert_eq!(
        db.insert_fact(color, smallvec![a], smallvec![red]),
        InsertOutcome::Inserted
    );
    assert_eq!(
        db.insert_fact(color, smallvec![b], smallvec![blue]),
        InsertOutcome::Inserted
    );
    assert_eq!(db.value_of(color, &[a]).unwrap().as_slice(), &[red]);
    assert_eq!(db.value_of(color, &[b]).unwrap().as_slice(), &[blue]);
}

#[test]
fn uninteresting_suppresses_requeueing() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let p = symbols.intern("p");
    let a = ground("a", &symbols, &terms);

    assert_eq!(
        db.insert_uninteresting(p, smallvec![a], smallvec![]),
        InsertOutcome::Inserted
    );
    assert_eq!(db.queue_len(), 0, "uninteresting facts are never enqueued");

    // A matching insertion is redundant and stays off the queue.
    assert_eq!(
        db.insert_fact(p, smallvec![a], smallvec![]),
        InsertOutcome::Redundant
    );
    assert_eq!(db.queue_len(), 0);
}

#[test]
fn uninteresting_conflicts_are_inconsistent() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let f = symbols.intern("f");
    let a = ground("a", &symbols, &terms);
    let one = terms.int(1);
    let two = terms.int(2);

    db.insert_uninteresting(f, smallvec![a], smallvec![one]);
    match db.insert_fact(f, smallvec![a], smallvec![two]) {
        InsertOutcome::Inconsistent { existing } => assert_eq!(existing.as_slice(), &[one]),
        other => panic!("expected inconsistency, got {:?}", other),
    }
}

#[test]
fn extend_prefix_stores_and_enqueues() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let r0 = symbols.intern("r0.0");
    let x = symbols.intern("X");
    let a = ground("a", &symbols, &terms);

    let subst = Subst::new().extended(x, a);
    assert!(db.extend_prefix(r0, subst.clone()));
    assert_eq!(db.substs_for(r0).count(), 1);
    assert_eq!(
        db.pop_queue(),
        Some(WorkItem::Prefix {
            name: r0,
            args: subst,
        })
    );
}

#[test]
fn extend_prefix_deduplicates_equal_substitutions() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let r0 = symbols.intern("r0.0");
    let x = symbols.intern("X");
    let y = symbols.intern("Y");
    let a = ground("a", &symbols, &terms);
    let b = ground("b", &symbols, &terms);

    // Same bindings built in a different order are the same substitution.
    let mut s1 = Subst::new();
    s1.bind(x, a);
    s1.bind(y, b);
    let mut s2 = Subst::new();
    s2.bind(y, b);
    s2.bind(x, a);

    assert!(db.extend_prefix(r0, s1));
    assert!(!db.extend_prefix(r0, s2), "equal substitution is dropped");
    assert_eq!(db.substs_for(r0).count(), 1);
    assert_eq!(db.queue_len(), 1);

    // A genuinely different substitution is stored.
    assert!(db.extend_prefix(r0, Subst::new().extended(x, b)));
    assert_eq!(db.substs_for(r0).count(), 2);
}

#[test]
fn queue_is_fifo() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let p = symbols.intern("p");
    let q = symbols.intern("q");
    let a = ground("a", &symbols, &terms);

    db.insert_fact(p, smallvec![a], smallvec![]);
    db.insert_fact(q, smallvec![a], smallvec![]);

    match db.pop_queue() {
        Some(WorkItem::Fact { name, .. }) => assert_eq!(name, p),
        other => panic!("unexpected item: {:?}", other),
    }
    match db.pop_queue() {
        Some(WorkItem::Fact { name, .. }) => assert_eq!(name, q),
        other => panic!("unexpected item: {:?}", other),
    }
    assert_eq!(db.pop_queue(), None);
    assert!(db.queue_is_empty());
}

#[test]
fn clones_share_no_mutable_state() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let p = symbols.intern("p");
    let a = ground("a", &symbols, &terms);
    let b = ground("b", &symbols, &terms);

    db.insert_fact(p, smallvec![a], smallvec![]);
    let mut fork = db.clone();
    fork.insert_fact(p, smallvec![b], smallvec![]);

    assert_eq!(db.fact_count(), 1);
    assert_eq!(fork.fact_count(), 2);
    assert!(!db.contains_fact(p, &[b], &[]));
}

#[test]
fn dump_lists_queue_then_database() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let edge = symbols.intern("edge");
    let a = ground("a", &symbols, &terms);
    let b = ground("b", &symbols, &terms);
    db.insert_fact(edge, smallvec![a, b], smallvec![]);

    let r0 = symbols.intern("r0.0");
    let x = symbols.intern("X");
    db.extend_prefix(r0, Subst::new().extended(x, a));

    let dump = db.dump(&terms, &symbols).unwrap();
    let queue_at = dump.find("Queue").expect("Queue section");
    let db_at = dump.find("Database").expect("Database section");
    assert!(queue_at < db_at, "Queue section precedes Database section");
    assert!(dump.contains("  edge a b\n"));
    assert!(dump.contains("  r0.0{ a/X }\n"));
}

#[test]
fn dump_sorts_prefix_bindings_by_variable_name() {
    let (symbols, terms) = setup();
    let mut db = Database::new();
    let r0 = symbols.intern("r1.2");
    let z = symbols.intern("Z");
    let aa = symbols.intern("A");
    let one = terms.int(1);
    let two = terms.int(2);

    let mut subst = Subst::new();
    subst.bind(z, one);
    subst.bind(aa, two);
    db.extend_prefix(r0, subst);

    let dump = db.dump(&terms, &symbols).unwrap();
    assert!(
        dump.contains("r1.2{ 2/A, 1/Z }"),
        "bindings sorted by variable name: {}",
        dump
    );
}
