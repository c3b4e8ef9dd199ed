mod common;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use cmpset::{NaturalOrder, Position, ReverseOrder, Set, Violation};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Values in a range narrow enough to make collisions common.
fn value_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

fn forward<T: Copy, C>(set: &Set<T, C>) -> Vec<T> {
    let mut out = Vec::with_capacity(set.len());
    let mut pos = set.first();
    while let Some(v) = set.get(pos) {
        out.push(*v);
        pos = set.next(pos);
    }
    assert_eq!(pos, Position::AfterLast);
    out
}

fn backward<T: Copy, C>(set: &Set<T, C>) -> Vec<T> {
    let mut out = Vec::with_capacity(set.len());
    let mut pos = set.last();
    while let Some(v) = set.get(pos) {
        out.push(*v);
        pos = set.previous(pos);
    }
    assert_eq!(pos, Position::BeforeFirst);
    out
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Take(i64),
    Find(i64),
    RemoveNode(i64),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        6 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        1 => value_strategy().prop_map(SetOp::Take),
        2 => value_strategy().prop_map(SetOp::Find),
        1 => value_strategy().prop_map(SetOp::RemoveNode),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
        1 => Just(SetOp::PopFirst),
        1 => Just(SetOp::PopLast),
    ]
}

fn apply(set: &mut Set<i64>, model: &mut BTreeSet<i64>, op: &SetOp) -> Result<(), TestCaseError> {
    match *op {
        SetOp::Insert(v) => {
            prop_assert_eq!(set.insert(v), model.insert(v), "insert({})", v);
        }
        SetOp::Remove(v) => {
            prop_assert_eq!(set.remove(&v), model.remove(&v), "remove({})", v);
        }
        SetOp::Take(v) => {
            prop_assert_eq!(set.take(&v), model.take(&v), "take({})", v);
        }
        SetOp::Find(v) => {
            prop_assert_eq!(set.find(&v), model.get(&v), "find({})", v);
            prop_assert_eq!(set.contains(&v), model.contains(&v), "contains({})", v);
        }
        SetOp::RemoveNode(v) => {
            let pos = set.find_node(&v);
            prop_assert_eq!(set.remove_node(pos), model.remove(&v), "remove_node({})", v);
        }
        SetOp::First => {
            prop_assert_eq!(set.get(set.first()), model.first(), "first()");
        }
        SetOp::Last => {
            prop_assert_eq!(set.get(set.last()), model.last(), "last()");
        }
        SetOp::PopFirst => {
            prop_assert_eq!(set.pop_first(), model.pop_first(), "pop_first()");
        }
        SetOp::PopLast => {
            prop_assert_eq!(set.pop_last(), model.pop_last(), "pop_last()");
        }
    }
    prop_assert_eq!(set.len(), model.len(), "len mismatch after {:?}", op);
    prop_assert_eq!(set.is_empty(), model.is_empty(), "is_empty mismatch after {:?}", op);
    Ok(())
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on both `Set` and `BTreeSet` and compares every
    /// result.
    #[test]
    fn set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        common::init_tracing();
        let mut set: Set<i64> = Set::new(NaturalOrder);
        let mut model = BTreeSet::new();

        for op in &ops {
            apply(&mut set, &mut model, op)?;
        }

        prop_assert_eq!(set.validate(), Ok(()));
        prop_assert_eq!(forward(&set), model.iter().copied().collect::<Vec<_>>());
    }

    /// Checks the tree's shape after every single mutation on a small key space, where splits
    /// and merges happen constantly.
    #[test]
    fn invariants_hold_after_every_operation(
        ops in proptest::collection::vec(set_op_strategy(), 0..600),
    ) {
        let mut set: Set<i64> = Set::new(NaturalOrder);
        let mut model = BTreeSet::new();

        for op in &ops {
            let op = match *op {
                SetOp::Insert(v) => SetOp::Insert(v % 64),
                SetOp::Remove(v) => SetOp::Remove(v % 64),
                SetOp::Take(v) => SetOp::Take(v % 64),
                SetOp::Find(v) => SetOp::Find(v % 64),
                SetOp::RemoveNode(v) => SetOp::RemoveNode(v % 64),
                ref other => other.clone(),
            };
            apply(&mut set, &mut model, &op)?;
            prop_assert_eq!(set.validate(), Ok(()), "after {:?}", op);
        }
    }

    /// Cursor walks, iterators and `visit` all agree with `BTreeSet` order.
    #[test]
    fn traversals_match_btreeset(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let set: Set<i64> = values.iter().copied().collect();
        let model: BTreeSet<i64> = values.iter().copied().collect();
        let expected: Vec<i64> = model.iter().copied().collect();
        let reversed: Vec<i64> = model.iter().rev().copied().collect();

        prop_assert_eq!(&forward(&set), &expected, "cursor forward");
        prop_assert_eq!(&backward(&set), &reversed, "cursor backward");
        prop_assert_eq!(&set.iter().copied().collect::<Vec<_>>(), &expected, "iter()");
        prop_assert_eq!(&set.iter().rev().copied().collect::<Vec<_>>(), &reversed, "iter().rev()");
        prop_assert_eq!(set.iter().len(), expected.len());

        let mut visited = Vec::new();
        set.visit(|v| visited.push(*v));
        prop_assert_eq!(&visited, &expected, "visit()");

        prop_assert_eq!(set.into_iter().collect::<Vec<_>>(), expected, "into_iter()");
    }

    /// Any insertion order followed by any removal order leaves the set empty.
    #[test]
    fn insert_then_remove_permutations_empty_the_set(
        (inserts, removals) in proptest::collection::hash_set(value_strategy(), 0..800)
            .prop_flat_map(|values| {
                let values: Vec<i64> = values.into_iter().collect();
                (Just(values.clone()).prop_shuffle(), Just(values).prop_shuffle())
            }),
    ) {
        let mut set = Set::new(NaturalOrder);
        for &v in &inserts {
            prop_assert!(set.insert(v));
        }
        prop_assert_eq!(set.len(), inserts.len());

        for v in &removals {
            prop_assert!(set.remove(v), "remove({})", v);
            prop_assert!(set.find(v).is_none());
        }
        prop_assert!(set.is_empty());
        prop_assert_eq!(set.first(), Position::AfterLast);
        prop_assert_eq!(set.depth(), 0);
        prop_assert_eq!(set.validate(), Ok(()));
    }

    /// A reversing comparator produces the mirror image of natural order.
    #[test]
    fn reverse_order_mirrors_natural_order(values in proptest::collection::vec(value_strategy(), 0..1_000)) {
        let natural: Set<i64> = values.iter().copied().collect();
        let mut reverse: Set<i64, ReverseOrder> = Set::new(ReverseOrder);
        reverse.extend(&values);

        let mut mirrored = forward(&natural);
        mirrored.reverse();
        prop_assert_eq!(forward(&reverse), mirrored);
        prop_assert!(reverse.is_proper());
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn eight_ascending_inserts_split_the_root() {
    common::init_tracing();
    let mut set = Set::new(NaturalOrder);
    for v in 1..=8 {
        assert!(set.insert(v));
    }

    assert_eq!(set.len(), 8);
    assert_eq!(set.depth(), 2);
    assert_eq!(set.get(set.first()), Some(&1));
    assert_eq!(set.get(set.last()), Some(&8));
    assert_eq!(forward(&set), (1..=8).collect::<Vec<_>>());
    assert_eq!(set.validate(), Ok(()));
}

#[test]
fn removing_the_root_separator_keeps_order() {
    let mut set = Set::from([10, 20, 30, 40, 50]);
    assert!(set.remove(&30));

    assert_eq!(set.find(&30), None);
    assert_eq!(set.len(), 4);
    assert_eq!(forward(&set), [10, 20, 40, 50]);
    assert_eq!(set.validate(), Ok(()));
}

#[test]
fn comparator_decides_membership() {
    let mut set = Set::new(|a: &String, b: &String| a.to_lowercase().cmp(&b.to_lowercase()));
    assert!(set.insert("Tokyo".to_owned()));
    assert!(set.insert("lima".to_owned()));
    assert!(!set.insert("TOKYO".to_owned()));

    assert_eq!(set.len(), 2);
    assert_eq!(set.find(&"tokyo".to_owned()).map(String::as_str), Some("TOKYO"));
    assert_eq!(
        set.iter().map(String::as_str).collect::<Vec<_>>(),
        ["lima", "TOKYO"]
    );
}

#[test]
fn cursor_boundaries() {
    let empty: Set<i32> = Set::default();
    assert_eq!(empty.first(), Position::AfterLast);
    assert_eq!(empty.last(), Position::BeforeFirst);

    let set = Set::from([1, 2, 3]);
    assert_eq!(set.previous(set.first()), Position::BeforeFirst);
    assert_eq!(set.next(set.last()), Position::AfterLast);
    assert_eq!(set.next(Position::BeforeFirst), set.first());
    assert_eq!(set.previous(Position::AfterLast), set.last());
    assert_eq!(set.find_node(&4), Position::AfterLast);
    assert!(set.find_node(&4).is_boundary());
    assert_eq!(set.get(Position::BeforeFirst), None);
}

#[test]
#[should_panic(expected = "`position` is a boundary!")]
fn node_value_rejects_boundaries() {
    let set = Set::from([1, 2, 3]);
    let _ = set.node_value(set.next(set.last()));
}

#[test]
#[should_panic(expected = "`Set::node_value()` - `position` does not refer to a member of this set!")]
fn position_of_a_removed_element_panics_after_its_slot_is_reused() {
    let mut set = Set::new(NaturalOrder);
    set.extend([1, 2, 3]);
    let two = set.find_node(&2);
    assert!(set.remove(&2));
    assert!(set.insert(99));

    let _ = set.node_value(two);
}

#[test]
#[should_panic(expected = "`Set::next()` - `position` does not refer to a member of this set!")]
fn position_from_another_set_panics() {
    let a = Set::from([1, 2, 3]);
    let b = Set::from([10, 20, 30]);

    let _ = b.next(a.find_node(&2));
}

#[test]
fn positions_survive_other_removals_and_inserts() {
    let mut set: Set<i64> = (0..50).collect();
    let kept = set.find_node(&25);
    for v in (0..50).filter(|v| v % 5 != 0) {
        set.remove(&v);
    }
    set.extend(100..150);

    assert_eq!(set.node_value(kept), &25);
    assert_eq!(set.get(set.next(kept)), Some(&30));
    assert_eq!(set.find_node(&25), kept);
}

#[test]
fn validate_reports_a_broken_comparator() {
    // The comparator flips once the set has been built, so stored order no longer matches it.
    let flipped = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&flipped);
    let mut set = Set::new(move |a: &i32, b: &i32| {
        if *flag.lock().unwrap() { b.cmp(a) } else { a.cmp(b) }
    });
    set.extend(0..3);
    assert!(set.is_proper());

    *flipped.lock().unwrap() = true;
    assert_eq!(set.validate(), Err(Violation::Unsorted { depth: 0, index: 1 }));
    assert!(!set.is_proper());
}

// ─── Destructor accounting ───────────────────────────────────────────────────

/// A keyed record: the set orders by `key` only, so records with equal keys displace each
/// other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Record {
    key: u32,
    id: u32,
}

fn by_key(a: &Record, b: &Record) -> Ordering {
    a.key.cmp(&b.key)
}

fn recording_set() -> (Set<Record, fn(&Record, &Record) -> Ordering>, Arc<Mutex<Vec<u32>>>) {
    let released = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&released);
    let set = Set::with_destroy(by_key as fn(&Record, &Record) -> Ordering, move |r: Record| {
        log.lock().unwrap().push(r.id);
    });
    (set, released)
}

#[test]
fn destructor_receives_the_displaced_record() {
    let (mut set, released) = recording_set();
    assert!(set.insert(Record { key: 1, id: 100 }));
    assert!(!set.insert(Record { key: 1, id: 101 }));

    assert_eq!(*released.lock().unwrap(), [100]);
    assert_eq!(set.find(&Record { key: 1, id: 0 }).map(|r| r.id), Some(101));
}

#[test]
fn destructor_runs_once_per_released_element() {
    let (mut set, released) = recording_set();
    for key in 0..40 {
        set.insert(Record { key, id: key });
    }

    assert!(set.remove(&Record { key: 7, id: 0 }));
    assert!(!set.remove(&Record { key: 7, id: 0 }));
    assert!(set.remove_node(set.find_node(&Record { key: 8, id: 0 })));
    assert_eq!(*released.lock().unwrap(), [7, 8]);

    // Handed back to the caller, not destroyed.
    assert_eq!(set.take(&Record { key: 9, id: 0 }).map(|r| r.id), Some(9));
    assert_eq!(set.pop_first().map(|r| r.id), Some(0));
    assert_eq!(released.lock().unwrap().len(), 2);

    set.destroy();
    let mut all = released.lock().unwrap().clone();
    all.sort_unstable();
    let expected: Vec<u32> = (1..40).filter(|&k| k != 9).collect();
    assert_eq!(all, expected);
}

#[test]
fn into_iter_takes_elements_as_it_goes() {
    let (mut set, released) = recording_set();
    for key in 0..30 {
        set.insert(Record { key, id: key });
    }

    let mut iter = set.into_iter();
    assert_eq!(iter.len(), 30);
    assert_eq!(iter.next().map(|r| r.id), Some(0));
    assert_eq!(iter.next_back().map(|r| r.id), Some(29));
    assert_eq!(iter.len(), 28);
    assert_eq!(iter.by_ref().take(3).map(|r| r.id).collect::<Vec<_>>(), [1, 2, 3]);

    // The rest is dropped without reaching the destructor.
    drop(iter);
    assert!(released.lock().unwrap().is_empty());
}

#[test]
fn capacity_constructors() {
    let released = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&released);
    let mut set = Set::with_capacity_and_destroy(NaturalOrder, 64, move |_: i32| {
        *counter.lock().unwrap() += 1;
    });
    assert!(set.capacity() >= 64);

    set.extend(0..64);
    assert!(set.capacity() >= 64);
    set.clear();
    assert_eq!(*released.lock().unwrap(), 64);
    assert!(set.is_empty());
}
