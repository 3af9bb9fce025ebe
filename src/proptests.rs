use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

type Entry = (u16, u64);

fn entry_key(entry: &Entry) -> u16 {
    entry.0
}

fn new_tree() -> KeyedTree<u16, Entry> {
    KeyedTree::new(entry_key as fn(&Entry) -> u16)
}

fn validate_tree<K: Ord, V, F: Fn(&V) -> K>(t: &KeyedTree<K, V, F>) {
    if let Err(violation) = t.check() {
        panic!("invalid tree: {violation}");
    }

    let bound = 2.0 * ((t.len() + 1) as f64).log2();
    assert!(
        t.height() as f64 <= bound,
        "height {} exceeds 2*log2(N+1) = {bound} for N = {}",
        t.height(),
        t.len()
    );

    let live = t.arena.nodes.len() - 1 - t.arena.free.len();
    assert_eq!(live, t.len(), "every non-free slot must hold a live entry");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u64),
    Remove(u16),
    Get(u16),
    Floor(u16),
    Ceiling(u16),
    PopFirst,
    PopLast,
    EnsureCapacity(usize),
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // A narrow key space forces overwrites and hits on remove.
    0u16..512
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        10 => key.clone().prop_map(Op::Get),
        7 => key.clone().prop_map(Op::Floor),
        7 => key.clone().prop_map(Op::Ceiling),
        2 => Just(Op::PopFirst),
        2 => Just(Op::PopLast),
        2 => (0usize..2048).prop_map(Op::EnsureCapacity),
    ];
    prop::collection::vec(op, 0..=max_len)
}

fn apply(t: &mut KeyedTree<u16, Entry>, m: &mut BTreeMap<u16, u64>, op: Op) {
    match op {
        Op::Insert(key, value) => {
            let old_t = t.insert((key, value)).map(|e| e.1);
            let old_m = m.insert(key, value);
            assert_eq!(old_t, old_m);
        }
        Op::Remove(key) => {
            if m.is_empty() {
                assert_eq!(t.try_remove(&key), Err(RemoveError::EmptyTree));
            } else {
                let old_t = t.remove(&key).map(|e| e.1);
                let old_m = m.remove(&key);
                assert_eq!(old_t, old_m);
                assert!(!t.contains_key(&key));
            }
        }
        Op::Get(key) => {
            assert_eq!(t.get(&key).map(|e| e.1), m.get(&key).copied());
            assert_eq!(t.contains_key(&key), m.contains_key(&key));
        }
        Op::Floor(key) => {
            let want = m.range(..=key).next_back().map(|(k, v)| (*k, *v));
            assert_eq!(t.floor(&key).copied(), want);
        }
        Op::Ceiling(key) => {
            let want = m.range(key..).next().map(|(k, v)| (*k, *v));
            assert_eq!(t.ceiling(&key).copied(), want);
        }
        Op::PopFirst => {
            assert_eq!(t.pop_first(), m.pop_first());
        }
        Op::PopLast => {
            assert_eq!(t.pop_last(), m.pop_last());
        }
        Op::EnsureCapacity(entries) => {
            let before = t.capacity();
            t.ensure_capacity(entries);
            assert!(t.capacity() >= entries);
            assert!(t.capacity() >= before);
        }
    }

    assert_eq!(t.len(), m.len());
    assert_eq!(t.first().copied(), m.first_key_value().map(|(k, v)| (*k, *v)));
    assert_eq!(t.last().copied(), m.last_key_value().map(|(k, v)| (*k, *v)));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy(2000)) {
        let mut t = new_tree();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for op in ops {
            apply(&mut t, &mut m, op);
        }

        validate_tree(&t);
        let got: Vec<Entry> = t.iter().copied().collect();
        let expected: Vec<Entry> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_invariants_hold_after_every_op(ops in ops_strategy(300)) {
        let mut t = new_tree();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for op in ops {
            apply(&mut t, &mut m, op);
            validate_tree(&t);
        }
    }

    #[test]
    fn prop_iteration_strictly_ascending(keys in prop::collection::vec(any::<u16>(), 0..1000)) {
        let mut t = new_tree();
        for (i, k) in keys.iter().enumerate() {
            t.insert((*k, i as u64));
        }

        let got: Vec<u16> = t.iter().map(|e| e.0).collect();
        prop_assert!(got.windows(2).all(|w| w[0] < w[1]));

        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(got, distinct);
        prop_assert_eq!(t.iter().len(), t.len());
    }

    #[test]
    fn prop_remove_everything(keys in prop::collection::vec(key_strategy(), 1..400)) {
        let mut t = new_tree();
        for k in &keys {
            t.insert((*k, u64::from(*k)));
        }

        let mut expected = t.len();
        for k in &keys {
            if t.contains_key(k) {
                prop_assert_eq!(t.remove(k), Some((*k, u64::from(*k))));
                expected -= 1;
            } else if !t.is_empty() {
                prop_assert_eq!(t.remove(k), None);
            }
            prop_assert_eq!(t.len(), expected);
        }

        prop_assert!(t.is_empty());
        prop_assert!(t.root.is_nil());
        prop_assert_eq!(t.first(), None);
        prop_assert_eq!(t.last(), None);
        prop_assert_eq!(t.get(&keys[0]), None);
        validate_tree(&t);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u16> = (0..7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = new_tree();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert((k, v)).map(|e| e.1), m.insert(k, v));
        }

        validate_tree(&t);
        let got: Vec<Entry> = t.iter().copied().collect();
        let expected: Vec<Entry> = m.into_iter().collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u16> = (0..7).collect();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree = new_tree();
    let mut base_map: BTreeMap<u16, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_tree.insert((*k, v)).map(|e| e.1), base_map.insert(*k, v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k).map(|e| e.1), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_nil());
        assert_eq!(t.arena.free.len(), keys.len());
    });
}
