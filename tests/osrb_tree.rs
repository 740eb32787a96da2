use std::collections::{BTreeMap, BTreeSet};

use osrb_tree::{Error, OSRBTree, Rank};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 4_000;

type Model = BTreeMap<u16, BTreeSet<u8>>;

/// Values drawn from a narrow range so that many keys share a value.
fn value_strategy() -> impl Strategy<Value = u16> {
    0u16..600
}

fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..6
}

// ─── Model helpers ───────────────────────────────────────────────────────────

fn model_total(model: &Model) -> usize {
    model.values().map(BTreeSet::len).sum()
}

fn model_rank(model: &Model, value: u16) -> Result<usize, Error> {
    if !model.contains_key(&value) {
        return Err(Error::NotFound);
    }
    Ok(1 + model.range(..value).map(|(_, keys)| keys.len()).sum::<usize>())
}

fn model_select(model: &Model, rank: usize) -> Result<u16, Error> {
    let len = model_total(model);
    let mut seen = 0;
    for (value, keys) in model {
        seen += keys.len();
        if rank >= 1 && rank <= seen {
            return Ok(*value);
        }
    }
    Err(Error::OutOfRange { index: rank, len })
}

fn build(pairs: &[(u8, u16)]) -> (OSRBTree<u16, u8>, Model) {
    let mut tree = OSRBTree::new();
    let mut model = Model::new();
    for &(key, value) in pairs {
        let fresh = model.entry(value).or_default().insert(key);
        let result = tree.insert(key, value);
        if fresh {
            assert_eq!(result, Ok(()));
        } else {
            assert_eq!(result, Err(Error::DuplicateKey));
        }
    }
    (tree, model)
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(u8, u16),
    Remove(u8, u16),
    Rank(u16),
    Select(usize),
    SelectReverse(usize),
    Successor(u16),
    Predecessor(u16),
    First,
    Last,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| TreeOp::Insert(k, v)),
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| TreeOp::Remove(k, v)),
        2 => value_strategy().prop_map(TreeOp::Rank),
        2 => (0usize..2_000).prop_map(TreeOp::Select),
        1 => (0usize..2_000).prop_map(TreeOp::SelectReverse),
        1 => value_strategy().prop_map(TreeOp::Successor),
        1 => value_strategy().prop_map(TreeOp::Predecessor),
        1 => Just(TreeOp::First),
        1 => Just(TreeOp::Last),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on the tree and on a `BTreeMap` of key
    /// sets, comparing every result.
    #[test]
    fn tree_ops_match_model(ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree: OSRBTree<u16, u8> = OSRBTree::new();
        let mut model = Model::new();

        for op in ops {
            match op {
                TreeOp::Insert(key, value) => {
                    let expected = if model.get(&value).is_some_and(|keys| keys.contains(&key)) {
                        Err(Error::DuplicateKey)
                    } else {
                        model.entry(value).or_default().insert(key);
                        Ok(())
                    };
                    prop_assert_eq!(tree.insert(key, value), expected);
                }
                TreeOp::Remove(key, value) => {
                    let removed = model.get_mut(&value).is_some_and(|keys| keys.remove(&key));
                    if model.get(&value).is_some_and(BTreeSet::is_empty) {
                        model.remove(&value);
                    }
                    let expected = if removed { Ok(key) } else { Err(Error::NotFound) };
                    prop_assert_eq!(tree.remove(&key, &value), expected);
                }
                TreeOp::Rank(value) => {
                    prop_assert_eq!(tree.rank(&value), model_rank(&model, value));
                }
                TreeOp::Select(rank) => {
                    prop_assert_eq!(tree.select_at_rank(rank).copied(), model_select(&model, rank));
                }
                TreeOp::SelectReverse(rank) => {
                    let total = model_total(&model);
                    let expected = if rank == 0 || rank > total {
                        Err(Error::OutOfRange { index: rank, len: total })
                    } else {
                        model_select(&model, total + 1 - rank)
                    };
                    prop_assert_eq!(tree.select_at_rank_reverse(rank).copied(), expected);
                }
                TreeOp::Successor(value) => {
                    let expected = if model.contains_key(&value) {
                        Ok(model.range(value + 1..).next().map(|(v, _)| *v))
                    } else {
                        Err(Error::NotFound)
                    };
                    prop_assert_eq!(tree.successor(&value).map(Option::<&u16>::copied), expected);
                }
                TreeOp::Predecessor(value) => {
                    let expected = if model.contains_key(&value) {
                        Ok(model.range(..value).next_back().map(|(v, _)| *v))
                    } else {
                        Err(Error::NotFound)
                    };
                    prop_assert_eq!(tree.predecessor(&value).map(Option::<&u16>::copied), expected);
                }
                TreeOp::First => {
                    let expected = model.keys().next().copied().ok_or(Error::EmptyTree);
                    prop_assert_eq!(tree.first_value().copied(), expected);
                }
                TreeOp::Last => {
                    let expected = model.keys().next_back().copied().ok_or(Error::EmptyTree);
                    prop_assert_eq!(tree.last_value().copied(), expected);
                }
            }
            prop_assert_eq!(tree.total_entries(), model_total(&model));
            prop_assert_eq!(tree.distinct_len(), model.len());
        }
    }

    /// `select_at_rank(rank(v)) == v` for every present value, and every rank in a
    /// value's band selects that value.
    #[test]
    fn rank_and_select_are_inverse(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)
    ) {
        let (tree, model) = build(&pairs);

        for (value, keys) in &model {
            let rank = tree.rank(value).unwrap();
            prop_assert_eq!(tree.select_at_rank(rank), Ok(value));
            for offset in 0..keys.len() {
                prop_assert_eq!(tree.select_at_rank(rank + offset), Ok(value));
                prop_assert!(tree.rank(tree.select_at_rank(rank + offset).unwrap()).unwrap() <= rank + offset);
            }
        }
        let total = tree.total_entries();
        prop_assert_eq!(
            tree.select_at_rank(total + 1),
            Err(Error::OutOfRange { index: total + 1, len: total })
        );
    }

    /// `select_at_rank_reverse(r) == select_at_rank(total + 1 - r)` across the whole range.
    #[test]
    fn reverse_selection_mirrors_forward(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)
    ) {
        let (tree, _) = build(&pairs);
        let total = tree.total_entries();
        for rank in 1..=total {
            prop_assert_eq!(tree.select_at_rank_reverse(rank), tree.select_at_rank(total + 1 - rank));
            prop_assert_eq!(tree[Rank(rank)], *tree.select_at_rank(rank).unwrap());
        }
        prop_assert_eq!(tree.select_at_rank_reverse(0), Err(Error::OutOfRange { index: 0, len: total }));
    }

    /// Walking successors from the first value visits the sorted distinct values.
    #[test]
    fn successor_walk_matches_sorted_values(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)
    ) {
        let (tree, model) = build(&pairs);

        let mut walked = vec![*tree.first_value().unwrap()];
        while let Some(next) = tree.successor(walked.last().unwrap()).unwrap() {
            prop_assert!(next > walked.last().unwrap());
            walked.push(*next);
        }
        prop_assert_eq!(walked.last(), tree.last_value().ok());
        prop_assert_eq!(&walked, &model.keys().copied().collect::<Vec<_>>());

        let mut back = vec![*tree.last_value().unwrap()];
        while let Some(prev) = tree.predecessor(back.last().unwrap()).unwrap() {
            back.push(*prev);
        }
        back.reverse();
        prop_assert_eq!(back, walked);
    }

    /// `iter` yields every value with its sorted key set, in both directions.
    #[test]
    fn iter_matches_model(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)
    ) {
        let (tree, model) = build(&pairs);

        let expected: Vec<(u16, Vec<u8>)> = model
            .iter()
            .map(|(value, keys)| (*value, keys.iter().copied().collect()))
            .collect();
        let forward: Vec<(u16, Vec<u8>)> = tree.iter().map(|(v, keys)| (*v, keys.to_vec())).collect();
        prop_assert_eq!(&forward, &expected);

        let backward: Vec<u16> = tree.values().rev().copied().collect();
        let mut expected_back: Vec<u16> = model.keys().copied().collect();
        expected_back.reverse();
        prop_assert_eq!(backward, expected_back);
        prop_assert_eq!(tree.iter().len(), model.len());
    }

    /// Counting queries agree with the model for present and absent values.
    #[test]
    fn counts_below_and_above_match_model(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE),
        probes in proptest::collection::vec(value_strategy(), 64)
    ) {
        let (tree, model) = build(&pairs);
        let total = model_total(&model);

        for probe in probes {
            let below: usize = model.range(..probe).map(|(_, keys)| keys.len()).sum();
            let above: usize = model.range(probe + 1..).map(|(_, keys)| keys.len()).sum();
            prop_assert_eq!(tree.values_below(&probe), below);
            prop_assert_eq!(tree.values_above(&probe), above);
            prop_assert_eq!(tree.percentile(&probe), Ok((below * 1000 / total + 5) / 10));
            prop_assert_eq!(
                tree.key_count(&probe),
                model.get(&probe).map(BTreeSet::len).ok_or(Error::NotFound)
            );
        }
    }

    /// Removing every pair in a random order empties the tree.
    #[test]
    fn drain_in_random_order_empties_tree(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE),
        seed in any::<u64>()
    ) {
        let (mut tree, model) = build(&pairs);
        let mut all: Vec<(u8, u16)> = model
            .iter()
            .flat_map(|(value, keys)| keys.iter().map(move |key| (*key, *value)))
            .collect();

        let mut state = seed | 1;
        for i in (1..all.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            all.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let mut remaining = all.len();
        for (key, value) in all {
            prop_assert_eq!(tree.remove(&key, &value), Ok(key));
            remaining -= 1;
            prop_assert_eq!(tree.total_entries(), remaining);
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.root_value(), None);
        prop_assert_eq!(tree.first_value(), Err(Error::EmptyTree));
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn three_accounts_scenario() {
    let mut tree = OSRBTree::new();
    tree.insert("k1", 50u128).unwrap();
    tree.insert("k2", 30).unwrap();
    tree.insert("k3", 70).unwrap();

    assert_eq!(tree.total_entries(), 3);
    assert_eq!(tree.first_value(), Ok(&30));
    assert_eq!(tree.last_value(), Ok(&70));
    assert_eq!(tree.rank(&50), Ok(2));
    assert_eq!(tree.select_at_rank(1), Ok(&30));
    assert_eq!(tree.select_at_rank_reverse(1), Ok(&70));

    assert_eq!(tree.remove(&"k2", &30), Ok("k2"));
    assert_eq!(tree.total_entries(), 2);
    assert_eq!(tree.first_value(), Ok(&50));
    assert_eq!(tree.rank(&70), Ok(2));
    assert!(!tree.exists(&30));
}

#[test]
fn duplicate_and_absent_pairs_are_rejected() {
    let mut tree = OSRBTree::new();
    tree.insert(1u8, 10u32).unwrap();

    assert_eq!(tree.insert(1, 10), Err(Error::DuplicateKey));
    assert_eq!(tree.remove(&2, &10), Err(Error::NotFound));
    assert_eq!(tree.remove(&1, &11), Err(Error::NotFound));
    assert_eq!(tree.rank(&11), Err(Error::NotFound));
    assert_eq!(tree.successor(&11), Err(Error::NotFound));
    assert_eq!(tree.total_entries(), 1);
    assert_eq!(tree.keys(&10), Ok(&[1u8][..]));
}

#[test]
fn shared_value_occupies_a_band_of_ranks() {
    let mut tree = OSRBTree::new();
    for key in ["a", "b", "c"] {
        tree.insert(key, 20u64).unwrap();
    }
    tree.insert("d", 10).unwrap();
    tree.insert("e", 30).unwrap();

    assert_eq!(tree.rank(&20), Ok(2));
    assert_eq!(tree.rank(&30), Ok(5));
    let selected: Vec<u64> = (1..=5).map(|r| *tree.select_at_rank(r).unwrap()).collect();
    assert_eq!(selected, vec![10, 20, 20, 20, 30]);
    assert_eq!(tree.key_at(&20, 1), Ok(&"b"));
    assert_eq!(tree.key_at(&20, 3), Err(Error::OutOfRange { index: 3, len: 3 }));
    assert!(tree.contains(&"c", &20));
    assert!(!tree.contains(&"c", &30));
}

#[test]
fn percentile_queries_on_six_values() {
    let mut tree = OSRBTree::new();
    for (key, value) in [(1, 10u32), (2, 100), (3, 110), (4, 200), (5, 300), (6, 10_000)] {
        tree.insert(key, value).unwrap();
    }

    assert_eq!(tree.median(), Ok(&110));
    assert_eq!(tree.at_percentile(0), Ok(&10));
    assert_eq!(tree.at_percentile(100), Ok(&10_000));
    assert_eq!(tree.at_permil(500), Ok(&110));
    assert_eq!(tree.percentile(&10), Ok(0));
    assert_eq!(tree.percentile(&200), Ok(50));
    assert_eq!(tree.permil(&300), Ok(667));
    assert_eq!(tree.at_percentile(101), Err(Error::OutOfRange { index: 101, len: 101 }));

    let empty: OSRBTree<u32, u8> = OSRBTree::new();
    assert_eq!(empty.median(), Err(Error::EmptyTree));
    assert_eq!(empty.percentile(&1), Err(Error::EmptyTree));
}

#[test]
fn clone_and_equality_follow_contents() {
    let mut tree = OSRBTree::new();
    for (key, value) in [(1u8, 5u16), (2, 5), (3, 9)] {
        tree.insert(key, value).unwrap();
    }
    let mut copy = tree.clone();
    assert_eq!(copy, tree);

    copy.remove(&2, &5).unwrap();
    assert_ne!(copy, tree);
    copy.insert(2, 5).unwrap();
    assert_eq!(copy, tree);

    copy.clear();
    assert!(copy.is_empty());
    assert_eq!(copy, OSRBTree::default());
    assert_eq!(format!("{tree:?}"), "{5: [1, 2], 9: [3]}");
}

#[test]
fn node_inspector_reports_structure() {
    let mut tree = OSRBTree::with_capacity(8);
    for value in 1..=7u32 {
        tree.insert(0u8, value).unwrap();
    }
    tree.insert(1, 4).unwrap();

    let root = *tree.root_value().unwrap();
    let info = tree.node(&root).unwrap();
    assert_eq!(info.parent, None);
    assert_eq!(info.count, 8);
    assert_eq!(info.color, osrb_tree::Color::Black);

    let mut count_sum = 0;
    for value in tree.values() {
        let info = tree.node(value).unwrap();
        count_sum += info.key_count;
        let children: usize = [info.left, info.right]
            .into_iter()
            .flatten()
            .map(|child| tree.node(child).unwrap().count)
            .sum();
        assert_eq!(info.count, info.key_count + children);
    }
    assert_eq!(count_sum, tree.total_entries());
    assert_eq!(tree.node(&8), Err(Error::NotFound));
}
