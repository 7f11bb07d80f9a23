use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn init_logging() {
    use simplelog::{Config, LevelFilter, WriteLogger};

    // Another test may have installed the logger already.
    let _ = WriteLogger::init(LevelFilter::Trace, Config::default(), std::io::sink());
}

// All orderings of `0..n`.
fn permutations(n: u32) -> Vec<Vec<u32>> {
    if n == 0 {
        return vec![vec![]];
    }

    let mut out = Vec::new();
    for perm in permutations(n - 1) {
        for pos in 0..=perm.len() {
            let mut p = perm.clone();
            p.insert(pos, n - 1);
            out.push(p);
        }
    }

    out
}

fn insert_find_all(keys: &[u32]) {
    let mut tree: RbTree<u32> = RbTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.find(key).expect("item not found");
        assert_eq!(tree.key(node), key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn small_trees_find() {
    for n in 2..=6 {
        for keys in permutations(n) {
            insert_find_all(&keys);
        }
    }
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: RbTree<u32> = RbTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.find(key).expect("item not found");
        assert_eq!(tree.erase(node), *key);
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.find(key).expect("item not found");
        assert_eq!(tree.erase(node), *key);
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_small_trees() {
    for n in 2..=6 {
        for keys in permutations(n) {
            insert_remove_all(&keys);
        }
    }
}

#[test]
fn reference_shape() {
    let mut tree = RbTree::new();

    let mut root = None;
    for key in [20, 10, 50, 30, 80, 40, 35, 25] {
        root = Some(tree.insert(key));
        tree.assert_invariants();
    }

    assert_eq!(tree.to_vec(), [10, 20, 25, 30, 35, 40, 50, 80]);
    assert_eq!(tree.max().map(|n| *tree.key(n)), Some(80));
    assert_eq!(tree.min().map(|n| *tree.key(n)), Some(10));
    assert_eq!(root, tree.root());

    // (key, color, left key, right key) in level order.
    let expected = [
        (35, Color::Black, Some(20), Some(50)),
        (20, Color::Red, Some(10), Some(30)),
        (50, Color::Red, Some(40), Some(80)),
        (10, Color::Black, None, None),
        (30, Color::Black, Some(25), None),
        (40, Color::Black, None, None),
        (80, Color::Black, None, None),
        (25, Color::Red, None, None),
    ];

    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 35);
    assert_eq!(tree.parent(root), None);

    for (key, color, left, right) in expected {
        let node = tree.find(&key).unwrap();
        assert_eq!(tree.color(node), color, "color of {key}");
        assert_eq!(tree.left(node).map(|n| *tree.key(n)), left, "left of {key}");
        assert_eq!(tree.right(node).map(|n| *tree.key(n)), right, "right of {key}");
    }

    assert_eq!(tree.assert_invariants(), 3);
}

#[test]
fn erase_root_with_two_children() {
    let mut tree = RbTree::new();
    for key in [36, 25, 990] {
        tree.insert(key);
    }

    let node = tree.find(&36).unwrap();
    assert_eq!(tree.erase(node), 36);

    tree.assert_invariants();
    assert_eq!(tree.to_vec(), [25, 990]);
    assert_eq!(tree.find(&36), None);
    assert_eq!(tree.len(), 2);
}

#[test]
fn single_key_is_min_and_max() {
    let mut tree = RbTree::new();
    let root = tree.insert(1);

    let found = tree.find(&1).unwrap();
    assert_eq!(found, root);
    assert_eq!(*tree.key(found), 1);
    assert_eq!(tree.min(), Some(found));
    assert_eq!(tree.max(), Some(found));
    assert_eq!(tree.color(found), Color::Black);
}

#[test]
fn empty_tree_queries() {
    let tree: RbTree<i64> = RbTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.find(&0), None);
    assert_eq!(tree.to_array(&mut []), 0);
    assert_eq!(tree.assert_invariants(), 1);
}

#[test]
fn duplicates_are_kept() {
    let mut tree: RbTree<u32> = [5, 5, 5, 3, 5, 7].into_iter().collect();
    tree.assert_invariants();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.to_vec(), [3, 5, 5, 5, 5, 7]);

    let mut removed = 0;
    while let Some(node) = tree.find(&5) {
        assert_eq!(tree.erase(node), 5);
        tree.assert_invariants();
        removed += 1;
    }

    assert_eq!(removed, 4);
    assert_eq!(tree.to_vec(), [3, 7]);
}

#[test]
fn to_array_respects_buffer_length() {
    let tree: RbTree<u32> = [9, 2, 7, 4].into_iter().collect();

    let mut short = [0; 2];
    assert_eq!(tree.to_array(&mut short), 2);
    assert_eq!(short, [2, 4]);

    let mut long = [u32::MAX; 6];
    assert_eq!(tree.to_array(&mut long), 4);
    assert_eq!(long, [2, 4, 7, 9, u32::MAX, u32::MAX]);
}

#[test]
fn handles_survive_other_erasures() {
    let mut tree = RbTree::new();
    for key in 0..64u32 {
        tree.insert(key);
    }

    let handles: Vec<_> = (0..64u32).map(|k| (k, tree.find(&k).unwrap())).collect();

    for &(key, node) in handles.iter().filter(|(k, _)| k % 2 == 0) {
        assert_eq!(tree.erase(node), key);
        tree.assert_invariants();
    }

    for &(key, node) in handles.iter().filter(|(k, _)| k % 2 == 1) {
        assert_eq!(*tree.key(node), key);
    }
}

#[test]
fn successor_and_predecessor_walk_in_order() {
    let tree: RbTree<u32> = (0..32).rev().collect();

    let mut forward = Vec::new();
    let mut cur = tree.min();
    while let Some(node) = cur {
        forward.push(*tree.key(node));
        cur = tree.successor(node);
    }
    assert_eq!(forward, (0..32).collect::<Vec<_>>());

    let mut backward = Vec::new();
    let mut cur = tree.max();
    while let Some(node) = cur {
        backward.push(*tree.key(node));
        cur = tree.predecessor(node);
    }
    assert_eq!(backward, (0..32).rev().collect::<Vec<_>>());
}

#[test]
fn pop_drains_in_order() {
    let mut tree: RbTree<u32> = [4, 8, 1, 6, 3].into_iter().collect();

    assert_eq!(tree.pop_first(), Some(1));
    assert_eq!(tree.pop_last(), Some(8));
    tree.assert_invariants();

    assert_eq!(tree.pop_first(), Some(3));
    assert_eq!(tree.pop_first(), Some(4));
    assert_eq!(tree.pop_last(), Some(6));
    assert_eq!(tree.pop_last(), None);
    assert!(tree.is_empty());
}

#[test]
fn clear_and_reuse() {
    let mut tree: RbTree<u32> = (0..100).collect();
    tree.clear();

    assert!(tree.is_empty());
    tree.assert_invariants();

    tree.insert(42);
    assert_eq!(tree.to_vec(), [42]);
    tree.assert_invariants();
}

#[test]
fn failed_reservation_leaves_tree_untouched() {
    let mut tree: RbTree<u32> = (0..10).collect();

    assert!(matches!(tree.try_reserve(usize::MAX), Err(Error::Alloc(_))));
    assert_eq!(tree.len(), 10);
    tree.assert_invariants();

    tree.try_insert(10).unwrap();
    assert_eq!(tree.len(), 11);
    tree.assert_invariants();
}

#[test]
#[should_panic(expected = "is not a live node")]
fn erasing_a_stale_handle_panics() {
    let mut tree = RbTree::new();
    tree.insert(1);
    tree.insert(2);

    let node = tree.find(&1).unwrap();
    tree.erase(node);
    tree.erase(node);
}

#[test]
fn debug_lists_keys_in_order() {
    let tree: RbTree<u32> = [3, 1, 2].into_iter().collect();
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[test]
fn rotation_preserves_order_and_links() {
    let mut tree: RbTree<u32> = (1..=7).collect();
    let before = tree.to_vec();

    let root = tree.root;
    let promoted = tree.links(root).right();
    tree.rotate(root, Dir::Left);

    assert_eq!(tree.root, promoted);
    assert_eq!(tree.links(promoted).parent(), SENTINEL);
    assert_eq!(tree.links(promoted).left(), root);
    assert_eq!(tree.links(root).parent(), promoted);
    assert_eq!(tree.to_vec(), before);

    tree.rotate(promoted, Dir::Right);

    assert_eq!(tree.root, root);
    assert_eq!(tree.links(root).right(), promoted);
    assert_eq!(tree.to_vec(), before);
    tree.assert_invariants();
}

#[test]
fn transplant_with_sentinel_records_parent() {
    let mut tree: RbTree<u32> = [2, 1, 3].into_iter().collect();
    let root = tree.root;
    let leaf = tree.links(root).left();

    tree.transplant(leaf, SENTINEL);

    assert_eq!(tree.links(root).left(), SENTINEL);
    assert_eq!(tree.links(SENTINEL).parent(), root);
}

#[test]
fn cursor_walks_and_removes() {
    let mut tree: RbTree<u32> = (0..5).collect();

    {
        let mut curs = tree.cursor_last();
        assert_eq!(curs.get(), Some(&4));
        curs.move_next();
        assert_eq!(curs.get(), None);
        assert_eq!(curs.peek_next(), Some(&0));
        assert_eq!(curs.peek_prev(), Some(&4));
    }

    let mut curs = tree.cursor_first_mut();
    curs.move_next();
    assert_eq!(curs.remove_current(), Some(1));
    assert_eq!(curs.get(), Some(&2));
    assert_eq!(curs.remove_current_and_move_prev(), Some(2));
    assert_eq!(curs.get(), Some(&0));
    assert_eq!(curs.as_cursor().peek_next(), Some(&3));
    drop(curs);

    assert_eq!(tree.to_vec(), [0, 3, 4]);
    tree.assert_invariants();
}

#[test]
fn fixups_run_with_logging_enabled() {
    init_logging();

    let mut tree = RbTree::new();
    for key in (0..256u32).map(|k| k.wrapping_mul(97) % 256) {
        tree.insert(key);
    }
    for key in (0..256u32).step_by(3) {
        let node = tree.find(&key).unwrap();
        tree.erase(node);
        tree.assert_invariants();
    }
    tree.clear();
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn multiset_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_multiset_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..64, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }

    #[test]
    fn to_array_is_insertion_order_independent(keys in proptest::collection::vec(any::<u16>(), 0..300)) {
        let tree: RbTree<u16> = keys.iter().copied().collect();

        let mut sorted = keys.clone();
        sorted.sort_unstable();

        let mut buf = vec![0; keys.len()];
        prop_assert_eq!(tree.to_array(&mut buf), keys.len());
        prop_assert_eq!(&buf, &sorted);
        prop_assert_eq!(tree.min().map(|n| *tree.key(n)), sorted.first().copied());
        prop_assert_eq!(tree.max().map(|n| *tree.key(n)), sorted.last().copied());
    }

    #[test]
    fn erase_then_reinsert(keys in proptest::collection::vec(0u32..500, 1..200), pick in any::<prop::sample::Index>()) {
        let mut tree: RbTree<u32> = keys.iter().copied().collect();

        let key = keys[pick.index(keys.len())];
        let node = tree.find(&key).unwrap();
        prop_assert_eq!(tree.erase(node), key);
        tree.assert_invariants();

        tree.insert(key);
        tree.assert_invariants();

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(tree.to_vec(), sorted);
    }
}
