//! Reference-model harnesses shared by the property tests and the fuzz targets.
//!
//! Each harness replays a sequence of operations against both the tree and a trusted standard
//! library model, asserting after every step that the two agree and that the tree's invariants
//! hold.

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{RbSet, RbTree};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    // `Index` values pick an existing key so that lookups and removals hit often.
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// Replays `ops` against an [`RbSet`] and a [`BTreeSet`].
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut set: RbSet<u32> = RbSet::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                assert_eq!(btree.insert(value), set.insert(value), "op #{op_id}: {final_op:?}");
            }

            FinalOp::Get(value) => {
                assert_eq!(btree.get(&value), set.get(&value), "op #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value).then_some(value);
                assert_eq!(from_btree, set.remove(&value), "op #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                assert_eq!(btree.first(), set.first(), "op #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, set.pop_first(), "op #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                assert_eq!(btree.last(), set.last(), "op #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, set.pop_last(), "op #{op_id}: {final_op:?}");
            }
        }

        set.as_tree().assert_invariants();
        assert_eq!(btree.len(), set.len());
        assert!(btree.iter().eq(set.iter()));
    }
}

/// Replays `ops` against an [`RbTree`], which keeps duplicates, and a sorted `Vec`.
///
/// Besides matching contents, this checks that [`RbTree::to_array`] agrees with the model for
/// both an exactly sized buffer and a short one.
pub fn run_multiset_equivalence(ops: Vec<Op>) {
    let mut model: Vec<u32> = Vec::with_capacity(ops.len());
    let mut tree: RbTree<u32> = RbTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&model);

        match final_op {
            FinalOp::Insert(value) => {
                let idx = model.partition_point(|&v| v <= value);
                model.insert(idx, value);

                tree.insert(value);
            }

            FinalOp::Get(value) => {
                let from_model = model.binary_search(&value).ok().map(|_| value);
                let from_tree = tree.find(&value).map(|node| *tree.key(node));

                assert_eq!(from_model, from_tree, "op #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                let from_model = model
                    .binary_search(&value)
                    .ok()
                    .map(|idx| model.remove(idx));
                let from_tree = tree.find(&value).map(|node| tree.erase(node));

                assert_eq!(from_model, from_tree, "op #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_tree = tree.min().map(|node| tree.key(node));
                assert_eq!(model.first(), from_tree, "op #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_model = (!model.is_empty()).then(|| model.remove(0));
                assert_eq!(from_model, tree.pop_first(), "op #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_tree = tree.max().map(|node| tree.key(node));
                assert_eq!(model.last(), from_tree, "op #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                assert_eq!(model.pop(), tree.pop_last(), "op #{op_id}: {final_op:?}");
            }
        }

        tree.assert_invariants();
        assert_eq!(model.len(), tree.len());

        let mut buf = vec![0; model.len()];
        assert_eq!(tree.to_array(&mut buf), model.len());
        assert_eq!(buf, model);

        let short = model.len() / 2;
        let mut buf = vec![0; short];
        assert_eq!(tree.to_array(&mut buf), short);
        assert_eq!(buf[..], model[..short]);
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u32::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { values, ops })
    }
}

/// Replays cursor movements and removals against a sorted `Vec` with an index cursor.
///
/// Duplicate values are kept, so this also checks that cursors step over equal keys one node at a
/// time.
pub fn run_cursor_equivalence(mut values: Vec<u32>, ops: Vec<CursorOp>) {
    values.sort_unstable();

    let mut tree: RbTree<u32> = values.iter().copied().collect();
    let mut vec = values;

    fn vec_curs_prev(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut tree_curs = tree.cursor_first_mut();

    // Check that the initial states are equivalent.
    {
        let v = vec_curs.map(|i| &vec[i]);
        let t = tree_curs.get();

        assert_eq!(v, t);
    }

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                tree_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                tree_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| &vec[i]);
                let t = tree_curs.peek_next();

                assert_eq!(v, t);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| &vec[i]);
                let t = tree_curs.peek_prev();

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                let t = tree_curs.remove_current();

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs.is_some().then(|| vec_curs_prev(&vec, vec_curs));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                let t = tree_curs.remove_current_and_move_prev();

                assert_eq!(v, t);
            }
        }

        let v = vec_curs.map(|i| &vec[i]);
        let t = tree_curs.get();

        assert_eq!(v, t);
    }

    drop(tree_curs);
    tree.assert_invariants();
    assert!(tree.iter().eq(vec.iter()));
}
