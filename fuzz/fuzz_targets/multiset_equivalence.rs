#![no_main]
use libfuzzer_sys::fuzz_target;

use rbtree_arena::model::{run_multiset_equivalence, Op};

fuzz_target!(|ops: Vec<Op>| { run_multiset_equivalence(ops) });
