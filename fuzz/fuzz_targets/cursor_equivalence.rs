#![no_main]

use libfuzzer_sys::fuzz_target;
use rbtree_arena::model::CursorEquivalenceInput;

fuzz_target!(|input: CursorEquivalenceInput| {
    rbtree_arena::model::run_cursor_equivalence(input.values, input.ops);
});
