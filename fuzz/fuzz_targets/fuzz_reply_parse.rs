#![no_main]

//! Reply and command parser fuzzer.
//!
//! Both parsers take untrusted text (a model reply or a terminal line).
//! They must never panic, and anything they accept must name a cell on
//! the board.

use gridhold::parse::{parse_human_command, parse_reply};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&size, rest)) = data.split_first() else {
        return;
    };
    let size = size % 26 + 1;
    let text = String::from_utf8_lossy(rest);

    if let Ok(suggestion) = parse_reply(&text, size) {
        let target = suggestion.action.target();
        assert!(target.row < size && target.col < size, "{target} off a {size}x{size} board");
        if let Some(well) = suggestion.well_target {
            assert!(well.row < size && well.col < size, "{well} off a {size}x{size} board");
        }
    }

    let _ = parse_human_command(&text, size);
});
