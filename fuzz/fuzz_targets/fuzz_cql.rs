//! Fuzz the CQL parser
//!
//! Lexing and parsing must return an error on malformed input, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = cswfilter::parse_cql(input);
    }
});
