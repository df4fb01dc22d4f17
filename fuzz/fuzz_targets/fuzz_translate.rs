//! Fuzz the full translation pipeline
//!
//! Parses, translates and scopes the constraint the way the REPL does.

#![no_main]

use cswfilter::repl::ReplState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut state = ReplState::default();
        state.set_types(&["csw:Record".to_string()]);
        if let Ok(result) = state.execute_cql(input) {
            let _ = state.format_result(&result);
        }
    }
});
