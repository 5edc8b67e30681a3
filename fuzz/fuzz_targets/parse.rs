#![no_main]

use libfuzzer_sys::fuzz_target;
use starkbench::{lexer, parser};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    // Lexer and parser report errors; they must never panic.
    if let Ok(tokens) = lexer::lex(source) {
        let _ = parser::parse(&tokens);
    }
});
