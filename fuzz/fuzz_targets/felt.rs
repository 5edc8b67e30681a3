#![no_main]

use libfuzzer_sys::fuzz_target;
use starkbench::Felt;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(felt) = text.parse::<Felt>() {
        // Whatever parses must print back to the same element.
        let reparsed: Felt = felt.to_string().parse().expect("decimal form parses");
        assert_eq!(reparsed, felt);
        let reparsed: Felt = format!("{felt:#x}").parse().expect("hex form parses");
        assert_eq!(reparsed, felt);
    }
    let _ = Felt::from_short_string(text);
});
