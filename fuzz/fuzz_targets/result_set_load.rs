#![no_main]

use libfuzzer_sys::fuzz_target;
use mbench::persist::read_results;
use mbench::stats::summarize;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either load or fail with an error, never panic
    if let Ok(results) = read_results(data) {
        let _ = summarize(&results);
        for line in String::from_utf8_lossy(data).lines() {
            let mut scratch = mbench::ResultSet::new();
            let _ = scratch.append_line(line);
        }
    }
});
