#![no_main]

use libfuzzer_sys::fuzz_target;
use onboarder_ai::extract::clean_response;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let once = clean_response(text);
        let _ = std::hint::black_box(clean_response(&once));
    }
});
