#![no_main]

use libfuzzer_sys::fuzz_target;
use ptstat::source::{parse_timestamp, TextSource, TimestampSource};
use ptstat::timestamp::Resolution;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for resolution in [Resolution::Nanosecond, Resolution::Microsecond] {
            if let Ok(ts) = parse_timestamp(input, resolution) {
                assert!(ts.fraction() < resolution.modulus());
            }
        }
    }

    // Line reader must stop cleanly on any byte stream
    let mut source = TextSource::new(data, Resolution::Nanosecond);
    while let Ok(Some(_)) = source.next_timestamp() {}
});
