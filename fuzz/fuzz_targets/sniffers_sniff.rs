#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = bareblocks::inspect::sniffers::identify(data);
    let _ = bareblocks::inspect::sniffers::CombinedSniffer::sniff(data, Some("<fuzz>.png"));
});
