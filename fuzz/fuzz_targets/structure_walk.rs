#![no_main]
use bareblocks::inspect::config::StructureConfig;
use bareblocks::inspect::sniffers::identify;
use bareblocks::inspect::structure;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let descriptor = identify(data);
    let mut cur = Cursor::new(data);
    if let Ok(report) = structure::walk(&mut cur, &descriptor, data.len() as u64, &StructureConfig::default()) {
        assert_eq!(report.pixel_bytes + report.non_pixel_bytes, report.total_bytes);
    }
});
