#![no_main]
use bareblocks::{InspectConfig, Inspector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut config = InspectConfig::default();
    config.structure.allow_unknown_containers = true;
    config.payloads.max_inflated_bytes = 1 << 20;
    let Ok(inspector) = Inspector::new(config) else {
        return;
    };
    if let Ok(report) = inspector.inspect_bytes(data, "<fuzz>") {
        let _ = report.to_json_string();
    }
});
