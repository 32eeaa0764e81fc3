#![no_main]

use libfuzzer_sys::fuzz_target;
use orbitcam_harness::{TraceReader, replay_trace};

fuzz_target!(|data: &[u8]| {
    // Parsing and replay must reject bad input with an error, never panic.
    let Ok(trace) = TraceReader::from_bytes(data) else {
        return;
    };
    if trace.frames().count() > 4096 {
        return;
    }
    if let Ok(report) = replay_trace(&trace, None) {
        assert_eq!(report.digest.len(), 64);
        assert_eq!(report.outcomes.len() as u64, report.frames);
    }
});
