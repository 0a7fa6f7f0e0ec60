#![no_main]
use jimdecomp::container::ContainerLayout;
use jimdecomp::scan::{OffsetScanner, ScanConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let scanner = OffsetScanner::new(ScanConfig::up_to(32));
    let candidates = scanner.scan(data);
    for c in &candidates {
        assert!(!c.output().is_empty());
        assert!(c.score.is_finite());
    }

    if let Some(best) = scanner.best(data) {
        assert!(candidates.iter().all(|c| c.score <= best.score));
    }

    let _ = ContainerLayout::map_jim().decode(data);
});
