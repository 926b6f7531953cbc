//! NDB 카탈로그 파서 퍼징 — 임의 바이트에서 패닉/무한루프가 없어야 하고,
//! 에러는 항상 값으로 나오며 마지막 엔트리는 센티널이어야 합니다.

#![no_main]

use libfuzzer_sys::fuzz_target;

use stocktake_scan::{CatalogEntry, catalog_entries};

fuzz_target!(|data: &[u8]| {
    let entries = catalog_entries(data);

    // 센티널은 정확히 마지막에 하나
    assert_eq!(entries.last(), Some(&CatalogEntry::End));
    assert_eq!(
        entries
            .iter()
            .filter(|e| matches!(e, CatalogEntry::End))
            .count(),
        1
    );
});
