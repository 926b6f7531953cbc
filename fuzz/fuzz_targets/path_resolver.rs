//! 경로 해석기 퍼징 — 임의 입력과 테이블에서 패닉 없이 종료해야 합니다.

#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;

use stocktake_scan::{PathResolver, SymlinkTable};

fuzz_target!(|input: (String, Vec<(String, String)>)| {
    let (path, entries) = input;

    let map: BTreeMap<String, String> = entries.into_iter().collect();
    let Ok(table) = SymlinkTable::new(map) else {
        // 구성 검증 실패는 정상 종료 경로
        return;
    };

    let resolver = PathResolver::new(table);
    // 절대 경로 거부는 Err, 순환/이탈은 상태 값 — 둘 다 패닉이 아님
    let _ = resolver.resolve(&path);
});
