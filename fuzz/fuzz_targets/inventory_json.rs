//! 인벤토리 JSON 코덱 퍼징 — 임의 JSON에서 패닉이 없어야 하고,
//! 파싱에 성공한 문서는 라운드트립이 안정적이어야 합니다.

#![no_main]

use libfuzzer_sys::fuzz_target;

use stocktake_core::inventory::Inventory;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(inventory) = serde_json::from_str::<Inventory>(text) else {
        return;
    };

    // 직렬화 → 재파싱 라운드트립은 동일한 문서를 만들어야 함
    let serialized = serde_json::to_string(&inventory).expect("serialize parsed inventory");
    let reparsed: Inventory = serde_json::from_str(&serialized).expect("reparse inventory");
    assert_eq!(inventory, reparsed);
});
