//! 통합 테스트 -- 병합된 인벤토리에서 관계 그래프까지

use stocktake_core::inventory::Inventory;
use stocktake_core::types::{Artifact, Asset};
use stocktake_relations::{RelationKind, RelationshipRegistry};

/// 컨테이너 이미지 두 개에 걸친 인벤토리를 모사합니다.
fn merged_inventory() -> Inventory {
    let mut inventory = Inventory::new();
    inventory.add_asset(Asset::with_id("AID-web-image")).unwrap();
    inventory.add_asset(Asset::with_id("AID-db-image")).unwrap();

    // 두 이미지 모두에 포함된 공용 라이브러리
    let mut libz = Artifact::with_id("libz.so.1");
    libz.attributes.set("AID-web-image", "x");
    libz.attributes.set("AID-db-image", "x");
    inventory.add_artifact(libz);

    // web 이미지에만 포함
    let mut nginx = Artifact::with_id("nginx-1.25.4");
    nginx.attributes.set("AID-web-image", "x");
    inventory.add_artifact(nginx);

    // 런타임 의존성 마커
    let mut client = Artifact::with_id("libpq.so.5");
    client.attributes.set("AID-db-image", "r");
    // 큐레이션되지 않은 에셋을 가리키는 마커는 버려져야 함
    client.attributes.set("AID-decommissioned", "x");
    inventory.add_artifact(client);

    inventory
}

#[test]
fn graph_from_merged_inventory() {
    let mut registry = RelationshipRegistry::build_from_inventory(&merged_inventory());

    // 해석 불가 마커 1개는 조용히 버려짐: libz 2 + nginx 1 + client 1
    assert_eq!(registry.len(), 4);

    registry.finalize_relationships();

    // web 이미지 포함 관계: libz + nginx가 root 집합으로 합쳐짐
    let web_contained = registry
        .relationships()
        .iter()
        .find(|r| {
            r.kind == RelationKind::ContainedIn && r.related.contains("AID-web-image")
        })
        .unwrap();
    assert!(web_contained.roots.contains("libz.so.1"));
    assert!(web_contained.roots.contains("nginx-1.25.4"));

    // db 이미지 포함과 런타임 의존은 종류가 달라 별개
    assert_eq!(registry.len(), 3);
}

#[test]
fn finalize_unions_only_exact_related_sets() {
    let mut registry = RelationshipRegistry::build_from_inventory(&merged_inventory());
    registry.finalize_relationships();

    // {AID-web-image}와 {AID-db-image}는 related가 달라 병합 불가
    let contained: Vec<_> = registry
        .relationships()
        .iter()
        .filter(|r| r.kind == RelationKind::ContainedIn)
        .collect();
    assert_eq!(contained.len(), 2);
}
