//! 참조 인벤토리 — 알려진 식별/분류의 상속과 매칭 전략
//!
//! 하나 이상의 영속 인벤토리 문서를 결정적 순서(파일명 대소문자 무시
//! 정렬)로 읽어 하나의 집계로 접습니다. 뒤의 파일은 새 식별 키만
//! 추가할 뿐 기존 키를 복제하거나 교체하지 않습니다.
//!
//! 조회는 명시적 전략 목록을 순서대로 시도합니다:
//! 1. id + 버전 + 분류 완전 일치
//! 2. id + 버전 일치 (분류 무시)
//! 3. id + 와일드카드 버전 일치 (`2.*` 형태의 참조 버전 접두 일치)
//!
//! 첫 번째 일치가 큐레이션된 분류/라이선스 속성을 스캔 아티팩트로
//! 복사합니다. 불일치는 신규 발견으로 남습니다.

use std::path::Path;

use tracing::{debug, info};

use stocktake_core::attrs::{
    ATTR_CLASSIFICATION, ATTR_GROUP_ID, ATTR_LICENSE, ATTR_WILDCARD_MATCH,
};
use stocktake_core::codec::InventoryCodec;
use stocktake_core::inventory::Inventory;
use stocktake_core::types::Artifact;

use crate::error::ScanEngineError;

/// 참조 일치가 복사하는 큐레이션 속성
const CURATED_ATTRIBUTES: &[&str] = &[
    ATTR_CLASSIFICATION,
    ATTR_LICENSE,
    ATTR_GROUP_ID,
    "Comment",
];

/// 매칭 전략 인터페이스
///
/// 전략은 독립적으로 테스트 가능해야 하므로 중첩 조건문이 아니라
/// 명시적 목록으로 구성됩니다.
pub trait MatchStrategy: Send + Sync {
    /// 전략 이름 (로깅용)
    fn name(&self) -> &str;

    /// 집계에서 일치하는 참조 아티팩트를 찾습니다.
    fn find<'a>(&self, aggregate: &'a Inventory, scanned: &Artifact) -> Option<&'a Artifact>;

    /// 이 전략의 일치가 와일드카드 일치로 표시되어야 하는지.
    fn is_wildcard(&self) -> bool {
        false
    }
}

/// 전략 1: id + 버전 + 분류 완전 일치
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn name(&self) -> &str {
        "exact"
    }

    fn find<'a>(&self, aggregate: &'a Inventory, scanned: &Artifact) -> Option<&'a Artifact> {
        let id = scanned.id()?;
        aggregate.artifacts.iter().find(|reference| {
            reference.id() == Some(id)
                && reference.version() == scanned.version()
                && reference.classification() == scanned.classification()
        })
    }
}

/// 전략 2: id + 버전 일치, 분류 무시
pub struct VersionMatch;

impl MatchStrategy for VersionMatch {
    fn name(&self) -> &str {
        "version"
    }

    fn find<'a>(&self, aggregate: &'a Inventory, scanned: &Artifact) -> Option<&'a Artifact> {
        let id = scanned.id()?;
        aggregate
            .artifacts
            .iter()
            .find(|reference| reference.id() == Some(id) && reference.version() == scanned.version())
    }
}

/// 전략 3: 와일드카드 버전 일치
///
/// 참조 버전이 `2.*` 형태이면 같은 컴포넌트의 스캔 버전이 접두사
/// `2.`로 시작할 때 일치합니다.
pub struct WildcardVersionMatch;

impl MatchStrategy for WildcardVersionMatch {
    fn name(&self) -> &str {
        "wildcard-version"
    }

    fn find<'a>(&self, aggregate: &'a Inventory, scanned: &Artifact) -> Option<&'a Artifact> {
        let component = scanned.component()?;
        let version = scanned.version()?;
        aggregate.artifacts.iter().find(|reference| {
            let Some(reference_version) = reference.version() else {
                return false;
            };
            let Some(prefix) = reference_version.strip_suffix('*') else {
                return false;
            };
            reference.component() == Some(component) && version.starts_with(prefix)
        })
    }

    fn is_wildcard(&self) -> bool {
        true
    }
}

/// 참조 일치 결과
pub struct ReferenceMatch<'a> {
    /// 일치한 참조 아티팩트
    pub reference: &'a Artifact,
    /// 일치를 찾은 전략 이름
    pub strategy: &'a str,
    /// 와일드카드 일치 여부
    pub wildcard: bool,
}

impl ReferenceMatch<'_> {
    /// 큐레이션된 속성을 스캔 아티팩트로 복사합니다.
    ///
    /// 스캔 쪽에 이미 값이 있는 키는 덮어쓰지 않습니다. 와일드카드
    /// 일치는 `WILDCARD-MATCH` 표시를 남깁니다.
    pub fn apply_to(&self, scanned: &mut Artifact) {
        for key in CURATED_ATTRIBUTES {
            if let Some(value) = self.reference.attributes.get_nonblank(key) {
                if scanned.attributes.get_nonblank(key).is_none() {
                    scanned.attributes.set(*key, value);
                }
            }
        }
        if self.wildcard {
            scanned.attributes.set(ATTR_WILDCARD_MATCH, "x");
        }
    }
}

/// 참조 인벤토리 집계
pub struct ReferenceInventory {
    aggregate: Inventory,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl std::fmt::Debug for ReferenceInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceInventory")
            .field("aggregate", &self.aggregate)
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

impl ReferenceInventory {
    /// 빈 집계를 생성합니다 (참조 매칭 없음).
    pub fn empty() -> Self {
        Self {
            aggregate: Inventory::new(),
            strategies: default_strategies(),
        }
    }

    /// 단일 인벤토리에서 집계를 생성합니다 (테스트/프로그램 구성용).
    pub fn from_inventory(inventory: Inventory) -> Self {
        Self {
            aggregate: inventory,
            strategies: default_strategies(),
        }
    }

    /// 디렉토리의 모든 참조 문서를 결정적 순서로 로드합니다.
    ///
    /// 파일명을 대소문자 무시로 정렬하여 읽고, 뒤 파일은 아직 없는
    /// 식별 키만 추가합니다. 어떤 파일이든 읽기 실패는 치명적입니다 —
    /// 분류 기준이 불완전한 채로 스캔할 수는 없습니다.
    pub fn load_from_dir(
        dir: &Path,
        codec: &dyn InventoryCodec,
    ) -> Result<Self, ScanEngineError> {
        let entries = std::fs::read_dir(dir).map_err(|e| ScanEngineError::ReferenceLoad {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut files: Vec<std::path::PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && codec.can_read(path))
            .collect();
        files.sort_by_key(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });

        let mut aggregate = Inventory::new();
        for file in &files {
            let inventory =
                codec
                    .read_inventory(file)
                    .map_err(|e| ScanEngineError::ReferenceLoad {
                        path: file.display().to_string(),
                        reason: e.to_string(),
                    })?;
            inherit(&mut aggregate, inventory);
            info!(path = %file.display(), "reference inventory inherited");
        }

        debug!(
            files = files.len(),
            artifacts = aggregate.artifacts.len(),
            "reference aggregate ready"
        );

        Ok(Self {
            aggregate,
            strategies: default_strategies(),
        })
    }

    /// 집계가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }

    /// 집계 아티팩트 수를 반환합니다.
    pub fn artifact_count(&self) -> usize {
        self.aggregate.artifacts.len()
    }

    /// 전략 목록을 순서대로 시도하여 첫 일치를 반환합니다.
    pub fn lookup(&self, scanned: &Artifact) -> Option<ReferenceMatch<'_>> {
        for strategy in &self.strategies {
            if let Some(reference) = strategy.find(&self.aggregate, scanned) {
                return Some(ReferenceMatch {
                    reference,
                    strategy: strategy.name(),
                    wildcard: strategy.is_wildcard(),
                });
            }
        }
        None
    }
}

fn default_strategies() -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(ExactMatch),
        Box::new(VersionMatch),
        Box::new(WildcardVersionMatch),
    ]
}

/// 뒤 인벤토리를 집계로 상속합니다 — 새 식별 키만 추가합니다.
fn inherit(aggregate: &mut Inventory, incoming: Inventory) {
    for artifact in incoming.artifacts {
        let Some(id) = artifact.id() else {
            continue;
        };
        if aggregate.find_artifact(id, artifact.checksum()).is_none() {
            aggregate.add_artifact(artifact);
        }
    }
    for asset in incoming.assets {
        let Some(id) = asset.asset_id() else {
            continue;
        };
        if !aggregate.has_asset(id) {
            // 위에서 부재를 확인했으므로 실패하지 않음
            let _ = aggregate.add_asset(asset);
        }
    }
    for license in incoming.license_data {
        let Some(name) = license.canonical_name() else {
            continue;
        };
        if aggregate.find_license(name).is_none() {
            let _ = aggregate.add_license_data(license);
        }
    }
    for pattern in incoming.component_patterns {
        aggregate.add_component_pattern(pattern);
    }
}
