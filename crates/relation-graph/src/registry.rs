//! 관계 레지스트리 — 마커 속성에서 타입 있는 간선을 도출하고 정돈
//!
//! 인벤토리의 아티팩트 속성 중 열 이름이 에셋 id이고 셀 값이 관계
//! 토큰인 것이 마커입니다. 열 이름이 같은 인벤토리의 에셋으로
//! 해석되는 경우에만 관계가 됩니다 — 해석되지 않는 마커는 조용히
//! 버려집니다 (부분 큐레이션은 정상 입력이지 에러가 아닙니다).
//!
//! [`finalize_relationships`](RelationshipRegistry::finalize_relationships)는
//! 종류와 related 집합이 정확히 같은 관계만 합칩니다 (root 집합 합집합).
//! 부분집합 흡수는 하지 않습니다 — 의도된 보수적 선택이므로 "최적화"
//! 하지 마세요.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stocktake_core::inventory::Inventory;
use stocktake_core::metrics as m;

/// 관계 종류 — 고정 마커 토큰 어휘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// 아티팩트가 에셋에 포함됨 (토큰 `x`)
    ContainedIn,
    /// 런타임 의존성 (토큰 `r`)
    RuntimeDependencyOf,
    /// 개발 의존성 (토큰 `d`)
    DevelopmentDependencyOf,
    /// 선택 의존성 (토큰 `o`)
    OptionalDependencyOf,
}

impl RelationKind {
    /// 마커 토큰에서 관계 종류를 해석합니다.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "x" => Some(Self::ContainedIn),
            "r" => Some(Self::RuntimeDependencyOf),
            "d" => Some(Self::DevelopmentDependencyOf),
            "o" => Some(Self::OptionalDependencyOf),
            _ => None,
        }
    }

    /// 관계 종류의 마커 토큰을 반환합니다.
    pub fn token(&self) -> &'static str {
        match self {
            Self::ContainedIn => "x",
            Self::RuntimeDependencyOf => "r",
            Self::DevelopmentDependencyOf => "d",
            Self::OptionalDependencyOf => "o",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainedIn => write!(f, "contained-in"),
            Self::RuntimeDependencyOf => write!(f, "runtime-dependency-of"),
            Self::DevelopmentDependencyOf => write!(f, "development-dependency-of"),
            Self::OptionalDependencyOf => write!(f, "optional-dependency-of"),
        }
    }
}

/// 타입 있는 관계 간선
///
/// {종류, root id 집합, related id 집합}. 두 관계는 종류와 related
/// 집합이 모두 같을 때에만 병합 가능합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// 관계 종류
    pub kind: RelationKind,
    /// 출발(root) 엔티티 id 집합
    pub roots: BTreeSet<String>,
    /// 대상(related) 엔티티 id 집합
    pub related: BTreeSet<String>,
}

impl Relationship {
    /// 단일 root/related 쌍의 관계를 생성합니다.
    pub fn new(kind: RelationKind, root: impl Into<String>, related: impl Into<String>) -> Self {
        Self {
            kind,
            roots: BTreeSet::from([root.into()]),
            related: BTreeSet::from([related.into()]),
        }
    }

    /// 다른 관계와 병합 가능한지 — 종류와 related 집합의 완전 일치.
    pub fn can_merge_with(&self, other: &Relationship) -> bool {
        self.kind == other.kind && self.related == other.related
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots: Vec<&str> = self.roots.iter().map(String::as_str).collect();
        let related: Vec<&str> = self.related.iter().map(String::as_str).collect();
        write!(
            f,
            "{{{}}} -[{}]-> {{{}}}",
            roots.join(", "),
            self.kind,
            related.join(", "),
        )
    }
}

/// 관계 레지스트리
///
/// 인벤토리에서 도출된 관계 목록을 소유합니다. 최소 그래프를 읽으려면
/// 먼저 [`finalize_relationships`](Self::finalize_relationships)를
/// 호출해야 합니다 — 그 전의 목록은 조각나 있을 수 있습니다.
#[derive(Debug, Default)]
pub struct RelationshipRegistry {
    relationships: Vec<Relationship>,
}

impl RelationshipRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 인벤토리의 마커 속성에서 레지스트리를 구축합니다.
    ///
    /// 아티팩트 속성 중 열 이름이 같은 인벤토리의 에셋 id로 해석되고
    /// 값이 관계 토큰인 것만 관계가 됩니다. 해석 불가 마커는 조용히
    /// 버려집니다.
    pub fn build_from_inventory(inventory: &Inventory) -> Self {
        let mut registry = Self::new();

        for artifact in &inventory.artifacts {
            let Some(root_id) = artifact.id() else {
                continue;
            };
            for (column, value) in artifact.attributes.iter() {
                let Some(kind) = RelationKind::from_token(value) else {
                    continue;
                };
                if !inventory.has_asset(column) {
                    // 토큰 모양의 값이라도 열이 에셋으로 해석되지 않으면
                    // 마커가 아님 (예: Verified="x")
                    debug!(
                        artifact = root_id,
                        column, "marker does not resolve to a known asset, dropping"
                    );
                    metrics::counter!(m::RELATIONS_UNRESOLVED_DROPPED_TOTAL).increment(1);
                    continue;
                }

                registry.add_relationship(Relationship::new(kind, root_id, column));
                metrics::counter!(m::RELATIONS_BUILT_TOTAL).increment(1);
            }
        }

        registry
    }

    /// 관계를 추가합니다.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    /// 구조적으로 동일한 관계를 제거합니다.
    ///
    /// 종류, root 집합, related 집합이 모두 같은 첫 항목을 제거하고
    /// `true`를 반환합니다.
    pub fn remove_relationship(&mut self, relationship: &Relationship) -> bool {
        match self.relationships.iter().position(|r| r == relationship) {
            Some(idx) => {
                self.relationships.remove(idx);
                true
            }
            None => false,
        }
    }

    /// 종류와 related 집합이 정확히 같은 관계를 병합합니다.
    ///
    /// root 집합은 합집합이 됩니다. related 집합이 원소 하나라도 다르면
    /// 별개로 남습니다 — 부분집합 흡수는 하지 않습니다. 최소 그래프를
    /// 읽기 전에 반드시 호출해야 합니다.
    pub fn finalize_relationships(&mut self) {
        let mut merged: Vec<Relationship> = Vec::with_capacity(self.relationships.len());
        let mut index: HashMap<(RelationKind, BTreeSet<String>), usize> = HashMap::new();
        let mut merge_count = 0u64;

        for relationship in self.relationships.drain(..) {
            let key = (relationship.kind, relationship.related.clone());
            match index.get(&key) {
                Some(&idx) => {
                    merged[idx].roots.extend(relationship.roots);
                    merge_count += 1;
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(relationship);
                }
            }
        }

        metrics::counter!(m::RELATIONS_MERGED_TOTAL).increment(merge_count);
        self.relationships = merged;
    }

    /// 현재 관계 목록을 반환합니다.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// 관계 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// 레지스트리가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}
