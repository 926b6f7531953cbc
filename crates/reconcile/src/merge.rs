//! 병합 엔진 — N개의 부분 인벤토리를 하나의 정규 인벤토리로
//!
//! [`MergeEngine::merge_inventories`]는 소스를 순서대로, 대상을 제자리
//! 변형하며 다섯 단계를 수행합니다:
//!
//! 1. **체크섬 보충** — 대상의 빈 체크섬을 같은 id 소스에서 복사
//! 2. **추가** — (id, checksum) 동일성으로 대상에 없는 소스 아티팩트 추가
//! 3. **표현 중복 제거** — 정규화된 표현 키가 같은 아티팩트를 합침
//! 4. **에셋 병합** — 새 `Asset Id`만 추가, 덮어쓰기 없음
//! 5. **라이선스 병합** — 새 정규 이름은 추가, 기존은 속성 병합
//!
//! 동일 입력으로 재병합해도 개수와 병합 속성 값은 변하지 않습니다
//! (멱등). 호출이 반환되기 전에는 부분 병합 상태가 외부에 보이지
//! 않습니다.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use stocktake_core::inventory::Inventory;
use stocktake_core::metrics as m;
use stocktake_core::types::Artifact;

use crate::config::MergePolicy;
use crate::error::ReconcileError;
use crate::representation::{Representation, representation_keys};

/// 병합 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MergeStats {
    /// 대상에 추가된 소스 아티팩트 수
    pub artifacts_appended: usize,
    /// 표현 중복으로 합쳐진 아티팩트 수
    pub duplicates_dropped: usize,
    /// 보충된 체크섬 수
    pub checksums_backfilled: usize,
    /// 추가된 에셋 수
    pub assets_added: usize,
    /// 추가된 라이선스 수
    pub licenses_added: usize,
    /// 속성 병합된 라이선스 수
    pub licenses_merged: usize,
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "appended={} deduped={} backfilled={} assets={} licenses={}+{}",
            self.artifacts_appended,
            self.duplicates_dropped,
            self.checksums_backfilled,
            self.assets_added,
            self.licenses_added,
            self.licenses_merged,
        )
    }
}

/// 인벤토리 병합 엔진
pub struct MergeEngine {
    policy: MergePolicy,
}

impl MergeEngine {
    /// 정책을 검증하고 엔진을 생성합니다.
    ///
    /// # Errors
    ///
    /// 잘못된 속성 집합 설정은 [`ReconcileError::AttributeConfig`] —
    /// 어떤 변형도 시작되기 전에 실패합니다.
    pub fn new(policy: MergePolicy) -> Result<Self, ReconcileError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// 기본 정책으로 엔진을 생성합니다.
    pub fn with_defaults() -> Self {
        // 기본 정책은 검증을 통과함 (config 테스트로 보장)
        Self {
            policy: MergePolicy::default(),
        }
    }

    /// 적용 중인 정책을 반환합니다.
    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// 소스 인벤토리들을 순서대로 대상에 병합합니다.
    ///
    /// 대상은 제자리에서 변형됩니다. 빈 소스 목록은 대상을 바꾸지
    /// 않습니다.
    pub fn merge_inventories(
        &self,
        sources: &[Inventory],
        target: &mut Inventory,
    ) -> MergeStats {
        let mut stats = MergeStats::default();

        for (index, source) in sources.iter().enumerate() {
            debug!(source = index, "merging inventory into target");
            self.backfill_checksums(source, target, &mut stats);
            self.append_artifacts(source, target, &mut stats);
            self.dedup_representations(target, &mut stats);
            self.merge_assets(source, target, &mut stats);
            self.merge_licenses(source, target, &mut stats);
        }

        metrics::counter!(m::MERGE_ARTIFACTS_APPENDED_TOTAL)
            .increment(stats.artifacts_appended as u64);
        metrics::counter!(m::MERGE_DUPLICATES_DROPPED_TOTAL)
            .increment(stats.duplicates_dropped as u64);
        metrics::counter!(m::MERGE_CHECKSUMS_BACKFILLED_TOTAL)
            .increment(stats.checksums_backfilled as u64);

        info!(sources = sources.len(), %stats, "inventories merged");
        stats
    }

    /// 1단계: 빈 체크섬 보충.
    ///
    /// 같은 id의 소스 아티팩트 중 소스 루트 경로가 대상 루트 경로의
    /// 부분 문자열로 나타나는 것을 찾아 체크섬을 복사합니다. 기존
    /// 체크섬은 절대 덮어쓰지 않습니다.
    fn backfill_checksums(
        &self,
        source: &Inventory,
        target: &mut Inventory,
        stats: &mut MergeStats,
    ) {
        for artifact in &mut target.artifacts {
            if artifact.checksum().is_some() {
                continue;
            }
            let Some(id) = artifact.id() else {
                continue;
            };

            let target_paths: Vec<String> =
                artifact.root_paths().iter().map(|p| (*p).to_owned()).collect();

            let backfilled = source
                .artifacts
                .iter()
                .filter(|candidate| candidate.id() == Some(id))
                .find_map(|candidate| {
                    let checksum = candidate.checksum()?;
                    let matches = candidate.root_paths().iter().any(|source_path| {
                        target_paths
                            .iter()
                            .any(|target_path| target_path.contains(source_path))
                    });
                    matches.then(|| checksum.to_owned())
                });

            if let Some(checksum) = backfilled {
                artifact.set_checksum(checksum);
                stats.checksums_backfilled += 1;
            }
        }
    }

    /// 2단계: (id, checksum) 동일성으로 새 아티팩트 추가.
    ///
    /// 이미 존재하는 동일성의 아티팩트는 다시 추가되지 않지만, 병합
    /// 속성 값(루트 경로 등)은 기존 아티팩트로 흡수됩니다 — 동일
    /// 내용을 다른 위치에서 본 소스의 정보가 사라지면 안 됩니다.
    fn append_artifacts(
        &self,
        source: &Inventory,
        target: &mut Inventory,
        stats: &mut MergeStats,
    ) {
        for artifact in &source.artifacts {
            let existing = artifact.id().and_then(|id| {
                target
                    .artifacts
                    .iter_mut()
                    .find(|t| t.id() == Some(id) && t.checksum() == artifact.checksum())
            });
            match existing {
                Some(existing) => {
                    absorb_merge_attributes(existing, artifact, &self.policy.merge_attributes);
                }
                None => {
                    target.add_artifact(artifact.clone());
                    stats.artifacts_appended += 1;
                }
            }
        }
    }

    /// 3단계: 표현 중복 제거.
    ///
    /// 제외 속성은 비교 전에 모든 대상 아티팩트에서 완전히 제거됩니다.
    /// 같은 표현의 첫 번째 아티팩트가 유지되고, 이후 중복의 병합 속성
    /// 값이 유지본에 `, `로 합쳐집니다 (이미 있는 값은 다시 붙지 않음).
    fn dedup_representations(&self, target: &mut Inventory, stats: &mut MergeStats) {
        // 제외 속성 제거는 비교용 사본이 아니라 실제 정리
        for artifact in &mut target.artifacts {
            for excluded in &self.policy.excluded_attributes {
                artifact.attributes.remove(excluded);
            }
        }

        let keys = representation_keys(&target.artifacts, &self.policy.merge_attributes);

        let mut kept: Vec<Artifact> = Vec::with_capacity(target.artifacts.len());
        let mut seen: HashMap<Representation, usize> = HashMap::new();

        for artifact in target.artifacts.drain(..) {
            let representation = Representation::of(&artifact, &keys);
            match seen.get(&representation) {
                Some(&idx) => {
                    absorb_merge_attributes(
                        &mut kept[idx],
                        &artifact,
                        &self.policy.merge_attributes,
                    );
                    stats.duplicates_dropped += 1;
                }
                None => {
                    seen.insert(representation, kept.len());
                    kept.push(artifact);
                }
            }
        }

        target.artifacts = kept;
    }

    /// 4단계: 새 에셋만 추가. 기존 에셋은 절대 덮어쓰지 않습니다.
    fn merge_assets(&self, source: &Inventory, target: &mut Inventory, stats: &mut MergeStats) {
        for asset in &source.assets {
            let Some(id) = asset.asset_id() else {
                continue;
            };
            if !target.has_asset(id) {
                // 부재를 확인했으므로 실패하지 않음
                let _ = target.add_asset(asset.clone());
                stats.assets_added += 1;
            }
        }
    }

    /// 5단계: 라이선스 데이터 병합 (정규 이름 키).
    fn merge_licenses(&self, source: &Inventory, target: &mut Inventory, stats: &mut MergeStats) {
        for license in &source.license_data {
            let Some(name) = license.canonical_name() else {
                continue;
            };
            match target.find_license_mut(name) {
                Some(existing) => {
                    let before = existing.clone();
                    existing.merge_attributes(license);
                    if *existing != before {
                        stats.licenses_merged += 1;
                    }
                }
                None => {
                    let _ = target.add_license_data(license.clone());
                    stats.licenses_added += 1;
                }
            }
        }
    }
}

/// 중복 아티팩트의 병합 속성 값을 유지본으로 흡수합니다.
fn absorb_merge_attributes(kept: &mut Artifact, dropped: &Artifact, merge_attributes: &[String]) {
    for key in merge_attributes {
        let values: Vec<String> = dropped
            .attributes
            .list_values(key)
            .iter()
            .map(|v| (*v).to_owned())
            .collect();
        for value in values {
            kept.attributes.append_to_list(key, &value);
        }
    }
}
