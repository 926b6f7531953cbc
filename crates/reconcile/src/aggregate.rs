//! 파일 커버리지 집계 — 아티팩트별 소유 파일의 분할
//!
//! 스캔 인벤토리의 각 아티팩트가 실제로 덮는 파일 집합을 계산하고
//! 소유권을 세 갈래로 나눕니다:
//!
//! - **배타 소유**: 정확히 하나의 아티팩트가 주장
//! - **허용 중복**: 명시적으로 승인된 공유 (예: 공용 라이선스 파일)
//! - **미승인 중복**: 승인되지 않은 겹침 — 데이터 품질 결함으로
//!   보고되며, 조용히 받아들여지지 않습니다 (에러도 아닙니다)
//!
//! 파일 전집합은 인벤토리의 논리 위치(`Root Paths`)이고, 컴포넌트
//! 패턴의 글롭은 패턴 앵커 디렉토리 아래의 위치에 적용됩니다.

use std::collections::BTreeMap;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::debug;

use stocktake_core::inventory::Inventory;

use crate::error::ReconcileError;

/// 아티팩트 하나의 커버리지 분할
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileCoverage {
    /// 아티팩트 식별자
    pub artifact_id: String,
    /// 배타적으로 소유한 파일
    pub exclusive: Vec<String>,
    /// 허용된 공유 파일
    pub allowed_duplicates: Vec<String>,
    /// 미승인 겹침 파일
    pub contested: Vec<String>,
}

/// 미승인 중복 파일과 주장 아티팩트 목록
#[derive(Debug, Clone, Serialize)]
pub struct ContestedFile {
    /// 파일의 논리 위치
    pub path: String,
    /// 이 파일을 주장하는 아티팩트 id 목록
    pub claimants: Vec<String>,
}

/// 커버리지 보고서
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    /// 아티팩트별 분할
    pub coverages: Vec<FileCoverage>,
    /// 미승인 중복 파일 목록 (보고 대상)
    pub contested: Vec<ContestedFile>,
}

impl CoverageReport {
    /// 미승인 중복이 없는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.contested.is_empty()
    }
}

/// 파일 커버리지 집계기
pub struct Aggregator {
    allowed: GlobSet,
}

impl Aggregator {
    /// 허용 중복 글롭으로 집계기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 유효하지 않은 글롭은 [`ReconcileError::AllowedDuplicatePattern`]
    pub fn new(allowed_duplicate_patterns: &[String]) -> Result<Self, ReconcileError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in allowed_duplicate_patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ReconcileError::AllowedDuplicatePattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                }
            })?;
            builder.add(glob);
        }
        let allowed = builder
            .build()
            .map_err(|e| ReconcileError::AllowedDuplicatePattern {
                pattern: allowed_duplicate_patterns.join(", "),
                reason: e.to_string(),
            })?;
        Ok(Self { allowed })
    }

    /// 기본 정책의 허용 중복 글롭으로 집계기를 생성합니다.
    pub fn with_defaults() -> Result<Self, ReconcileError> {
        Self::new(&crate::config::MergePolicy::default().allowed_duplicate_patterns)
    }

    /// 인벤토리의 파일 커버리지를 계산합니다.
    ///
    /// # Errors
    ///
    /// 컴포넌트 패턴 글롭 컴파일 실패는 [`ReconcileError::PatternCompile`]
    pub fn aggregate(&self, inventory: &Inventory) -> Result<CoverageReport, ReconcileError> {
        // 파일 전집합: 모든 아티팩트의 논리 위치
        let universe: Vec<String> = inventory
            .artifacts
            .iter()
            .flat_map(|artifact| artifact.root_paths())
            .map(str::to_owned)
            .collect();

        // 파일 → 주장 아티팩트 (BTreeMap으로 결정적 순서)
        let mut claims: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for artifact in &inventory.artifacts {
            let Some(id) = artifact.id() else {
                continue;
            };
            for path in artifact.root_paths() {
                push_claim(&mut claims, path, id);
            }

            // 컴포넌트 아티팩트는 패턴 글롭이 덮는 전집합 위치도 주장
            for pattern in &inventory.component_patterns {
                if pattern.component_part() != Some(id) {
                    continue;
                }
                let compiled = pattern
                    .compile()
                    .map_err(|e| ReconcileError::PatternCompile(e.to_string()))?;
                for anchor_dir in artifact.root_paths() {
                    let prefix = format!("{anchor_dir}/");
                    for candidate in &universe {
                        if let Some(rel) = candidate.strip_prefix(&prefix) {
                            if compiled.covers(rel) {
                                push_claim(&mut claims, candidate, id);
                            }
                        }
                    }
                }
            }
        }

        let mut coverages: BTreeMap<String, FileCoverage> = BTreeMap::new();
        let mut contested = Vec::new();

        for (path, claimants) in &claims {
            let shared = claimants.len() > 1;
            let allowed = shared && self.allowed.is_match(path.as_str());
            if shared && !allowed {
                debug!(path = %path, claimants = claimants.len(), "unsanctioned duplicate ownership");
                contested.push(ContestedFile {
                    path: path.clone(),
                    claimants: claimants.clone(),
                });
            }

            for claimant in claimants {
                let coverage = coverages
                    .entry(claimant.clone())
                    .or_insert_with(|| FileCoverage {
                        artifact_id: claimant.clone(),
                        ..Default::default()
                    });
                if !shared {
                    coverage.exclusive.push(path.clone());
                } else if allowed {
                    coverage.allowed_duplicates.push(path.clone());
                } else {
                    coverage.contested.push(path.clone());
                }
            }
        }

        Ok(CoverageReport {
            coverages: coverages.into_values().collect(),
            contested,
        })
    }
}

fn push_claim(claims: &mut BTreeMap<String, Vec<String>>, path: &str, id: &str) {
    let claimants = claims.entry(path.to_owned()).or_default();
    if !claimants.iter().any(|existing| existing == id) {
        claimants.push(id.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::types::{Artifact, ComponentPatternData};

    fn artifact_at(id: &str, paths: &[&str]) -> Artifact {
        let mut artifact = Artifact::with_id(id);
        for path in paths {
            artifact.append_root_path(path);
        }
        artifact
    }

    #[test]
    fn exclusive_ownership() {
        let mut inventory = Inventory::new();
        inventory.add_artifact(artifact_at("a", &["lib/a.so"]));
        inventory.add_artifact(artifact_at("b", &["lib/b.so"]));

        let report = Aggregator::with_defaults().unwrap().aggregate(&inventory).unwrap();
        assert!(report.is_clean());
        assert!(report.coverages.iter().all(|c| c.contested.is_empty()));
        assert_eq!(report.coverages.len(), 2);
        assert_eq!(report.coverages[0].exclusive.len(), 1);
    }

    #[test]
    fn license_files_are_allowed_duplicates() {
        let mut inventory = Inventory::new();
        inventory.add_artifact(artifact_at("a", &["vendor/a/LICENSE.txt"]));
        inventory.add_artifact(artifact_at("b", &["vendor/a/LICENSE.txt"]));

        let report = Aggregator::with_defaults().unwrap().aggregate(&inventory).unwrap();
        assert!(report.is_clean());
        let a = report.coverages.iter().find(|c| c.artifact_id == "a").unwrap();
        assert_eq!(a.allowed_duplicates, vec!["vendor/a/LICENSE.txt"]);
    }

    #[test]
    fn unsanctioned_overlap_is_reported_not_accepted() {
        let mut inventory = Inventory::new();
        inventory.add_artifact(artifact_at("a", &["lib/shared.so"]));
        inventory.add_artifact(artifact_at("b", &["lib/shared.so"]));

        let report = Aggregator::with_defaults().unwrap().aggregate(&inventory).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.contested.len(), 1);
        assert_eq!(report.contested[0].path, "lib/shared.so");
        assert_eq!(report.contested[0].claimants, vec!["a", "b"]);
    }

    #[test]
    fn component_pattern_claims_files_under_anchor() {
        let mut inventory = Inventory::new();
        inventory.add_artifact(artifact_at("left-pad-1.3.0", &["app"]));
        inventory.add_artifact(artifact_at("index.js", &["app/index.js"]));

        let mut pattern = ComponentPatternData::new("left-pad", "1.3.0", "package.json");
        pattern
            .attributes
            .set(stocktake_core::types::ATTR_COMPONENT_PART, "left-pad-1.3.0");
        pattern.add_include_pattern("**/*");
        inventory.add_component_pattern(pattern);

        let report = Aggregator::with_defaults().unwrap().aggregate(&inventory).unwrap();
        // index.js는 자기 자신과 컴포넌트 패턴 둘 다 주장 → 미승인 중복
        assert!(!report.is_clean());
        assert_eq!(report.contested[0].path, "app/index.js");
        assert_eq!(
            report.contested[0].claimants,
            vec!["left-pad-1.3.0", "index.js"]
        );
    }

    #[test]
    fn invalid_allowed_pattern_is_fatal() {
        assert!(Aggregator::new(&["a[".to_owned()]).is_err());
    }
}
