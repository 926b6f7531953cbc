//! 인벤토리 컨테이너 — 스캔/병합의 작업 단위
//!
//! [`Inventory`]는 다중 시트 문서의 메모리 표현입니다:
//! Artifacts / Assets / License Data / Component Patterns / Info.
//! 아티팩트 중복은 병합 엔진이 해소하므로 추가 시 거부하지 않지만,
//! 에셋과 라이선스는 식별자 불변식을 즉시 검사합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attrs::AttributeBag;
use crate::error::InventoryError;
use crate::types::{Artifact, Asset, ComponentPatternData, LicenseData};

/// 인벤토리 — 아티팩트/에셋/라이선스/컴포넌트 패턴의 집합
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// 아티팩트 시트
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// 에셋 시트
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// 라이선스 데이터 시트
    #[serde(default)]
    pub license_data: Vec<LicenseData>,
    /// 컴포넌트 패턴 시트
    #[serde(default)]
    pub component_patterns: Vec<ComponentPatternData>,
    /// 문서 수준 메타데이터 (Info 시트)
    #[serde(default)]
    pub info: AttributeBag,
}

impl Inventory {
    /// 빈 인벤토리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 아티팩트를 추가합니다.
    ///
    /// 중복 표현(representation)은 여기서 거부하지 않습니다.
    /// 정규화는 병합 엔진의 책임입니다.
    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// 에셋을 추가합니다.
    ///
    /// # Errors
    ///
    /// 동일한 `Asset Id`가 이미 존재하면 [`InventoryError::DuplicateIdentity`]
    pub fn add_asset(&mut self, asset: Asset) -> Result<(), InventoryError> {
        if let Some(id) = asset.asset_id() {
            if self.find_asset(id).is_some() {
                return Err(InventoryError::DuplicateIdentity {
                    sheet: "Assets".to_owned(),
                    id: id.to_owned(),
                });
            }
        }
        self.assets.push(asset);
        Ok(())
    }

    /// 라이선스 데이터를 추가합니다.
    ///
    /// # Errors
    ///
    /// 동일한 `Canonical Name`이 이미 존재하면 [`InventoryError::DuplicateIdentity`]
    pub fn add_license_data(&mut self, license: LicenseData) -> Result<(), InventoryError> {
        if let Some(name) = license.canonical_name() {
            if self.find_license(name).is_some() {
                return Err(InventoryError::DuplicateIdentity {
                    sheet: "License Data".to_owned(),
                    id: name.to_owned(),
                });
            }
        }
        self.license_data.push(license);
        Ok(())
    }

    /// 컴포넌트 패턴을 추가합니다.
    pub fn add_component_pattern(&mut self, pattern: ComponentPatternData) {
        self.component_patterns.push(pattern);
    }

    /// (id, checksum) 동일성으로 아티팩트를 조회합니다.
    ///
    /// 체크섬이 양쪽 모두 비어 있으면 id만으로 일치합니다.
    pub fn find_artifact(&self, id: &str, checksum: Option<&str>) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.id() == Some(id) && a.checksum() == checksum)
    }

    /// id가 일치하는 모든 아티팩트를 조회합니다.
    pub fn find_artifacts_by_id(&self, id: &str) -> Vec<&Artifact> {
        self.artifacts.iter().filter(|a| a.id() == Some(id)).collect()
    }

    /// 에셋을 식별자로 조회합니다.
    pub fn find_asset(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.asset_id() == Some(asset_id))
    }

    /// 에셋 식별자 존재 여부를 확인합니다.
    pub fn has_asset(&self, asset_id: &str) -> bool {
        self.find_asset(asset_id).is_some()
    }

    /// 라이선스 데이터를 정규 이름으로 조회합니다.
    pub fn find_license(&self, canonical_name: &str) -> Option<&LicenseData> {
        self.license_data
            .iter()
            .find(|l| l.canonical_name() == Some(canonical_name))
    }

    /// 라이선스 데이터를 정규 이름으로 가변 조회합니다.
    pub fn find_license_mut(&mut self, canonical_name: &str) -> Option<&mut LicenseData> {
        self.license_data
            .iter_mut()
            .find(|l| l.canonical_name() == Some(canonical_name))
    }

    /// 전체 시트가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
            && self.assets.is_empty()
            && self.license_data.is_empty()
            && self.component_patterns.is_empty()
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inventory({} artifacts, {} assets, {} licenses, {} patterns)",
            self.artifacts.len(),
            self.assets.len(),
            self.license_data.len(),
            self.component_patterns.len(),
        )
    }
}
