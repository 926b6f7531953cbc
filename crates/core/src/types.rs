//! 도메인 타입 — 인벤토리를 구성하는 엔티티
//!
//! 모든 엔티티는 [`AttributeBag`]을 감싸고 그 위에 타입 있는 접근자를
//! 제공합니다. 고정 구조체 대신 개방형 속성 묶음을 쓰는 이유는 문서의
//! 알 수 없는 열을 보존하면서도 호출 지점에서는 타입 안전성을 잃지 않기
//! 위해서입니다.

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::attrs::{
    ATTR_ARCHIVE_PATH, ATTR_ASSESSMENT_ID, ATTR_ASSET_ID, ATTR_CANONICAL_NAME, ATTR_CHECKSUM,
    ATTR_CLASSIFICATION, ATTR_CLASSIFIER, ATTR_COMMERCIAL, ATTR_COMPONENT, ATTR_COPYLEFT,
    ATTR_ERRORS, ATTR_GROUP_ID, ATTR_ID, ATTR_LICENSE, ATTR_NAME, ATTR_PATH, ATTR_PROJECTS,
    ATTR_ROOT_PATHS, ATTR_SPDX_ID, ATTR_TYPE, ATTR_VERSION, AttributeBag,
};
use crate::error::InventoryError;

/// 단일 논리 소프트웨어 단위 (파일 또는 탐지된 컴포넌트)
///
/// 동일한 내용(체크섬)이 여러 논리 위치에서 발견되어도 아티팩트는 하나이며
/// `Root Paths`에 위치가 누적됩니다. 스캔 중 발생한 비치명 오류는
/// `Errors` 속성으로 강등되어 나중에 검증 단계에서 드러납니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// 열린 속성 묶음
    #[serde(flatten)]
    pub attributes: AttributeBag,
}

impl Artifact {
    /// 빈 아티팩트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 식별자를 가진 아티팩트를 생성합니다.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut artifact = Self::default();
        artifact.attributes.set(ATTR_ID, id);
        artifact
    }

    /// 아티팩트 식별자를 반환합니다.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_ID)
    }

    /// 컴포넌트(논리 이름)를 반환합니다.
    pub fn component(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_COMPONENT)
    }

    /// 버전을 반환합니다.
    pub fn version(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_VERSION)
    }

    /// 그룹 식별자를 반환합니다.
    pub fn group_id(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_GROUP_ID)
    }

    /// 분류자(classifier)를 반환합니다.
    pub fn classifier(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_CLASSIFIER)
    }

    /// 아티팩트 타입을 반환합니다.
    pub fn artifact_type(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_TYPE)
    }

    /// 내용 체크섬을 반환합니다.
    pub fn checksum(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_CHECKSUM)
    }

    /// 내용 체크섬을 설정합니다.
    pub fn set_checksum(&mut self, checksum: impl Into<String>) {
        self.attributes.set(ATTR_CHECKSUM, checksum);
    }

    /// 큐레이션된 분류를 반환합니다.
    pub fn classification(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_CLASSIFICATION)
    }

    /// 라이선스를 반환합니다.
    pub fn license(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_LICENSE)
    }

    /// 동일 내용이 발견된 논리 위치 목록을 반환합니다.
    pub fn root_paths(&self) -> Vec<&str> {
        self.attributes.list_values(ATTR_ROOT_PATHS)
    }

    /// 논리 위치를 추가합니다 (중복은 무시).
    pub fn append_root_path(&mut self, path: &str) -> bool {
        self.attributes.append_to_list(ATTR_ROOT_PATHS, path)
    }

    /// 소속 프로젝트 목록을 반환합니다.
    pub fn projects(&self) -> Vec<&str> {
        self.attributes.list_values(ATTR_PROJECTS)
    }

    /// 소속 프로젝트를 추가합니다 (중복은 무시).
    pub fn append_project(&mut self, project: &str) -> bool {
        self.attributes.append_to_list(ATTR_PROJECTS, project)
    }

    /// 누적된 비치명 오류를 반환합니다.
    pub fn errors(&self) -> Vec<&str> {
        self.attributes.list_values(ATTR_ERRORS)
    }

    /// 비치명 오류를 누적합니다. 스캔은 계속됩니다.
    pub fn append_error(&mut self, message: &str) {
        self.attributes.append_to_list(ATTR_ERRORS, message);
    }

    /// 물리 아카이브 경로를 반환합니다.
    pub fn archive_path(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_ARCHIVE_PATH)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.id().unwrap_or("<no id>"),
            self.version().unwrap_or("?"),
        )
    }
}

/// 최상위 스캔 대상 (컨테이너 이미지, 애플리케이션)
///
/// 아티팩트가 소속되는 단위입니다. `Asset Id`로 유일하며 병합에서
/// 절대 덮어쓰이지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// 열린 속성 묶음
    #[serde(flatten)]
    pub attributes: AttributeBag,
}

impl Asset {
    /// 식별자를 가진 에셋을 생성합니다.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut asset = Self::default();
        asset.attributes.set(ATTR_ASSET_ID, id);
        asset
    }

    /// 에셋 식별자를 반환합니다.
    pub fn asset_id(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_ASSET_ID)
    }

    /// 에셋 이름을 반환합니다.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_NAME)
    }

    /// 평가 식별자를 반환합니다.
    pub fn assessment_id(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_ASSESSMENT_ID)
    }

    /// 에셋 그룹을 반환합니다.
    pub fn group(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_GROUP_ID)
    }

    /// 에셋 경로를 반환합니다.
    pub fn path(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_PATH)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset[{}]", self.asset_id().unwrap_or("<no id>"))
    }
}

/// 라이선스 메타데이터
///
/// `Canonical Name`으로 유일하며, 병합 충돌 시 속성 단위로 합쳐질 뿐
/// 중복 행이 생기지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseData {
    /// 열린 속성 묶음
    #[serde(flatten)]
    pub attributes: AttributeBag,
}

impl LicenseData {
    /// 정규 이름을 가진 라이선스 데이터를 생성합니다.
    pub fn with_canonical_name(name: impl Into<String>) -> Self {
        let mut license = Self::default();
        license.attributes.set(ATTR_CANONICAL_NAME, name);
        license
    }

    /// 라이선스 정규 이름을 반환합니다.
    pub fn canonical_name(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_CANONICAL_NAME)
    }

    /// SPDX 식별자를 반환합니다.
    pub fn spdx_id(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_SPDX_ID)
    }

    /// 상용 라이선스 여부를 반환합니다.
    pub fn is_commercial(&self) -> bool {
        matches!(
            self.attributes.get_nonblank(ATTR_COMMERCIAL),
            Some("true") | Some("x")
        )
    }

    /// 카피레프트 유형을 반환합니다.
    pub fn copyleft(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_COPYLEFT)
    }

    /// 다른 라이선스 데이터의 속성을 흡수합니다.
    ///
    /// 비어 있는 키만 복사하고, 이미 값이 있는 키는 유지합니다.
    pub fn merge_attributes(&mut self, other: &LicenseData) {
        for (key, value) in other.attributes.iter() {
            if self.attributes.get_nonblank(key).is_none() && !value.trim().is_empty() {
                self.attributes.set(key, value);
            }
        }
    }
}

impl fmt::Display for LicenseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "License[{}]",
            self.canonical_name().unwrap_or("<no name>")
        )
    }
}

// --- 컴포넌트 패턴 ---

/// 컴포넌트 패턴 시트의 열 이름
pub const ATTR_COMPONENT_NAME: &str = "Component Name";
/// 컴포넌트 버전 열
pub const ATTR_COMPONENT_VERSION: &str = "Component Version";
/// 패턴이 수렴하는 논리 아티팩트 식별자 열
pub const ATTR_COMPONENT_PART: &str = "Component Part";
/// 포함 글롭 패턴 열
pub const ATTR_INCLUDE_PATTERNS: &str = "Include Patterns";
/// 제외 글롭 패턴 열
pub const ATTR_EXCLUDE_PATTERNS: &str = "Exclude Patterns";
/// 버전 마커(앵커) 경로 열
pub const ATTR_VERSION_ANCHOR: &str = "Version Anchor";
/// 앵커 파일 체크섬 열
pub const ATTR_VERSION_ANCHOR_CHECKSUM: &str = "Version Anchor Checksum";

/// N개의 파일을 하나의 논리 아티팩트로 수렴시키는 매칭 규칙
///
/// 문서에는 행(row)으로 저장되고, 매칭에 쓰일 때 [`compile`](Self::compile)로
/// 글롭을 컴파일합니다. 잘못된 패턴은 컴파일 시점에 실패합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPatternData {
    /// 열린 속성 묶음
    #[serde(flatten)]
    pub attributes: AttributeBag,
}

impl ComponentPatternData {
    /// 필수 필드로 컴포넌트 패턴을 생성합니다.
    pub fn new(
        component_name: impl Into<String>,
        component_version: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        let mut pattern = Self::default();
        pattern.attributes.set(ATTR_COMPONENT_NAME, component_name);
        pattern
            .attributes
            .set(ATTR_COMPONENT_VERSION, component_version);
        pattern.attributes.set(ATTR_VERSION_ANCHOR, anchor);
        pattern
    }

    /// 컴포넌트 이름을 반환합니다.
    pub fn component_name(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_COMPONENT_NAME)
    }

    /// 컴포넌트 버전을 반환합니다.
    pub fn component_version(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_COMPONENT_VERSION)
    }

    /// 수렴 대상 논리 아티팩트 식별자를 반환합니다.
    pub fn component_part(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_COMPONENT_PART)
    }

    /// 버전 마커(앵커) 경로를 반환합니다.
    pub fn version_anchor(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_VERSION_ANCHOR)
    }

    /// 앵커 파일 체크섬을 반환합니다.
    pub fn version_anchor_checksum(&self) -> Option<&str> {
        self.attributes.get_nonblank(ATTR_VERSION_ANCHOR_CHECKSUM)
    }

    /// 포함 글롭 패턴 목록을 반환합니다.
    pub fn include_patterns(&self) -> Vec<&str> {
        self.attributes.list_values(ATTR_INCLUDE_PATTERNS)
    }

    /// 제외 글롭 패턴 목록을 반환합니다.
    pub fn exclude_patterns(&self) -> Vec<&str> {
        self.attributes.list_values(ATTR_EXCLUDE_PATTERNS)
    }

    /// 포함 글롭 패턴을 추가합니다.
    pub fn add_include_pattern(&mut self, pattern: &str) {
        self.attributes
            .append_to_list(ATTR_INCLUDE_PATTERNS, pattern);
    }

    /// 제외 글롭 패턴을 추가합니다.
    pub fn add_exclude_pattern(&mut self, pattern: &str) {
        self.attributes
            .append_to_list(ATTR_EXCLUDE_PATTERNS, pattern);
    }

    /// 글롭 패턴을 컴파일하여 매처를 생성합니다.
    ///
    /// # Errors
    ///
    /// 패턴이 유효한 글롭이 아니면 [`InventoryError::InvalidPattern`]
    pub fn compile(&self) -> Result<CompiledComponentPattern, InventoryError> {
        let include = build_globset(&self.include_patterns())?;
        let exclude = build_globset(&self.exclude_patterns())?;
        Ok(CompiledComponentPattern { include, exclude })
    }
}

impl fmt::Display for ComponentPatternData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentPattern[{} {}]",
            self.component_name().unwrap_or("<unnamed>"),
            self.component_version().unwrap_or("?"),
        )
    }
}

/// 컴파일된 컴포넌트 패턴 매처
#[derive(Debug, Clone)]
pub struct CompiledComponentPattern {
    include: GlobSet,
    exclude: GlobSet,
}

impl CompiledComponentPattern {
    /// 상대 경로가 이 패턴에 수렴되는지 판별합니다.
    pub fn covers(&self, relative_path: &str) -> bool {
        self.include.is_match(relative_path) && !self.exclude.is_match(relative_path)
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet, InventoryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| InventoryError::InvalidPattern {
            pattern: (*pattern).to_owned(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| InventoryError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_accessors() {
        let mut artifact = Artifact::with_id("busybox-1.36.1");
        artifact.attributes.set(ATTR_VERSION, "1.36.1");
        artifact.set_checksum("ab12");
        assert_eq!(artifact.id(), Some("busybox-1.36.1"));
        assert_eq!(artifact.version(), Some("1.36.1"));
        assert_eq!(artifact.checksum(), Some("ab12"));
        assert_eq!(artifact.classification(), None);
    }

    #[test]
    fn artifact_root_paths_are_a_set() {
        let mut artifact = Artifact::with_id("a");
        assert!(artifact.append_root_path("usr/bin/a"));
        assert!(artifact.append_root_path("[layer.tar]/usr/bin/a"));
        assert!(!artifact.append_root_path("usr/bin/a"));
        assert_eq!(
            artifact.root_paths(),
            vec!["usr/bin/a", "[layer.tar]/usr/bin/a"]
        );
    }

    #[test]
    fn artifact_error_accumulation() {
        let mut artifact = Artifact::with_id("broken.zip");
        artifact.append_error("unpack failed: truncated central directory");
        artifact.append_error("checksum unavailable");
        assert_eq!(artifact.errors().len(), 2);
    }

    #[test]
    fn artifact_display() {
        let mut artifact = Artifact::with_id("zlib");
        artifact.attributes.set(ATTR_VERSION, "1.3.1");
        assert_eq!(artifact.to_string(), "zlib@1.3.1");
    }

    #[test]
    fn asset_identity() {
        let mut asset = Asset::with_id("AID-alpine-3.19");
        assert_eq!(asset.asset_id(), Some("AID-alpine-3.19"));
        assert_eq!(asset.name(), None);
        asset.attributes.set(ATTR_GROUP_ID, "base-images");
        assert_eq!(asset.group(), Some("base-images"));
    }

    #[test]
    fn license_merge_attributes_keeps_existing() {
        let mut target = LicenseData::with_canonical_name("Apache License 2.0");
        target.attributes.set(ATTR_SPDX_ID, "Apache-2.0");

        let mut source = LicenseData::with_canonical_name("Apache License 2.0");
        source.attributes.set(ATTR_SPDX_ID, "WRONG-ID");
        source.attributes.set(ATTR_COPYLEFT, "none");

        target.merge_attributes(&source);
        assert_eq!(target.spdx_id(), Some("Apache-2.0"));
        assert_eq!(target.copyleft(), Some("none"));
    }

    #[test]
    fn license_commercial_flag() {
        let mut license = LicenseData::with_canonical_name("Oracle BCL");
        license.attributes.set(ATTR_COMMERCIAL, "x");
        assert!(license.is_commercial());
    }

    #[test]
    fn component_pattern_compile_and_cover() {
        let mut pattern = ComponentPatternData::new("node-module", "4.17.21", "package.json");
        pattern.add_include_pattern("**/*.js");
        pattern.add_include_pattern("package.json");
        pattern.add_exclude_pattern("**/test/**");

        let compiled = pattern.compile().unwrap();
        assert!(compiled.covers("lib/index.js"));
        assert!(compiled.covers("package.json"));
        assert!(!compiled.covers("lib/test/fixture.js"));
        assert!(!compiled.covers("README.md"));
    }

    #[test]
    fn component_pattern_invalid_glob_fails_compile() {
        let mut pattern = ComponentPatternData::new("x", "1", "a");
        pattern.add_include_pattern("a[");
        assert!(pattern.compile().is_err());
    }

    #[test]
    fn entities_serialize_flat() {
        let mut artifact = Artifact::with_id("serde-1.0.0");
        artifact.set_checksum("cafe");
        let json = serde_json::to_string(&artifact).unwrap();
        // 속성이 중첩 없이 평탄하게 직렬화되어야 함
        assert!(json.contains("\"Id\":\"serde-1.0.0\""));
        assert!(json.contains("\"Checksum\":\"cafe\""));

        let parsed: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, artifact);
    }
}
