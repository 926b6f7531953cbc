//! 컴포넌트 컨트리뷰터 — 형식별 컴포넌트 인식기
//!
//! [`Contributor`] trait은 디렉토리 하나를 보고 컴포넌트 패턴 기여를
//! 반환하는 인터페이스입니다. 스캔 엔진이 디렉토리마다 호출하며,
//! 기여가 있으면 해당 패턴이 덮는 파일들은 원시 파일 나열에서
//! 제외됩니다.
//!
//! # 지원 형식
//!
//! - `package.json` (npm) -- [`NpmContributor`]
//! - `Cargo.toml` (cargo) -- [`CargoContributor`]
//! - `pom.properties` (maven) -- [`MavenContributor`]
//! - `*.dist-info/METADATA` (python wheel) -- [`WheelContributor`]
//! - `Packages.db` (rpm NDB) -- [`RpmNdbContributor`]
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `Contributor` trait을 구현하고
//! [`default_contributors`]에 준하는 목록에 등록합니다.

pub mod cargo;
pub mod maven;
pub mod ndb;
pub mod npm;
pub mod rpm;
pub mod wheel;

use std::path::{Path, PathBuf};

use stocktake_core::types::{Artifact, ComponentPatternData};

use crate::error::ScanEngineError;

/// 컨트리뷰터 한 번의 기여
///
/// 패턴 하나(0 또는 1)가 N개의 파일을 논리 아티팩트로 수렴시킵니다.
/// 대부분의 형식은 아티팩트 하나를 내지만, 패키지 카탈로그(rpm DB)는
/// 카탈로그가 기술하는 설치 패키지마다 아티팩트를 냅니다.
#[derive(Debug, Clone)]
pub struct ComponentPatternContribution {
    /// 등록할 컴포넌트 패턴
    pub pattern: ComponentPatternData,
    /// 패턴이 대표하는 논리 아티팩트 목록
    pub artifacts: Vec<Artifact>,
    /// 패턴이 덮는 물리 파일 목록 (원시 나열에서 제외됨)
    pub covered_files: Vec<PathBuf>,
}

/// 컴포넌트 인식기 trait
///
/// 디렉토리를 보고 0 또는 1개의 기여를 반환합니다. 내부적으로 어떤
/// 형식이든 자유롭게 파싱할 수 있습니다 (텍스트 매니페스트, 바이너리
/// 카탈로그 등).
pub trait Contributor: Send + Sync {
    /// 컨트리뷰터 이름 (로깅/메트릭 레이블)
    fn name(&self) -> &str;

    /// 앵커 파일 존재 등 저렴한 사전 판별.
    fn applies_to(&self, dir: &Path) -> bool;

    /// 디렉토리에서 컴포넌트 패턴 기여를 도출합니다.
    ///
    /// 파싱 실패는 내용 품질 문제이므로 호출자가 경고로 강등합니다.
    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError>;
}

/// 기본 컨트리뷰터 목록을 생성합니다.
pub fn default_contributors() -> Vec<Box<dyn Contributor>> {
    vec![
        Box::new(npm::NpmContributor),
        Box::new(cargo::CargoContributor),
        Box::new(maven::MavenContributor),
        Box::new(wheel::WheelContributor),
        Box::new(rpm::RpmNdbContributor::default()),
    ]
}

/// 디렉토리 아래의 파일을 수집합니다 (컨트리뷰터 공용 헬퍼).
///
/// `skip_dirs`에 포함된 이름의 하위 디렉토리는 건너뜁니다.
pub(crate) fn collect_files(dir: &Path, skip_dirs: &[&str]) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| skip_dirs.contains(&name)))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}
