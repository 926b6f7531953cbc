//! 스캔 엔진 설정
//!
//! [`ScanEngineConfig`]는 core의 [`ScanConfig`](stocktake_core::config::ScanConfig)를
//! 확장하여 엔진 고유 설정(해석 한도, 중첩 해제 한도, 파일 크기 제한)을
//! 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use stocktake_scan::ScanEngineConfigBuilder;
//!
//! let config = ScanEngineConfigBuilder::new()
//!     .root_dir("/srv/app")
//!     .workers(8)
//!     .build()
//!     .unwrap();
//! ```

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanEngineError;
use crate::resolve::DEFAULT_MAX_DEPTH;

/// 스캔 엔진 설정
///
/// core의 `ScanConfig`에서 파생되며, 모듈 고유 확장 필드를 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEngineConfig {
    /// 스캔 루트 디렉토리
    pub root_dir: String,
    /// 중간 산출물(압축 해제) 디렉토리
    pub scratch_dir: String,
    /// 참조 인벤토리 디렉토리 (비어 있으면 참조 매칭 생략)
    pub reference_dir: String,
    /// 선택 포함 글롭 (비어 있으면 전체 선택)
    pub includes: Vec<String>,
    /// 선택 제외 글롭
    pub excludes: Vec<String>,
    /// 압축 해제 대상 포함 글롭
    pub unpack_includes: Vec<String>,
    /// 압축 해제 대상 제외 글롭
    pub unpack_excludes: Vec<String>,
    /// 아카이브를 만나면 자동으로 해제하고 재귀 스캔
    pub implicit_unpack: bool,
    /// 디렉토리별 컴포넌트 패턴 탐지 수행
    pub detect_component_patterns: bool,
    /// 해제된 아카이브 내부의 원시 파일을 개별 아티팩트로도 나열
    pub include_embedded: bool,
    /// 병렬 스캔 워커 수
    pub workers: usize,

    // --- 모듈 고유 확장 ---
    /// 경로 해석 반복 한도
    pub max_resolve_depth: usize,
    /// 중첩 아카이브 해제 한도
    pub max_unpack_depth: usize,
    /// 체크섬 계산 대상 파일 최대 크기 (바이트)
    pub max_file_size: u64,
}

impl Default for ScanEngineConfig {
    fn default() -> Self {
        let core = stocktake_core::config::ScanConfig::default();
        Self {
            root_dir: ".".to_owned(),
            scratch_dir: core.scratch_dir,
            reference_dir: core.reference_dir,
            includes: core.includes,
            excludes: core.excludes,
            unpack_includes: core.unpack_includes,
            unpack_excludes: core.unpack_excludes,
            implicit_unpack: core.implicit_unpack,
            detect_component_patterns: core.detect_component_patterns,
            include_embedded: core.include_embedded,
            workers: core.workers,
            max_resolve_depth: DEFAULT_MAX_DEPTH,
            max_unpack_depth: 8,
            max_file_size: 512 * 1024 * 1024, // 512 MB
        }
    }
}

/// 설정 상한값 상수
const MAX_WORKERS: usize = 256;
const MAX_UNPACK_DEPTH_LIMIT: usize = 64;
const MAX_RESOLVE_DEPTH_LIMIT: usize = 4096;

impl ScanEngineConfig {
    /// core의 `ScanConfig`에서 엔진 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값을 사용합니다.
    pub fn from_core(core: &stocktake_core::config::ScanConfig) -> Self {
        Self {
            scratch_dir: core.scratch_dir.clone(),
            reference_dir: core.reference_dir.clone(),
            includes: core.includes.clone(),
            excludes: core.excludes.clone(),
            unpack_includes: core.unpack_includes.clone(),
            unpack_excludes: core.unpack_excludes.clone(),
            implicit_unpack: core.implicit_unpack,
            detect_component_patterns: core.detect_component_patterns,
            include_embedded: core.include_embedded,
            workers: core.workers,
            ..Self::default()
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// 설정 오류는 치명적이며 스캔 시작 전에 실패합니다.
    pub fn validate(&self) -> Result<(), ScanEngineError> {
        if self.root_dir.trim().is_empty() {
            return Err(ScanEngineError::Config {
                field: "root_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.scratch_dir.trim().is_empty() {
            return Err(ScanEngineError::Config {
                field: "scratch_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ScanEngineError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 1-{MAX_WORKERS}"),
            });
        }

        if self.max_resolve_depth == 0 || self.max_resolve_depth > MAX_RESOLVE_DEPTH_LIMIT {
            return Err(ScanEngineError::Config {
                field: "max_resolve_depth".to_owned(),
                reason: format!("must be 1-{MAX_RESOLVE_DEPTH_LIMIT}"),
            });
        }

        if self.max_unpack_depth == 0 || self.max_unpack_depth > MAX_UNPACK_DEPTH_LIMIT {
            return Err(ScanEngineError::Config {
                field: "max_unpack_depth".to_owned(),
                reason: format!("must be 1-{MAX_UNPACK_DEPTH_LIMIT}"),
            });
        }

        if self.max_file_size == 0 {
            return Err(ScanEngineError::Config {
                field: "max_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        // 글롭은 컴파일 가능해야 함
        self.compile_selectors()?;

        Ok(())
    }

    /// 선택/해제 글롭을 컴파일합니다.
    ///
    /// # Errors
    ///
    /// 유효하지 않은 글롭 패턴이 있으면 [`ScanEngineError::Config`]
    pub fn compile_selectors(&self) -> Result<Selectors, ScanEngineError> {
        Ok(Selectors {
            select: Selector::compile(&self.includes, &self.excludes)?,
            unpack: Selector::compile(&self.unpack_includes, &self.unpack_excludes)?,
        })
    }
}

/// 컴파일된 선택기 묶음
#[derive(Debug, Clone)]
pub struct Selectors {
    /// 스캔 대상 선택기
    pub select: Selector,
    /// 압축 해제 대상 선택기
    pub unpack: Selector,
}

/// 포함/제외 글롭 선택기
///
/// 포함 목록이 비어 있으면 전체를 선택합니다.
#[derive(Debug, Clone)]
pub struct Selector {
    includes: Option<GlobSet>,
    excludes: GlobSet,
}

impl Selector {
    /// 글롭 패턴 목록으로부터 선택기를 컴파일합니다.
    pub fn compile(includes: &[String], excludes: &[String]) -> Result<Self, ScanEngineError> {
        let includes = if includes.is_empty() {
            None
        } else {
            Some(build_globset(includes)?)
        };
        let excludes = build_globset(excludes)?;
        Ok(Self { includes, excludes })
    }

    /// 상대 경로가 선택되는지 판별합니다.
    pub fn is_selected(&self, relative_path: &str) -> bool {
        if self.excludes.is_match(relative_path) {
            return false;
        }
        match &self.includes {
            Some(includes) => includes.is_match(relative_path),
            None => true,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanEngineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanEngineError::Config {
            field: "globs".to_owned(),
            reason: format!("invalid pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanEngineError::Config {
        field: "globs".to_owned(),
        reason: e.to_string(),
    })
}

/// [`ScanEngineConfig`] 빌더
#[derive(Default)]
pub struct ScanEngineConfigBuilder {
    config: ScanEngineConfig,
}

impl ScanEngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스캔 루트 디렉토리를 설정합니다.
    pub fn root_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.root_dir = dir.into();
        self
    }

    /// 스크래치 디렉토리를 설정합니다.
    pub fn scratch_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    /// 참조 인벤토리 디렉토리를 설정합니다.
    pub fn reference_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.reference_dir = dir.into();
        self
    }

    /// 선택 포함 글롭을 설정합니다.
    pub fn includes(mut self, globs: Vec<String>) -> Self {
        self.config.includes = globs;
        self
    }

    /// 선택 제외 글롭을 설정합니다.
    pub fn excludes(mut self, globs: Vec<String>) -> Self {
        self.config.excludes = globs;
        self
    }

    /// 압축 해제 포함 글롭을 설정합니다.
    pub fn unpack_includes(mut self, globs: Vec<String>) -> Self {
        self.config.unpack_includes = globs;
        self
    }

    /// 압축 해제 제외 글롭을 설정합니다.
    pub fn unpack_excludes(mut self, globs: Vec<String>) -> Self {
        self.config.unpack_excludes = globs;
        self
    }

    /// 자동 해제 여부를 설정합니다.
    pub fn implicit_unpack(mut self, enabled: bool) -> Self {
        self.config.implicit_unpack = enabled;
        self
    }

    /// 컴포넌트 패턴 탐지 여부를 설정합니다.
    pub fn detect_component_patterns(mut self, enabled: bool) -> Self {
        self.config.detect_component_patterns = enabled;
        self
    }

    /// 내장 파일 나열 여부를 설정합니다.
    pub fn include_embedded(mut self, enabled: bool) -> Self {
        self.config.include_embedded = enabled;
        self
    }

    /// 워커 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 경로 해석 한도를 설정합니다.
    pub fn max_resolve_depth(mut self, depth: usize) -> Self {
        self.config.max_resolve_depth = depth;
        self
    }

    /// 중첩 해제 한도를 설정합니다.
    pub fn max_unpack_depth(mut self, depth: usize) -> Self {
        self.config.max_unpack_depth = depth;
        self
    }

    /// 최대 파일 크기를 설정합니다.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 [`ScanEngineError::Config`]
    pub fn build(self) -> Result<ScanEngineConfig, ScanEngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
