//! 설정 관리 — stocktake.toml 파싱 및 런타임 설정
//!
//! [`StocktakeConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`STOCKTAKE_SCAN_WORKERS=8` 형식)
//! 3. 설정 파일 (`stocktake.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), stocktake_core::error::StocktakeError> {
//! use stocktake_core::config::StocktakeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = StocktakeConfig::load("stocktake.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = StocktakeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, StocktakeError};

/// Stocktake 통합 설정
///
/// `stocktake.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StocktakeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 엔진 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 병합/정규화 설정
    #[serde(default)]
    pub merge: MergeConfig,
}

impl StocktakeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StocktakeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, StocktakeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StocktakeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                StocktakeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, StocktakeError> {
        toml::from_str(toml_str).map_err(|e| {
            StocktakeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `STOCKTAKE_{SECTION}_{FIELD}`
    /// 예: `STOCKTAKE_SCAN_WORKERS=8`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STOCKTAKE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STOCKTAKE_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "STOCKTAKE_GENERAL_DATA_DIR");

        // Scan
        override_string(&mut self.scan.scratch_dir, "STOCKTAKE_SCAN_SCRATCH_DIR");
        override_string(&mut self.scan.reference_dir, "STOCKTAKE_SCAN_REFERENCE_DIR");
        override_csv(&mut self.scan.includes, "STOCKTAKE_SCAN_INCLUDES");
        override_csv(&mut self.scan.excludes, "STOCKTAKE_SCAN_EXCLUDES");
        override_csv(
            &mut self.scan.unpack_includes,
            "STOCKTAKE_SCAN_UNPACK_INCLUDES",
        );
        override_csv(
            &mut self.scan.unpack_excludes,
            "STOCKTAKE_SCAN_UNPACK_EXCLUDES",
        );
        override_bool(
            &mut self.scan.implicit_unpack,
            "STOCKTAKE_SCAN_IMPLICIT_UNPACK",
        );
        override_bool(
            &mut self.scan.detect_component_patterns,
            "STOCKTAKE_SCAN_DETECT_COMPONENT_PATTERNS",
        );
        override_bool(
            &mut self.scan.include_embedded,
            "STOCKTAKE_SCAN_INCLUDE_EMBEDDED",
        );
        override_usize(&mut self.scan.workers, "STOCKTAKE_SCAN_WORKERS");

        // Merge
        override_csv(
            &mut self.merge.excluded_attributes,
            "STOCKTAKE_MERGE_EXCLUDED_ATTRIBUTES",
        );
        override_csv(
            &mut self.merge.merge_attributes,
            "STOCKTAKE_MERGE_MERGE_ATTRIBUTES",
        );
        override_csv(
            &mut self.merge.allowed_duplicate_patterns,
            "STOCKTAKE_MERGE_ALLOWED_DUPLICATE_PATTERNS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 설정 오류는 치명적이며 어떤 작업도 시작하기 전에 실패합니다.
    pub fn validate(&self) -> Result<(), StocktakeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // workers 검증
        if self.scan.workers == 0 || self.scan.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                field: "scan.workers".to_owned(),
                reason: format!("must be 1-{MAX_WORKERS}"),
            }
            .into());
        }

        // 경로 순회 방지: scratch_dir / reference_dir에 ".." 금지
        for (field, value) in [
            ("scan.scratch_dir", &self.scan.scratch_dir),
            ("scan.reference_dir", &self.scan.reference_dir),
        ] {
            if Path::new(value)
                .components()
                .any(|c| c == std::path::Component::ParentDir)
            {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("'{value}' contains path traversal pattern '..'"),
                }
                .into());
            }
        }

        // 병합 속성 집합 검증: 공백 항목 금지, 제외/병합 집합은 서로소
        for (field, values) in [
            ("merge.excluded_attributes", &self.merge.excluded_attributes),
            ("merge.merge_attributes", &self.merge.merge_attributes),
        ] {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "attribute names must not be blank".to_owned(),
                }
                .into());
            }
        }
        if let Some(overlap) = self
            .merge
            .excluded_attributes
            .iter()
            .find(|e| self.merge.merge_attributes.contains(e))
        {
            return Err(ConfigError::InvalidValue {
                field: "merge.excluded_attributes".to_owned(),
                reason: format!("attribute '{overlap}' is both excluded and merged"),
            }
            .into());
        }

        Ok(())
    }
}

/// 워커 수 상한
const MAX_WORKERS: usize = 256;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/stocktake".to_owned(),
        }
    }
}

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 중간 산출물(압축 해제) 디렉토리
    pub scratch_dir: String,
    /// 참조 인벤토리 디렉토리
    pub reference_dir: String,
    /// 선택 포함 글롭 (비어 있으면 전체)
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
    /// 해제된 아카이브 내부 파일을 개별 아티팩트로도 나열
    pub include_embedded: bool,
    /// 병렬 스캔 워커 수
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scratch_dir: "/var/lib/stocktake/scratch".to_owned(),
            reference_dir: String::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            unpack_includes: vec![
                "**/*.zip".to_owned(),
                "**/*.jar".to_owned(),
                "**/*.war".to_owned(),
                "**/*.tar".to_owned(),
                "**/*.tar.gz".to_owned(),
                "**/*.tgz".to_owned(),
            ],
            unpack_excludes: Vec::new(),
            implicit_unpack: true,
            detect_component_patterns: true,
            include_embedded: true,
            workers: 4,
        }
    }
}

/// 병합/정규화 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// 표현 비교 전에 완전히 제거되는 속성
    pub excluded_attributes: Vec<String>,
    /// 동일성 판단에서 제외하되 값은 합쳐 보존하는 속성
    pub merge_attributes: Vec<String>,
    /// 중복 소유가 허용되는 파일 글롭 (예: 공용 라이선스 파일)
    pub allowed_duplicate_patterns: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            excluded_attributes: vec![
                "Verified".to_owned(),
                "Archive Path".to_owned(),
                "Latest Version".to_owned(),
                "Security Relevance".to_owned(),
                "Security Category".to_owned(),
                "WILDCARD-MATCH".to_owned(),
            ],
            merge_attributes: vec![
                "Root Paths".to_owned(),
                "Projects".to_owned(),
                "Source Project".to_owned(),
            ],
            allowed_duplicate_patterns: vec![
                "**/LICENSE*".to_owned(),
                "**/NOTICE*".to_owned(),
                "**/COPYING*".to_owned(),
            ],
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = StocktakeConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert!(config.scan.implicit_unpack);
        assert_eq!(config.scan.workers, 4);
        assert_eq!(config.merge.excluded_attributes.len(), 6);
        assert_eq!(config.merge.merge_attributes.len(), 3);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = StocktakeConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = StocktakeConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.scan.workers, 4);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[scan]
workers = 16
implicit_unpack = false
"#;
        let config = StocktakeConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.scan.workers, 16);
        assert!(!config.scan.implicit_unpack);
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "pretty"
data_dir = "/opt/stocktake/data"

[scan]
scratch_dir = "/opt/stocktake/scratch"
reference_dir = "/opt/stocktake/reference"
includes = ["**"]
excludes = ["**/.git/**"]
unpack_includes = ["**/*.zip"]
implicit_unpack = true
detect_component_patterns = true
include_embedded = false
workers = 8

[merge]
excluded_attributes = ["Verified"]
merge_attributes = ["Root Paths"]
allowed_duplicate_patterns = ["**/LICENSE*"]
"#;
        let config = StocktakeConfig::parse(toml).unwrap();
        assert_eq!(config.general.data_dir, "/opt/stocktake/data");
        assert_eq!(config.scan.excludes, vec!["**/.git/**"]);
        assert!(!config.scan.include_embedded);
        assert_eq!(config.merge.excluded_attributes, vec!["Verified"]);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = StocktakeConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            StocktakeError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = StocktakeConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = StocktakeConfig::default();
        config.scan.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn validate_rejects_scratch_dir_traversal() {
        let mut config = StocktakeConfig::default();
        config.scan.scratch_dir = "/tmp/../etc".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scratch_dir"));
    }

    #[test]
    fn validate_rejects_blank_merge_attribute() {
        let mut config = StocktakeConfig::default();
        config.merge.merge_attributes.push("  ".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn validate_rejects_overlapping_attribute_sets() {
        let mut config = StocktakeConfig::default();
        config.merge.excluded_attributes.push("Root Paths".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Root Paths"));
    }

    #[test]
    #[serial]
    fn env_override_workers() {
        let mut config = StocktakeConfig::default();
        // SAFETY: serial 테스트로 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("STOCKTAKE_SCAN_WORKERS", "12") };
        config.apply_env_overrides();
        assert_eq!(config.scan.workers, 12);
        unsafe { std::env::remove_var("STOCKTAKE_SCAN_WORKERS") };
    }

    #[test]
    #[serial]
    fn env_override_invalid_bool_keeps_original() {
        let mut config = StocktakeConfig::default();
        // SAFETY: serial 테스트로 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("STOCKTAKE_SCAN_IMPLICIT_UNPACK", "not-a-bool") };
        config.apply_env_overrides();
        assert!(config.scan.implicit_unpack);
        unsafe { std::env::remove_var("STOCKTAKE_SCAN_IMPLICIT_UNPACK") };
    }

    #[test]
    #[serial]
    fn env_override_csv() {
        let mut config = StocktakeConfig::default();
        // SAFETY: serial 테스트로 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("STOCKTAKE_SCAN_EXCLUDES", "**/.git/**, **/target/**") };
        config.apply_env_overrides();
        assert_eq!(config.scan.excludes, vec!["**/.git/**", "**/target/**"]);
        unsafe { std::env::remove_var("STOCKTAKE_SCAN_EXCLUDES") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = StocktakeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = StocktakeConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.scan.workers, parsed.scan.workers);
        assert_eq!(
            config.merge.excluded_attributes,
            parsed.merge.excluded_attributes
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = StocktakeConfig::from_file("/nonexistent/path/stocktake.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            StocktakeError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
