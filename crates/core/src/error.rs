//! 에러 타입 — 도메인별 에러 정의

/// Stocktake 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum StocktakeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 인벤토리 모델/문서 에러
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// 스캔 엔진 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 인벤토리 병합 에러
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
///
/// 설정 오류는 치명적이며 작업 시작 전에 실패합니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 인벤토리 모델/문서 에러
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// 문서 읽기 실패
    #[error("failed to read inventory document: {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// 문서 쓰기 실패
    #[error("failed to write inventory document: {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// 중복된 엔티티 식별자 (구조 불변식 위반, 즉시 실패)
    #[error("duplicate identity '{id}' in sheet '{sheet}'")]
    DuplicateIdentity { sheet: String, id: String },

    /// 유효하지 않은 글롭 패턴
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// 스캔 엔진 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 심볼릭 링크 테이블이 유효하지 않음
    #[error("invalid symlink table: {0}")]
    SymlinkTable(String),

    /// 절대 경로가 아닌 입력
    #[error("path is not absolute: {0}")]
    NotAbsolute(String),

    /// 참조 인벤토리 로딩 실패 (분류 기준이 없으므로 치명적)
    #[error("reference inventory load failed: {0}")]
    ReferenceLoad(String),

    /// 스캔 실패
    #[error("scan failed: {0}")]
    Failed(String),
}

/// 인벤토리 병합 에러
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// 제외/병합 속성 설정이 유효하지 않음
    #[error("invalid merge attribute configuration: {0}")]
    Config(String),

    /// 병합 실패
    #[error("merge failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "scan.workers".to_owned(),
            reason: "must be 1-256".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("scan.workers"));
        assert!(msg.contains("must be 1-256"));
    }

    #[test]
    fn errors_convert_to_top_level() {
        let err: StocktakeError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(err, StocktakeError::Config(_)));

        let err: StocktakeError = ScanError::NotAbsolute("relative/path".to_owned()).into();
        assert!(matches!(err, StocktakeError::Scan(_)));

        let err: StocktakeError = MergeError::Config("overlap".to_owned()).into();
        assert!(matches!(err, StocktakeError::Merge(_)));
    }

    #[test]
    fn duplicate_identity_display() {
        let err = InventoryError::DuplicateIdentity {
            sheet: "Assets".to_owned(),
            id: "AID-app".to_owned(),
        };
        assert!(err.to_string().contains("AID-app"));
        assert!(err.to_string().contains("Assets"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StocktakeError = io.into();
        assert!(matches!(err, StocktakeError::Io(_)));
    }
}
