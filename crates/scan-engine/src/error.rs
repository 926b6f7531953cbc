//! 스캔 엔진 에러 타입
//!
//! [`ScanEngineError`]는 스캔 엔진 모듈 내에서 발생할 수 있는 모든 에러를
//! 나타냅니다. `From<ScanEngineError> for StocktakeError` 구현을 통해
//! `?` 연산자로 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! 아카이브 해제 실패나 읽을 수 없는 파일은 여기 오지 않습니다 —
//! 그런 내용 품질 문제는 아티팩트의 `Errors` 속성으로 강등되고
//! 스캔은 계속됩니다.

use stocktake_core::error::{ScanError, StocktakeError};

/// 스캔 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanEngineError {
    /// 심볼릭 링크 테이블이 구성 시점 검증에 실패
    #[error("invalid symlink table entry '{entry}': {reason}")]
    SymlinkTable {
        /// 문제의 테이블 엔트리 (키 또는 대상)
        entry: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 경로 해석 입력이 절대 경로가 아님
    #[error("path is not absolute: '{0}'")]
    NotAbsolute(String),

    /// 참조 인벤토리 로딩 실패 (분류 기준이 없으므로 치명적)
    #[error("reference inventory load failed: {path}: {reason}")]
    ReferenceLoad {
        /// 대상 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<ScanEngineError> for StocktakeError {
    fn from(err: ScanEngineError) -> Self {
        match err {
            ScanEngineError::SymlinkTable { entry, reason } => StocktakeError::Scan(
                ScanError::SymlinkTable(format!("entry '{entry}': {reason}")),
            ),
            ScanEngineError::NotAbsolute(path) => {
                StocktakeError::Scan(ScanError::NotAbsolute(path))
            }
            ScanEngineError::ReferenceLoad { path, reason } => {
                StocktakeError::Scan(ScanError::ReferenceLoad(format!("{path}: {reason}")))
            }
            ScanEngineError::Config { field, reason } => {
                StocktakeError::Scan(ScanError::Failed(format!("config error: {field}: {reason}")))
            }
            ScanEngineError::Channel(msg) => StocktakeError::Scan(ScanError::Failed(msg)),
            ScanEngineError::Io { path, source } => {
                StocktakeError::Scan(ScanError::Failed(format!("io error: {path}: {source}")))
            }
        }
    }
}
