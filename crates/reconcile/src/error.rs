//! 병합/집계 에러 타입

use stocktake_core::error::{MergeError, StocktakeError};

/// 병합/집계 도메인 에러
///
/// 설정 오류(속성 집합, 글롭)는 치명적이며 어떤 변형도 시작되기 전에
/// 실패합니다. 내용 품질 문제(미승인 중복 소유)는 에러가 아니라
/// 보고서 항목입니다.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// 제외/병합 속성 설정이 유효하지 않음
    #[error("invalid attribute set for '{field}': {reason}")]
    AttributeConfig {
        /// 설정 필드명
        field: String,
        /// 사유
        reason: String,
    },

    /// 허용 중복 글롭이 유효하지 않음
    #[error("invalid allowed-duplicate pattern '{pattern}': {reason}")]
    AllowedDuplicatePattern {
        /// 문제의 패턴
        pattern: String,
        /// 사유
        reason: String,
    },

    /// 컴포넌트 패턴 컴파일 실패
    #[error("component pattern compile failed: {0}")]
    PatternCompile(String),
}

impl From<ReconcileError> for StocktakeError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::AttributeConfig { field, reason } => {
                StocktakeError::Merge(MergeError::Config(format!("{field}: {reason}")))
            }
            ReconcileError::AllowedDuplicatePattern { pattern, reason } => {
                StocktakeError::Merge(MergeError::Config(format!("pattern '{pattern}': {reason}")))
            }
            ReconcileError::PatternCompile(msg) => {
                StocktakeError::Merge(MergeError::Failed(msg))
            }
        }
    }
}
