//! 병합 정책 설정
//!
//! [`MergePolicy`]는 core의 [`MergeConfig`](stocktake_core::config::MergeConfig)에서
//! 파생되며, 표현 비교에서 제외/보존되는 속성 집합과 허용 중복 글롭을
//! 담습니다. 잘못된 정책은 치명적이며 병합 시작 전에 실패합니다.

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

/// 병합 정책
///
/// - **excluded_attributes**: 표현 비교 전에 모든 아티팩트에서 완전히
///   제거되는 속성
/// - **merge_attributes**: 동일성 판단에 쓰지 않되 중복 제거 시 값을
///   `, `로 합쳐 보존하는 속성
/// - **allowed_duplicate_patterns**: 여러 아티팩트가 공유해도 결함이
///   아닌 파일 글롭 (예: 공용 라이선스 파일)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergePolicy {
    /// 표현 비교 전에 완전히 제거되는 속성
    pub excluded_attributes: Vec<String>,
    /// 보존하되 동일성에서 제외하는 속성
    pub merge_attributes: Vec<String>,
    /// 중복 소유가 허용되는 파일 글롭
    pub allowed_duplicate_patterns: Vec<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        let core = stocktake_core::config::MergeConfig::default();
        Self {
            excluded_attributes: core.excluded_attributes,
            merge_attributes: core.merge_attributes,
            allowed_duplicate_patterns: core.allowed_duplicate_patterns,
        }
    }
}

impl MergePolicy {
    /// core의 `MergeConfig`에서 정책을 생성합니다.
    pub fn from_core(core: &stocktake_core::config::MergeConfig) -> Self {
        Self {
            excluded_attributes: core.excluded_attributes.clone(),
            merge_attributes: core.merge_attributes.clone(),
            allowed_duplicate_patterns: core.allowed_duplicate_patterns.clone(),
        }
    }

    /// 정책의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - 속성 이름은 공백일 수 없음
    /// - 같은 속성이 제외 집합과 병합 집합에 동시에 있을 수 없음
    /// - 같은 집합 안에 중복 항목이 있을 수 없음
    pub fn validate(&self) -> Result<(), ReconcileError> {
        for (field, values) in [
            ("excluded_attributes", &self.excluded_attributes),
            ("merge_attributes", &self.merge_attributes),
        ] {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ReconcileError::AttributeConfig {
                    field: field.to_owned(),
                    reason: "attribute names must not be blank".to_owned(),
                });
            }
            let mut seen = std::collections::HashSet::new();
            for value in values {
                if !seen.insert(value.as_str()) {
                    return Err(ReconcileError::AttributeConfig {
                        field: field.to_owned(),
                        reason: format!("duplicate attribute '{value}'"),
                    });
                }
            }
        }

        if let Some(overlap) = self
            .excluded_attributes
            .iter()
            .find(|e| self.merge_attributes.contains(e))
        {
            return Err(ReconcileError::AttributeConfig {
                field: "excluded_attributes".to_owned(),
                reason: format!("attribute '{overlap}' is both excluded and merged"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        MergePolicy::default().validate().unwrap();
    }

    #[test]
    fn default_policy_has_documented_sets() {
        let policy = MergePolicy::default();
        assert!(policy.excluded_attributes.contains(&"Verified".to_owned()));
        assert!(
            policy
                .excluded_attributes
                .contains(&"WILDCARD-MATCH".to_owned())
        );
        assert!(policy.merge_attributes.contains(&"Root Paths".to_owned()));
        assert!(
            policy
                .merge_attributes
                .contains(&"Source Project".to_owned())
        );
    }

    #[test]
    fn blank_attribute_is_fatal() {
        let policy = MergePolicy {
            excluded_attributes: vec!["".to_owned()],
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn duplicate_attribute_is_fatal() {
        let policy = MergePolicy {
            merge_attributes: vec!["Root Paths".to_owned(), "Root Paths".to_owned()],
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn overlapping_sets_are_fatal() {
        let policy = MergePolicy {
            excluded_attributes: vec!["Root Paths".to_owned()],
            merge_attributes: vec!["Root Paths".to_owned()],
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn from_core_copies_sets() {
        let core = stocktake_core::config::MergeConfig::default();
        let policy = MergePolicy::from_core(&core);
        assert_eq!(policy.excluded_attributes, core.excluded_attributes);
        assert_eq!(policy.merge_attributes, core.merge_attributes);
    }
}
