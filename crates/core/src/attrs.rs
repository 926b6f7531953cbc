//! 속성 컨테이너 — 순서가 보존되는 개방형 key/value 저장소
//!
//! 인벤토리 문서의 각 행은 고정 스키마가 아니라 열(column) 집합이 열려 있는
//! 속성 묶음입니다. [`AttributeBag`]은 삽입 순서를 보존하면서 알 수 없는
//! 열을 그대로 유지하고, 타입이 필요한 접근은 엔티티 래퍼
//! ([`Artifact`](crate::types::Artifact) 등)의 접근자 계층에서 제공합니다.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// --- 잘 알려진 속성 키 상수 ---
// 인벤토리 문서의 열 이름과 1:1로 대응합니다.

/// 아티팩트 식별자 열
pub const ATTR_ID: &str = "Id";
/// 컴포넌트(논리 이름) 열
pub const ATTR_COMPONENT: &str = "Component";
/// 버전 열
pub const ATTR_VERSION: &str = "Version";
/// 그룹 식별자 열
pub const ATTR_GROUP_ID: &str = "Group Id";
/// 분류자(classifier) 열
pub const ATTR_CLASSIFIER: &str = "Classifier";
/// 아티팩트 타입 열
pub const ATTR_TYPE: &str = "Type";
/// 내용 체크섬 열
pub const ATTR_CHECKSUM: &str = "Checksum";
/// 동일 내용이 발견된 논리 위치 목록 열
pub const ATTR_ROOT_PATHS: &str = "Root Paths";
/// 소속 프로젝트 목록 열
pub const ATTR_PROJECTS: &str = "Projects";
/// 큐레이션된 분류 열
pub const ATTR_CLASSIFICATION: &str = "Classification";
/// 라이선스 열
pub const ATTR_LICENSE: &str = "License";
/// 스캔 중 누적된 비치명 오류 열
pub const ATTR_ERRORS: &str = "Errors";
/// 병합 출처 프로젝트 열
pub const ATTR_SOURCE_PROJECT: &str = "Source Project";

// 병합 비교에서 기본 제외되는 열
/// 검증 플래그 열
pub const ATTR_VERIFIED: &str = "Verified";
/// 아카이브 물리 경로 열
pub const ATTR_ARCHIVE_PATH: &str = "Archive Path";
/// 최신 버전 열
pub const ATTR_LATEST_VERSION: &str = "Latest Version";
/// 보안 관련성 열
pub const ATTR_SECURITY_RELEVANCE: &str = "Security Relevance";
/// 보안 카테고리 열
pub const ATTR_SECURITY_CATEGORY: &str = "Security Category";
/// 와일드카드 매칭 표시 열
pub const ATTR_WILDCARD_MATCH: &str = "WILDCARD-MATCH";

// Asset / License Data 시트의 식별자 열
/// 에셋 식별자 열
pub const ATTR_ASSET_ID: &str = "Asset Id";
/// 에셋 이름 열
pub const ATTR_NAME: &str = "Name";
/// 평가(assessment) 식별자 열
pub const ATTR_ASSESSMENT_ID: &str = "Assessment Id";
/// 에셋 경로 열
pub const ATTR_PATH: &str = "Path";
/// 라이선스 정규 이름 열
pub const ATTR_CANONICAL_NAME: &str = "Canonical Name";
/// SPDX 식별자 열
pub const ATTR_SPDX_ID: &str = "SPDX Id";
/// 상용 라이선스 플래그 열
pub const ATTR_COMMERCIAL: &str = "Commercial";
/// 카피레프트 유형 열
pub const ATTR_COPYLEFT: &str = "Copyleft";

/// 목록형 속성 값의 구분자 (`Root Paths`, `Projects`, `Errors` 등)
pub const LIST_SEPARATOR: &str = ", ";

/// 순서 보존 속성 묶음
///
/// 열 이름 → 값 쌍을 삽입 순서대로 유지합니다. 같은 키를 다시 설정하면
/// 위치를 유지한 채 값만 교체됩니다. 알 수 없는 열도 손실 없이 보존되어
/// 문서 라운드트립에서 정보가 사라지지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    entries: Vec<(String, String)>,
}

impl AttributeBag {
    /// 빈 속성 묶음을 생성합니다.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 속성을 설정합니다.
    ///
    /// 이미 존재하는 키는 삽입 위치를 유지한 채 값을 교체합니다.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// 속성 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 공백이 아닌 속성 값만 조회합니다.
    ///
    /// 값이 없거나 공백 문자뿐이면 `None`을 반환합니다.
    pub fn get_nonblank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// 속성을 제거하고 제거된 값을 반환합니다.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// 키 존재 여부를 확인합니다.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// 삽입 순서대로 키를 순회합니다.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// 삽입 순서대로 (키, 값) 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 저장된 속성 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 속성이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 목록형 속성에 값을 추가합니다 (집합 의미).
    ///
    /// 기존 목록에 이미 포함된 값은 다시 추가하지 않습니다.
    /// 추가가 일어났으면 `true`를 반환합니다.
    pub fn append_to_list(&mut self, key: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        match self.get_nonblank(key) {
            Some(existing) => {
                if existing.split(LIST_SEPARATOR).any(|item| item == value) {
                    return false;
                }
                let joined = format!("{existing}{LIST_SEPARATOR}{value}");
                self.set(key, joined);
                true
            }
            None => {
                self.set(key, value);
                true
            }
        }
    }

    /// 목록형 속성을 개별 값으로 분해합니다.
    pub fn list_values(&self, key: &str) -> Vec<&str> {
        match self.get_nonblank(key) {
            Some(joined) => joined.split(LIST_SEPARATOR).collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for AttributeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeBag({} attributes)", self.entries.len())
    }
}

// 순서 보존을 위해 map 직렬화를 수동 구현합니다.
impl Serialize for AttributeBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BagVisitor;

        impl<'de> Visitor<'de> for BagVisitor {
            type Value = AttributeBag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute name to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut bag = AttributeBag::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    bag.set(key, value);
                }
                Ok(bag)
            }
        }

        deserializer.deserialize_map(BagVisitor)
    }
}
