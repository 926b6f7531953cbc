//! 표현 키 — 순서 독립적인 아티팩트 동일성 식별자
//!
//! 중복 제거의 동일성은 속성 문자열 연결이 아니라 정규화된 구조 키로
//! 판단합니다: 제외/병합 속성을 뺀 키 전집합(union) 위에서, 대소문자
//! 무시 정렬된 (키, 값) 쌍의 목록입니다. 없는 키는 빈 값으로
//! 취급되어 속성 삽입 순서나 공백 열 유무에 흔들리지 않습니다.

use std::collections::HashSet;

use stocktake_core::types::Artifact;

/// 정규화된 아티팩트 표현
///
/// `Eq + Hash`로 해시맵 키가 되며, 같은 표현 = 같은 논리 아티팩트입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Representation(Vec<(String, String)>);

impl Representation {
    /// 키 전집합 위에서 아티팩트의 표현을 만듭니다.
    ///
    /// `keys`는 이미 제외/병합 속성이 걸러진, 정렬된 키 목록입니다.
    pub fn of(artifact: &Artifact, keys: &[String]) -> Self {
        let pairs = keys
            .iter()
            .map(|key| {
                let value = artifact.attributes.get(key).unwrap_or("").to_owned();
                (key.clone(), value)
            })
            .collect();
        Self(pairs)
    }
}

/// 대상 아티팩트들의 표현 키 전집합을 계산합니다.
///
/// 제외 속성은 이 시점에 이미 아티팩트에서 제거되어 있어야 하며,
/// 병합 속성은 여기서 걸러집니다. 결과는 대소문자 무시로 정렬된
/// 안정적 순서입니다.
pub fn representation_keys(artifacts: &[Artifact], merge_attributes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for artifact in artifacts {
        for key in artifact.attributes.keys() {
            if merge_attributes.iter().any(|m| m == key) {
                continue;
            }
            if seen.insert(key.to_owned()) {
                keys.push(key.to_owned());
            }
        }
    }
    keys.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    keys
}
