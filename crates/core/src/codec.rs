//! 인벤토리 문서 코덱 경계 — 다중 시트 문서의 읽기/쓰기 seam
//!
//! 영속 인벤토리는 시트별(Artifacts / Assets / License Data /
//! Component Patterns / Info) 표 형식 문서입니다. 논리 스키마만이
//! 계약이며, 스프레드시트 등 특정 파일 형식의 코덱은 외부 협력자가
//! [`InventoryCodec`]을 구현하여 끼워 넣습니다.
//!
//! 이 크레이트는 네이티브 디버그 형식인 [`JsonInventoryCodec`]만
//! 제공합니다.

use std::path::Path;

use crate::error::InventoryError;
use crate::inventory::Inventory;

/// 인벤토리 문서 읽기/쓰기 인터페이스
///
/// 새로운 문서 형식을 지원하려면 이 trait을 구현합니다.
pub trait InventoryCodec: Send + Sync {
    /// 코덱이 담당하는 형식 이름 (로깅용)
    fn format_name(&self) -> &str;

    /// 주어진 경로의 파일을 이 코덱이 처리할 수 있는지 확인합니다.
    fn can_read(&self, path: &Path) -> bool;

    /// 문서를 읽어 인벤토리를 생성합니다.
    fn read_inventory(&self, path: &Path) -> Result<Inventory, InventoryError>;

    /// 인벤토리를 문서로 기록합니다.
    fn write_inventory(&self, inventory: &Inventory, path: &Path) -> Result<(), InventoryError>;
}

/// JSON 기반 인벤토리 코덱
///
/// 시트 구조를 JSON 객체로 직렬화합니다. 도구 간 교환과 테스트의
/// 기본 형식입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInventoryCodec;

impl JsonInventoryCodec {
    /// 새 코덱을 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl InventoryCodec for JsonInventoryCodec {
    fn format_name(&self) -> &str {
        "json"
    }

    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn read_inventory(&self, path: &Path) -> Result<Inventory, InventoryError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InventoryError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| InventoryError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write_inventory(&self, inventory: &Inventory, path: &Path) -> Result<(), InventoryError> {
        let content =
            serde_json::to_string_pretty(inventory).map_err(|e| InventoryError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        std::fs::write(path, content).map_err(|e| InventoryError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
