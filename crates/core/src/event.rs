//! 이벤트 시스템 — 모듈 간 통신의 기본 단위
//!
//! 스캔 워커와 수집기, 스캔 엔진과 하위 소비자(CLI 등)의 통신은
//! 이벤트 기반 메시지 패싱으로 수행됩니다. [`EventMetadata`]는 모든
//! 이벤트에 공통으로 포함되는 추적 정보이며, [`Event`] trait은 모든
//! 이벤트 타입이 구현해야 하는 인터페이스입니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::types::Artifact;

// --- 모듈명 상수 ---

/// 스캔 엔진 모듈명
pub const MODULE_SCAN_ENGINE: &str = "scan-engine";
/// 병합/정규화 모듈명
pub const MODULE_RECONCILE: &str = "reconcile";
/// 관계 그래프 모듈명
pub const MODULE_RELATION_GRAPH: &str = "relation-graph";

// --- 이벤트 타입 상수 ---

/// 아티팩트 발견 이벤트 타입
pub const EVENT_TYPE_ARTIFACT: &str = "artifact";
/// 스캔 완료 이벤트 타입
pub const EVENT_TYPE_SCAN: &str = "scan";

/// 이벤트 메타데이터 — 모든 이벤트에 공통으로 포함되는 추적 정보
///
/// 발생 시각, 생성 모듈, 추적 ID를 담아 이벤트 흐름을 추적합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명 (예: "scan-engine")
    pub source_module: String,
    /// 추적 ID — 같은 흐름의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source={} trace={}",
            unix_timestamp_str(self.timestamp),
            self.source_module,
            self.trace_id,
        )
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
///
/// `Send + Sync + 'static` 바운드로 `tokio::mpsc` 채널을 통한
/// 안전한 전송을 보장합니다.
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터 (timestamp, source_module, trace_id)
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅 및 라우팅에 사용)
    fn event_type(&self) -> &str;
}

/// 스캔 중 아티팩트가 발견되었을 때 생성되는 이벤트
///
/// 워커가 발견한 아티팩트를 수집기로 전달할 때 사용합니다.
#[derive(Debug, Clone)]
pub struct ArtifactEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 발견된 아티팩트
    pub artifact: Artifact,
}

impl ArtifactEvent {
    /// 새로운 trace를 시작하는 아티팩트 이벤트를 생성합니다.
    pub fn new(artifact: Artifact) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_SCAN_ENGINE),
            artifact,
        }
    }

    /// 기존 trace에 연결된 아티팩트 이벤트를 생성합니다.
    pub fn with_trace(artifact: Artifact, trace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_SCAN_ENGINE, trace_id),
            artifact,
        }
    }
}

impl Event for ArtifactEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_ARTIFACT
    }
}

impl fmt::Display for ArtifactEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ArtifactEvent[{}] artifact={}",
            &self.id[..8.min(self.id.len())],
            self.artifact,
        )
    }
}

/// 스캔 완료 이벤트
///
/// 한 번의 스캔이 끝났을 때 하위 소비자에게 전달됩니다.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 스캔 루트 경로
    pub root: String,
    /// 생산된 아티팩트 수
    pub artifact_count: usize,
    /// 탐지된 컴포넌트 패턴 수
    pub pattern_count: usize,
    /// `Errors` 속성으로 강등된 오류 수
    pub error_count: usize,
}

impl ScanEvent {
    /// 새로운 trace를 시작하는 스캔 완료 이벤트를 생성합니다.
    pub fn new(
        root: impl Into<String>,
        artifact_count: usize,
        pattern_count: usize,
        error_count: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_SCAN_ENGINE),
            root: root.into(),
            artifact_count,
            pattern_count,
            error_count,
        }
    }
}

impl Event for ScanEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_SCAN
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanEvent[{}] root={} artifacts={} patterns={} errors={}",
            &self.id[..8.min(self.id.len())],
            self.root,
            self.artifact_count,
            self.pattern_count,
            self.error_count,
        )
    }
}

/// SystemTime을 사람이 읽을 수 있는 형태로 변환합니다.
fn unix_timestamp_str(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => {
            let secs = duration.as_secs();
            format!("{secs}")
        }
        Err(_) => "unknown".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_metadata_new_preserves_trace_id() {
        let meta = EventMetadata::new("test-module", "trace-abc-123");
        assert_eq!(meta.source_module, "test-module");
        assert_eq!(meta.trace_id, "trace-abc-123");
        assert!(meta.timestamp <= SystemTime::now());
    }

    #[test]
    fn event_metadata_with_new_trace_generates_uuid() {
        let meta = EventMetadata::with_new_trace("test-module");
        // UUID v4 형식 확인: 8-4-4-4-12
        assert_eq!(meta.trace_id.len(), 36);
        assert_eq!(meta.trace_id.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn artifact_event_implements_event_trait() {
        let event = ArtifactEvent::new(Artifact::with_id("zlib-1.3.1"));
        assert_eq!(event.event_type(), "artifact");
        assert!(!event.event_id().is_empty());
        assert_eq!(event.metadata().source_module, "scan-engine");
    }

    #[test]
    fn artifact_event_with_trace_preserves_trace_id() {
        let event = ArtifactEvent::with_trace(Artifact::with_id("a"), "my-trace-id");
        assert_eq!(event.metadata().trace_id, "my-trace-id");
    }

    #[test]
    fn scan_event_display() {
        let event = ScanEvent::new("/srv/app", 42, 3, 1);
        let display = event.to_string();
        assert!(display.contains("/srv/app"));
        assert!(display.contains("artifacts=42"));
        assert!(display.contains("errors=1"));
    }

    #[test]
    fn events_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ArtifactEvent>();
        assert_send_sync::<ScanEvent>();
    }
}
