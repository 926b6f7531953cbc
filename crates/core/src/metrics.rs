//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `stocktake_`
//! - 모듈명: `scan_`, `merge_`, `relations_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 컨트리뷰터 레이블 키 (npm, cargo, rpm-ndb, maven, wheel)
pub const LABEL_CONTRIBUTOR: &str = "contributor";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Scan Engine 메트릭 ────────────────────────────────────────────

/// Scan: 방문한 파일 수 (counter)
pub const SCAN_FILES_SEEN_TOTAL: &str = "stocktake_scan_files_seen_total";

/// Scan: 생산된 아티팩트 수 (counter)
pub const SCAN_ARTIFACTS_TOTAL: &str = "stocktake_scan_artifacts_total";

/// Scan: 해제된 아카이브 수 (counter)
pub const SCAN_ARCHIVES_UNPACKED_TOTAL: &str = "stocktake_scan_archives_unpacked_total";

/// Scan: 아카이브 해제 실패 수 (counter)
pub const SCAN_UNPACK_FAILURES_TOTAL: &str = "stocktake_scan_unpack_failures_total";

/// Scan: 컨트리뷰터 매칭 수 (counter, label: contributor)
pub const SCAN_CONTRIBUTOR_MATCHES_TOTAL: &str = "stocktake_scan_contributor_matches_total";

/// Scan: 참조 인벤토리 매칭 수 (counter)
pub const SCAN_REFERENCE_HITS_TOTAL: &str = "stocktake_scan_reference_hits_total";

/// Scan: 스캔 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "stocktake_scan_duration_seconds";

// ─── Merge 메트릭 ──────────────────────────────────────────────────

/// Merge: 추가된 아티팩트 수 (counter)
pub const MERGE_ARTIFACTS_APPENDED_TOTAL: &str = "stocktake_merge_artifacts_appended_total";

/// Merge: 표현 중복으로 제거된 아티팩트 수 (counter)
pub const MERGE_DUPLICATES_DROPPED_TOTAL: &str = "stocktake_merge_duplicates_dropped_total";

/// Merge: 보충된 체크섬 수 (counter)
pub const MERGE_CHECKSUMS_BACKFILLED_TOTAL: &str = "stocktake_merge_checksums_backfilled_total";

// ─── Relation Graph 메트릭 ─────────────────────────────────────────

/// Relations: 생성된 관계 수 (counter)
pub const RELATIONS_BUILT_TOTAL: &str = "stocktake_relations_built_total";

/// Relations: finalize에서 병합된 관계 수 (counter)
pub const RELATIONS_MERGED_TOTAL: &str = "stocktake_relations_merged_total";

/// Relations: 미해결로 버려진 마커 수 (counter)
pub const RELATIONS_UNRESOLVED_DROPPED_TOTAL: &str =
    "stocktake_relations_unresolved_dropped_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔 소요 시간 히스토그램 버킷 (초)
///
/// 100ms ~ 300s 범위 (스캔은 디스크 I/O와 아카이브 해제를 포함)
pub const SCAN_DURATION_BUCKETS: [f64; 9] = [0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        SCAN_FILES_SEEN_TOTAL,
        "Total number of files visited by the scan walker"
    );
    describe_counter!(
        SCAN_ARTIFACTS_TOTAL,
        "Total number of artifacts produced by scans"
    );
    describe_counter!(
        SCAN_ARCHIVES_UNPACKED_TOTAL,
        "Total number of nested archives unpacked into scratch space"
    );
    describe_counter!(
        SCAN_UNPACK_FAILURES_TOTAL,
        "Total number of archive unpack failures degraded to artifact errors"
    );
    describe_counter!(
        SCAN_CONTRIBUTOR_MATCHES_TOTAL,
        "Component pattern contributions per contributor"
    );
    describe_counter!(
        SCAN_REFERENCE_HITS_TOTAL,
        "Artifacts matched against the reference inventory"
    );
    describe_histogram!(SCAN_DURATION_SECONDS, "Scan duration in seconds");

    describe_counter!(
        MERGE_ARTIFACTS_APPENDED_TOTAL,
        "Source artifacts appended into the merge target"
    );
    describe_counter!(
        MERGE_DUPLICATES_DROPPED_TOTAL,
        "Artifacts dropped by representation deduplication"
    );
    describe_counter!(
        MERGE_CHECKSUMS_BACKFILLED_TOTAL,
        "Blank target checksums backfilled from sources"
    );

    describe_counter!(
        RELATIONS_BUILT_TOTAL,
        "Relationships derived from inventory markers"
    );
    describe_counter!(
        RELATIONS_MERGED_TOTAL,
        "Relationships merged during finalization"
    );
    describe_counter!(
        RELATIONS_UNRESOLVED_DROPPED_TOTAL,
        "Markers dropped because the related asset id is unknown"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_use_prefix() {
        for name in [
            SCAN_FILES_SEEN_TOTAL,
            SCAN_ARTIFACTS_TOTAL,
            MERGE_DUPLICATES_DROPPED_TOTAL,
            RELATIONS_BUILT_TOTAL,
        ] {
            assert!(name.starts_with("stocktake_"));
        }
    }

    #[test]
    fn describe_all_does_not_panic_without_recorder() {
        describe_all();
    }

    #[test]
    fn scan_buckets_are_sorted() {
        let mut sorted = SCAN_DURATION_BUCKETS;
        sorted.sort_by(f64::total_cmp);
        assert_eq!(sorted, SCAN_DURATION_BUCKETS);
    }
}
