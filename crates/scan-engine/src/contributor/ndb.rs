//! RPM NDB 패키지 카탈로그 — 바이너리 파싱과 생산자/소비자 스트림
//!
//! `Packages.db`(NDB) 레이아웃:
//!
//! ```text
//! +--------------------------------------------------+
//! | header (32B): magic "RpmP", version u32 LE,      |
//! |   generation u32 LE, slot page count u32 LE,     |
//! |   reserved 16B                                   |
//! +--------------------------------------------------+
//! | slot table: pages * 256 entries * 16B            |
//! |   entry: magic "Slot", pkg index u32 LE,         |
//! |     blob offset u32 LE (16B 블록 단위),           |
//! |     blob block count u32 LE                      |
//! |   pkg index 0 = free slot                        |
//! +--------------------------------------------------+
//! | blobs: header (16B): magic "BlbS", pkg index,    |
//! |   generation, payload length / payload /          |
//! |   u32 LE additive checksum, 16B 블록 패딩         |
//! +--------------------------------------------------+
//! ```
//!
//! 블롭 페이로드는 rpm 헤더 블롭입니다: u32 BE 인덱스 엔트리 수,
//! u32 BE 데이터 길이, 16B 인덱스 엔트리(tag/type/offset/count),
//! 데이터 섹션. STRING 태그 1000/1001/1002/1022에서 이름/버전/릴리스/
//! 아키텍처를 읽습니다.
//!
//! # 스트림 규약
//!
//! 백그라운드 스레드가 레코드를 파싱해 bounded 큐로 보냅니다. 파싱
//! 에러는 큐 엔트리([`CatalogEntry::Corrupt`])로 전달되며 경계를 넘는
//! 예외는 없습니다. 스트림 끝은 단일 [`CatalogEntry::End`] 센티널
//! 하나로 표시됩니다. 소비자가 수신측을 드롭하면 송신이 실패하고
//! 생산자는 즉시 종료합니다 — 워커 누수가 없습니다.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::debug;

/// NDB 파일 헤더 매직
pub const NDB_HEADER_MAGIC: [u8; 4] = *b"RpmP";
/// 슬롯 엔트리 매직
pub const NDB_SLOT_MAGIC: [u8; 4] = *b"Slot";
/// 블롭 헤더 매직
pub const NDB_BLOB_MAGIC: [u8; 4] = *b"BlbS";

/// 헤더 크기 (바이트)
pub const NDB_HEADER_SIZE: usize = 32;
/// 슬롯 엔트리 크기 (바이트)
pub const NDB_SLOT_SIZE: usize = 16;
/// 페이지당 슬롯 엔트리 수
pub const NDB_SLOT_ENTRIES_PER_PAGE: usize = 256;
/// 블롭 오프셋/길이의 블록 단위 (바이트)
pub const NDB_BLOCK_SIZE: usize = 16;

/// rpm 헤더 태그: 패키지 이름
const TAG_NAME: u32 = 1000;
/// rpm 헤더 태그: 버전
const TAG_VERSION: u32 = 1001;
/// rpm 헤더 태그: 릴리스
const TAG_RELEASE: u32 = 1002;
/// rpm 헤더 태그: 아키텍처
const TAG_ARCH: u32 = 1022;
/// rpm 헤더 타입: NUL 종료 문자열
const TYPE_STRING: u32 = 6;

/// 카탈로그에서 읽은 설치 패키지 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmPackageInfo {
    /// 카탈로그 내 패키지 인덱스
    pub pkg_index: u32,
    /// 패키지 이름
    pub name: String,
    /// 버전
    pub version: String,
    /// 릴리스 (있을 경우)
    pub release: Option<String>,
    /// 아키텍처 (있을 경우)
    pub arch: Option<String>,
}

/// 카탈로그 스트림의 큐 엔트리
///
/// 에러는 값으로 전달됩니다. 치명 여부는 소비자가 결정합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    /// 유효한 패키지 레코드
    Package(RpmPackageInfo),
    /// 파싱 불가 슬롯/블롭 (slot 0 = 헤더 자체의 문제)
    Corrupt {
        /// 문제가 난 슬롯 번호
        slot: usize,
        /// 사유
        reason: String,
    },
    /// 스트림 끝 센티널 — 이후 엔트리는 오지 않음
    End,
}

/// 파싱된 NDB 헤더
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdbHeader {
    /// 형식 버전
    pub version: u32,
    /// 세대 카운터
    pub generation: u32,
    /// 슬롯 페이지 수
    pub slot_pages: u32,
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(buf)
}

/// NDB 헤더를 파싱합니다.
pub fn parse_header(bytes: &[u8]) -> Result<NdbHeader, String> {
    if bytes.len() < NDB_HEADER_SIZE {
        return Err(format!(
            "file too short for header: {} bytes (need {NDB_HEADER_SIZE})",
            bytes.len()
        ));
    }
    if bytes[..4] != NDB_HEADER_MAGIC {
        return Err("bad header magic".to_owned());
    }
    Ok(NdbHeader {
        version: read_u32_le(bytes, 4),
        generation: read_u32_le(bytes, 8),
        slot_pages: read_u32_le(bytes, 12),
    })
}

/// 슬롯 엔트리
#[derive(Debug, Clone, Copy)]
struct SlotEntry {
    pkg_index: u32,
    blk_offset: u32,
    blk_cnt: u32,
}

/// 슬롯 엔트리를 파싱합니다. 빈 슬롯(pkg index 0)은 `None`.
fn parse_slot(bytes: &[u8]) -> Result<Option<SlotEntry>, String> {
    if bytes[..4] != NDB_SLOT_MAGIC {
        return Err("bad slot magic".to_owned());
    }
    let pkg_index = read_u32_le(bytes, 4);
    if pkg_index == 0 {
        return Ok(None);
    }
    Ok(Some(SlotEntry {
        pkg_index,
        blk_offset: read_u32_le(bytes, 8),
        blk_cnt: read_u32_le(bytes, 12),
    }))
}

/// 블롭을 파싱하여 패키지 레코드를 만듭니다.
fn parse_blob(bytes: &[u8], slot: SlotEntry) -> Result<RpmPackageInfo, String> {
    let offset = slot.blk_offset as usize * NDB_BLOCK_SIZE;
    let header_end = offset
        .checked_add(NDB_BLOCK_SIZE)
        .ok_or_else(|| "blob offset overflow".to_owned())?;
    if header_end > bytes.len() {
        return Err(format!("blob offset {offset} beyond file end"));
    }

    let blob = &bytes[offset..];
    if blob[..4] != NDB_BLOB_MAGIC {
        return Err("bad blob magic".to_owned());
    }
    let pkg_index = read_u32_le(blob, 4);
    if pkg_index != slot.pkg_index {
        return Err(format!(
            "blob package index {pkg_index} does not match slot {}",
            slot.pkg_index
        ));
    }
    let len = read_u32_le(blob, 12) as usize;

    let payload_end = NDB_BLOCK_SIZE + len;
    let total = payload_end + 4;
    if offset + total > bytes.len() {
        return Err(format!("blob payload length {len} beyond file end"));
    }
    let expected_blocks = total.div_ceil(NDB_BLOCK_SIZE) as u32;
    if expected_blocks != slot.blk_cnt {
        return Err(format!(
            "blob block count mismatch: slot says {}, blob needs {expected_blocks}",
            slot.blk_cnt
        ));
    }

    let payload = &blob[NDB_BLOCK_SIZE..payload_end];
    let stored_checksum = read_u32_le(blob, payload_end);
    let actual_checksum = additive_checksum(payload);
    if stored_checksum != actual_checksum {
        return Err(format!(
            "blob checksum mismatch: stored {stored_checksum:#010x}, actual {actual_checksum:#010x}"
        ));
    }

    let (name, version, release, arch) = parse_rpm_header(payload)?;
    Ok(RpmPackageInfo {
        pkg_index,
        name,
        version,
        release,
        arch,
    })
}

/// 페이로드 바이트의 가산 체크섬
pub fn additive_checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(*b)))
}

/// rpm 헤더 블롭에서 이름/버전/릴리스/아키텍처를 추출합니다.
fn parse_rpm_header(
    payload: &[u8],
) -> Result<(String, String, Option<String>, Option<String>), String> {
    if payload.len() < 8 {
        return Err("rpm header too short".to_owned());
    }
    let index_count = read_u32_be(payload, 0) as usize;
    let data_len = read_u32_be(payload, 4) as usize;

    let index_end = 8 + index_count * 16;
    if index_end + data_len > payload.len() {
        return Err(format!(
            "rpm header sections exceed payload: {index_count} entries, {data_len} data bytes"
        ));
    }
    let data = &payload[index_end..index_end + data_len];

    let mut name = None;
    let mut version = None;
    let mut release = None;
    let mut arch = None;

    for i in 0..index_count {
        let entry = &payload[8 + i * 16..8 + (i + 1) * 16];
        let tag = read_u32_be(entry, 0);
        let tag_type = read_u32_be(entry, 4);
        let data_offset = read_u32_be(entry, 8) as usize;

        if tag_type != TYPE_STRING {
            continue;
        }
        let value = read_nul_string(data, data_offset)
            .ok_or_else(|| format!("string tag {tag} offset {data_offset} out of bounds"))?;

        match tag {
            TAG_NAME => name = Some(value),
            TAG_VERSION => version = Some(value),
            TAG_RELEASE => release = Some(value),
            TAG_ARCH => arch = Some(value),
            _ => {}
        }
    }

    match (name, version) {
        (Some(name), Some(version)) => Ok((name, version, release, arch)),
        _ => Err("rpm header missing name or version tag".to_owned()),
    }
}

fn read_nul_string(data: &[u8], offset: usize) -> Option<String> {
    if offset >= data.len() {
        return None;
    }
    let rest = &data[offset..];
    let end = rest.iter().position(|b| *b == 0)?;
    Some(String::from_utf8_lossy(&rest[..end]).into_owned())
}

/// 파일 바이트에서 카탈로그 엔트리를 순서대로 방출합니다.
///
/// `send`가 `false`를 반환하면 (소비자 취소) 즉시 중단합니다.
/// 마지막 [`CatalogEntry::End`] 센티널도 이 함수가 방출합니다.
fn emit_entries(bytes: &[u8], send: &mut dyn FnMut(CatalogEntry) -> bool) {
    let header = match parse_header(bytes) {
        Ok(header) => header,
        Err(reason) => {
            if send(CatalogEntry::Corrupt { slot: 0, reason }) {
                send(CatalogEntry::End);
            }
            return;
        }
    };

    let slot_count = header.slot_pages as usize * NDB_SLOT_ENTRIES_PER_PAGE;
    for slot_idx in 0..slot_count {
        let start = NDB_HEADER_SIZE + slot_idx * NDB_SLOT_SIZE;
        let end = start + NDB_SLOT_SIZE;
        if end > bytes.len() {
            if !send(CatalogEntry::Corrupt {
                slot: slot_idx,
                reason: "slot table truncated".to_owned(),
            }) {
                return;
            }
            break;
        }

        let entry = match parse_slot(&bytes[start..end]) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(reason) => {
                if !send(CatalogEntry::Corrupt {
                    slot: slot_idx,
                    reason,
                }) {
                    return;
                }
                continue;
            }
        };

        let entry = match parse_blob(bytes, entry) {
            Ok(package) => CatalogEntry::Package(package),
            Err(reason) => CatalogEntry::Corrupt {
                slot: slot_idx,
                reason,
            },
        };
        if !send(entry) {
            return;
        }
    }

    send(CatalogEntry::End);
}

/// 파일 바이트에서 전체 카탈로그 엔트리를 수집합니다 (센티널 포함).
///
/// 스트림이 필요 없는 호출자(퍼징, 일괄 검증)용 편의 함수입니다.
pub fn catalog_entries(bytes: &[u8]) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    emit_entries(bytes, &mut |entry| {
        entries.push(entry);
        true
    });
    entries
}

/// 생산자 루프 — 전용 스레드에서 실행됩니다.
///
/// 송신 실패(수신측 드롭)는 취소 신호이며 즉시 반환합니다.
pub(crate) fn producer_loop(bytes: Vec<u8>, tx: mpsc::Sender<CatalogEntry>) {
    emit_entries(&bytes, &mut |entry| tx.blocking_send(entry).is_ok());
}

/// NDB 카탈로그를 bounded 큐로 스트리밍합니다.
///
/// 백그라운드 스레드가 레코드를 파싱해 큐로 보냅니다. 소비자는 각
/// 엔트리의 내장 에러를 확인하고 [`CatalogEntry::End`] 이후에는 읽기를
/// 멈춰야 합니다. 수신측을 드롭하면 생산자는 다음 송신에서 종료합니다.
///
/// 파일 읽기 실패도 큐 엔트리로 전달됩니다 (slot 0의 `Corrupt`).
pub fn stream_catalog(path: &Path, capacity: usize) -> mpsc::Receiver<CatalogEntry> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let path = path.to_path_buf();

    std::thread::spawn(move || {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "failed to read ndb catalog");
                if tx
                    .blocking_send(CatalogEntry::Corrupt {
                        slot: 0,
                        reason: format!("read failed: {e}"),
                    })
                    .is_ok()
                {
                    let _ = tx.blocking_send(CatalogEntry::End);
                }
                return;
            }
        };
        producer_loop(bytes, tx);
    });

    rx
}

// --- 테스트 픽스처 빌더 ---


#[cfg(test)]
mod tests {
    use super::*;

    fn drain(bytes: &[u8]) -> Vec<CatalogEntry> {
        let mut out = Vec::new();
        emit_entries(bytes, &mut |entry| {
            out.push(entry);
            true
        });
        out
    }

    #[test]
    fn valid_catalog_yields_packages_then_sentinel() {
        let bytes = fixture::build_ndb(
            &[(1, "bash", "5.2.21"), (2, "zlib", "1.3.1"), (3, "openssl", "3.1.4")],
            &[],
        );
        let entries = drain(&bytes);

        assert_eq!(entries.len(), 4);
        match &entries[0] {
            CatalogEntry::Package(pkg) => {
                assert_eq!(pkg.name, "bash");
                assert_eq!(pkg.version, "5.2.21");
                assert_eq!(pkg.release.as_deref(), Some("1"));
                assert_eq!(pkg.arch.as_deref(), Some("x86_64"));
            }
            other => panic!("expected package, got {other:?}"),
        }
        assert_eq!(entries[3], CatalogEntry::End);
    }

    #[test]
    fn checksum_mismatch_is_error_as_value() {
        let bytes = fixture::build_ndb(&[(1, "bash", "5.2"), (2, "zlib", "1.3")], &[2]);
        let entries = drain(&bytes);

        // 유효 레코드 수 + 내장 에러 + 센티널
        let packages = entries
            .iter()
            .filter(|e| matches!(e, CatalogEntry::Package(_)))
            .count();
        let corrupt = entries
            .iter()
            .filter(|e| matches!(e, CatalogEntry::Corrupt { .. }))
            .count();
        assert_eq!(packages, 1);
        assert_eq!(corrupt, 1);
        assert_eq!(entries.last(), Some(&CatalogEntry::End));
    }

    #[test]
    fn bad_header_magic_is_single_corrupt_entry() {
        let mut bytes = fixture::build_ndb(&[(1, "bash", "5.2")], &[]);
        bytes[0] = b'X';
        let entries = drain(&bytes);
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], CatalogEntry::Corrupt { slot: 0, .. }));
        assert_eq!(entries[1], CatalogEntry::End);
    }

    #[test]
    fn truncated_file_is_corrupt() {
        let entries = drain(&[0u8; 8]);
        assert!(matches!(entries[0], CatalogEntry::Corrupt { .. }));
    }

    #[test]
    fn blob_offset_beyond_file_is_corrupt() {
        let mut bytes = fixture::build_ndb(&[(1, "bash", "5.2")], &[]);
        // 슬롯의 blob offset을 파일 밖으로 조작
        let slot_start = NDB_HEADER_SIZE;
        bytes[slot_start + 8..slot_start + 12].copy_from_slice(&0xFFFF_FFu32.to_le_bytes());
        let entries = drain(&bytes);
        assert!(matches!(entries[0], CatalogEntry::Corrupt { slot: 0, .. }));
        assert_eq!(entries.last(), Some(&CatalogEntry::End));
    }

    #[test]
    fn free_slots_are_skipped_silently() {
        let bytes = fixture::build_ndb(&[], &[]);
        let entries = drain(&bytes);
        assert_eq!(entries, vec![CatalogEntry::End]);
    }

    #[tokio::test]
    async fn stream_reads_until_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Packages.db");
        std::fs::write(
            &path,
            fixture::build_ndb(&[(1, "bash", "5.2"), (2, "zlib", "1.3")], &[]),
        )
        .unwrap();

        let mut rx = stream_catalog(&path, 4);
        let mut packages = 0;
        while let Some(entry) = rx.recv().await {
            match entry {
                CatalogEntry::Package(_) => packages += 1,
                CatalogEntry::Corrupt { .. } => panic!("unexpected corrupt entry"),
                CatalogEntry::End => break,
            }
        }
        assert_eq!(packages, 2);
    }

    #[tokio::test]
    async fn stream_missing_file_delivers_error_as_value() {
        let mut rx = stream_catalog(Path::new("/nonexistent/Packages.db"), 2);
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, CatalogEntry::Corrupt { slot: 0, .. }));
        let second = rx.recv().await.unwrap();
        assert_eq!(second, CatalogEntry::End);
    }

    #[test]
    fn early_cancellation_does_not_deadlock_producer() {
        // 용량 1 큐에 많은 패키지: 수신측 드롭 후 생산자는 즉시 종료해야 함
        let packages: Vec<(u32, String)> = (1..=64).map(|i| (i, format!("pkg{i}"))).collect();
        let package_refs: Vec<(u32, &str, &str)> = packages
            .iter()
            .map(|(i, name)| (*i, name.as_str(), "1.0"))
            .collect();
        let bytes = fixture::build_ndb(&package_refs, &[]);

        let (tx, mut rx) = mpsc::channel(1);
        let producer = std::thread::spawn(move || producer_loop(bytes, tx));

        // 하나만 읽고 취소
        let first = rx.blocking_recv().unwrap();
        assert!(matches!(first, CatalogEntry::Package(_)));
        drop(rx);

        // 생산자는 블로킹 없이 종료 (join이 멈추면 테스트가 타임아웃)
        producer.join().unwrap();
    }

    #[test]
    fn rpm_header_missing_name_is_error() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(&0u32.to_be_bytes());
        assert!(parse_rpm_header(&payload).is_err());
    }

    #[test]
    fn additive_checksum_wraps() {
        assert_eq!(additive_checksum(&[]), 0);
        assert_eq!(additive_checksum(&[1, 2, 3]), 6);
    }
}
