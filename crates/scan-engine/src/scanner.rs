//! 스캔 엔진 오케스트레이터 — 전체 스캔 흐름 관리
//!
//! # 내부 아키텍처
//!
//! ```text
//! root_dir --> subtree jobs (bounded workers, spawn_blocking)
//!                  |                         |
//!            Contributors              raw files/archives
//!                  |                         |
//!                  +------ mpsc ------> Collector (checksum-keyed dedup)
//!                                            |
//!                                     scan Inventory
//!                                            |
//!                              ScanEvent --> downstream
//! ```
//!
//! 워커는 형제 서브트리를 병렬로 스캔하고, 작업 인벤토리는 수집기
//! 태스크 하나가 소유합니다 — 동기화 지점은 mpsc 채널과 스크래치
//! 할당기뿐입니다.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use stocktake_core::attrs::{ATTR_ARCHIVE_PATH, ATTR_TYPE};
use stocktake_core::codec::{InventoryCodec, JsonInventoryCodec};
use stocktake_core::event::{ArtifactEvent, ScanEvent};
use stocktake_core::inventory::Inventory;
use stocktake_core::metrics as m;
use stocktake_core::types::{Artifact, ComponentPatternData};

use crate::config::{ScanEngineConfig, Selectors};
use crate::contributor::{Contributor, default_contributors};
use crate::error::ScanEngineError;
use crate::reference::ReferenceInventory;
use crate::resolve::{PathResolver, SymlinkTable};
use crate::unpack::{ArchiveUnpacker, NoArchiveSupport, ScratchAllocator, has_archive_signature};

/// 수집기 채널 용량
const COLLECTOR_CHANNEL_CAPACITY: usize = 1024;

/// 수집기로 보내는 메시지
enum CollectorMsg {
    /// 발견된 아티팩트
    Artifact(ArtifactEvent),
    /// 등록할 컴포넌트 패턴
    Pattern(ComponentPatternData),
}

/// 스캔 엔진
///
/// 트리 탐색, 아카이브 해제, 컨트리뷰터 호출, 참조 매칭을 조율하여
/// 스캔 인벤토리를 생산합니다.
pub struct ScanEngine {
    config: ScanEngineConfig,
    resolver: Arc<PathResolver>,
    reference: Option<Arc<ReferenceInventory>>,
    codec: Arc<dyn InventoryCodec>,
    unpacker: Arc<dyn ArchiveUnpacker>,
    contributors: Arc<Vec<Box<dyn Contributor>>>,
    event_tx: mpsc::Sender<ScanEvent>,
    scans_completed: Arc<AtomicU64>,
}

impl ScanEngine {
    /// 완료된 스캔 수를 반환합니다.
    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }

    /// 단일 스캔을 수행하여 스캔 인벤토리를 반환합니다.
    ///
    /// # Errors
    ///
    /// 참조 인벤토리 로딩 실패는 치명적입니다. 개별 파일/아카이브의
    /// 문제는 해당 아티팩트의 `Errors` 속성으로 강등됩니다.
    pub async fn scan_once(&self) -> Result<Inventory, ScanEngineError> {
        let started = Instant::now();
        let root = PathBuf::from(&self.config.root_dir);
        if !root.is_dir() {
            return Err(ScanEngineError::Io {
                path: root.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "scan root is not a directory",
                ),
            });
        }

        // 참조 인벤토리: 명시 주입 > 디렉토리 로드 > 없음
        let reference = match &self.reference {
            Some(reference) => Arc::clone(reference),
            None if !self.config.reference_dir.trim().is_empty() => {
                let dir = PathBuf::from(&self.config.reference_dir);
                let codec = Arc::clone(&self.codec);
                let loaded = tokio::task::spawn_blocking(move || {
                    ReferenceInventory::load_from_dir(&dir, codec.as_ref())
                })
                .await
                .map_err(|e| ScanEngineError::Channel(format!("spawn_blocking failed: {e}")))??;
                Arc::new(loaded)
            }
            None => Arc::new(ReferenceInventory::empty()),
        };

        let selectors = self.config.compile_selectors()?;
        let allocator = Arc::new(ScratchAllocator::new(&self.config.scratch_dir)?);

        let (tx, rx) = mpsc::channel::<CollectorMsg>(COLLECTOR_CHANNEL_CAPACITY);
        let collector = tokio::spawn(run_collector(rx));

        let project = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.root_dir.clone());

        let ctx = Arc::new(ScanContext {
            config: self.config.clone(),
            selectors,
            unpacker: Arc::clone(&self.unpacker),
            contributors: Arc::clone(&self.contributors),
            allocator,
            resolver: Arc::clone(&self.resolver),
            reference,
            tx,
            project,
            visited_dirs: Mutex::new(HashSet::new()),
        });

        // 루트 직계를 작업 단위로 분할: 파일들은 하나의 얕은 작업,
        // 하위 디렉토리는 각각 재귀 작업
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut jobs = JoinSet::new();

        let subdirs = {
            let root = root.clone();
            tokio::task::spawn_blocking(move || list_subdirs(&root))
                .await
                .map_err(|e| ScanEngineError::Channel(format!("spawn_blocking failed: {e}")))?
        }?;

        {
            // 루트 자신(직계 파일 + 루트 디렉토리 컨트리뷰터)
            let ctx = Arc::clone(&ctx);
            let root = root.clone();
            let semaphore = Arc::clone(&semaphore);
            jobs.spawn(async move {
                if let Ok(_permit) = semaphore.acquire_owned().await {
                    let joined = tokio::task::spawn_blocking(move || {
                        scan_subtree(&ctx, &root, &root, "", 0, true)
                    })
                    .await;
                    if let Err(e) = joined {
                        warn!(error = %e, "root scan job failed");
                    }
                }
            });
        }

        for subdir in subdirs {
            let ctx = Arc::clone(&ctx);
            let root = root.clone();
            let semaphore = Arc::clone(&semaphore);
            jobs.spawn(async move {
                if let Ok(_permit) = semaphore.acquire_owned().await {
                    let joined = tokio::task::spawn_blocking(move || {
                        scan_subtree(&ctx, &root, &subdir, "", 0, false)
                    })
                    .await;
                    if let Err(e) = joined {
                        warn!(error = %e, "subtree scan job failed");
                    }
                }
            });
        }

        while let Some(joined) = jobs.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "scan job panicked or was cancelled");
            }
        }

        // 워커 송신측을 닫아 수집기를 종료시킴
        drop(ctx);

        let (inventory, stats) = collector
            .await
            .map_err(|e| ScanEngineError::Channel(format!("collector failed: {e}")))?;

        let mut inventory = inventory;
        inventory.info.set("Scan Root", self.config.root_dir.clone());

        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::SCAN_ARTIFACTS_TOTAL).increment(inventory.artifacts.len() as u64);
        metrics::histogram!(m::SCAN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        info!(
            root = %self.config.root_dir,
            artifacts = inventory.artifacts.len(),
            patterns = inventory.component_patterns.len(),
            errors = stats.error_count,
            "scan completed"
        );

        let event = ScanEvent::new(
            self.config.root_dir.clone(),
            inventory.artifacts.len(),
            inventory.component_patterns.len(),
            stats.error_count,
        );
        if let Err(e) = self.event_tx.try_send(event) {
            debug!(error = %e, "scan event not delivered (channel full or closed)");
        }

        Ok(inventory)
    }
}

/// 스캔 엔진 빌더
///
/// 엔진을 구성하고 필요한 채널을 생성합니다.
pub struct ScanEngineBuilder {
    config: ScanEngineConfig,
    symlink_table: SymlinkTable,
    reference: Option<ReferenceInventory>,
    codec: Option<Arc<dyn InventoryCodec>>,
    unpacker: Option<Arc<dyn ArchiveUnpacker>>,
    contributors: Option<Vec<Box<dyn Contributor>>>,
    event_tx: Option<mpsc::Sender<ScanEvent>>,
    event_channel_capacity: usize,
}

impl ScanEngineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ScanEngineConfig::default(),
            symlink_table: SymlinkTable::empty(),
            reference: None,
            codec: None,
            unpacker: None,
            contributors: None,
            event_tx: None,
            event_channel_capacity: 64,
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: ScanEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 심볼릭 링크 테이블을 설정합니다.
    ///
    /// 사전 파일시스템 검사 협력자가 생성한 테이블입니다.
    pub fn symlink_table(mut self, table: SymlinkTable) -> Self {
        self.symlink_table = table;
        self
    }

    /// 참조 인벤토리를 직접 주입합니다.
    ///
    /// 설정하지 않으면 `reference_dir`에서 로드합니다.
    pub fn reference(mut self, reference: ReferenceInventory) -> Self {
        self.reference = Some(reference);
        self
    }

    /// 인벤토리 문서 코덱을 설정합니다.
    pub fn codec(mut self, codec: Arc<dyn InventoryCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// 아카이브 해제 협력자를 설정합니다.
    pub fn unpacker(mut self, unpacker: Arc<dyn ArchiveUnpacker>) -> Self {
        self.unpacker = Some(unpacker);
        self
    }

    /// 컨트리뷰터 목록을 교체합니다.
    pub fn contributors(mut self, contributors: Vec<Box<dyn Contributor>>) -> Self {
        self.contributors = Some(contributors);
        self
    }

    /// 외부 이벤트 전송 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn event_sender(mut self, tx: mpsc::Sender<ScanEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// 이벤트 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// 엔진을 빌드합니다.
    ///
    /// # Returns
    ///
    /// - `ScanEngine`: 엔진 인스턴스
    /// - `Option<mpsc::Receiver<ScanEvent>>`: 이벤트 수신 채널
    ///   (외부 event_sender를 설정한 경우 None)
    pub fn build(
        self,
    ) -> Result<(ScanEngine, Option<mpsc::Receiver<ScanEvent>>), ScanEngineError> {
        self.config.validate()?;

        let (event_tx, event_rx) = if let Some(tx) = self.event_tx {
            (tx, None)
        } else {
            let (tx, rx) = mpsc::channel(self.event_channel_capacity);
            (tx, Some(rx))
        };

        let resolver = PathResolver::with_max_depth(self.symlink_table, self.config.max_resolve_depth);

        let engine = ScanEngine {
            config: self.config,
            resolver: Arc::new(resolver),
            reference: self.reference.map(Arc::new),
            codec: self
                .codec
                .unwrap_or_else(|| Arc::new(JsonInventoryCodec::new())),
            unpacker: self.unpacker.unwrap_or_else(|| Arc::new(NoArchiveSupport)),
            contributors: Arc::new(self.contributors.unwrap_or_else(default_contributors)),
            event_tx,
            scans_completed: Arc::new(AtomicU64::new(0)),
        };

        Ok((engine, event_rx))
    }
}

impl Default for ScanEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 워커가 공유하는 스캔 문맥
struct ScanContext {
    config: ScanEngineConfig,
    selectors: Selectors,
    unpacker: Arc<dyn ArchiveUnpacker>,
    contributors: Arc<Vec<Box<dyn Contributor>>>,
    allocator: Arc<ScratchAllocator>,
    resolver: Arc<PathResolver>,
    reference: Arc<ReferenceInventory>,
    tx: mpsc::Sender<CollectorMsg>,
    project: String,
    visited_dirs: Mutex<HashSet<String>>,
}

/// 수집기 통계
#[derive(Default)]
struct CollectorStats {
    error_count: usize,
}

/// 수집기 태스크 — 작업 인벤토리를 단독 소유합니다.
///
/// 동일 내용(체크섬)은 아티팩트 하나로 합치고 논리 위치만 누적합니다.
/// 체크섬 없는 논리 아티팩트(컨트리뷰터 산출)는 id로 합칩니다.
async fn run_collector(mut rx: mpsc::Receiver<CollectorMsg>) -> (Inventory, CollectorStats) {
    let mut inventory = Inventory::new();
    let mut by_checksum: HashMap<String, usize> = HashMap::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut stats = CollectorStats::default();

    while let Some(msg) = rx.recv().await {
        match msg {
            CollectorMsg::Artifact(event) => {
                let incoming = event.artifact;
                if !incoming.errors().is_empty() {
                    stats.error_count += incoming.errors().len();
                }

                let slot = match incoming.checksum() {
                    Some(checksum) => by_checksum.get(checksum).copied(),
                    None => incoming.id().and_then(|id| by_id.get(id).copied()),
                };

                match slot {
                    Some(idx) => merge_locations(&mut inventory.artifacts[idx], &incoming),
                    None => {
                        let idx = inventory.artifacts.len();
                        if let Some(checksum) = incoming.checksum() {
                            by_checksum.insert(checksum.to_owned(), idx);
                        } else if let Some(id) = incoming.id() {
                            by_id.insert(id.to_owned(), idx);
                        }
                        inventory.add_artifact(incoming);
                    }
                }
            }
            CollectorMsg::Pattern(pattern) => {
                inventory.add_component_pattern(pattern);
            }
        }
    }

    (inventory, stats)
}

/// 동일 식별의 재발견: 위치/프로젝트/오류만 누적합니다.
fn merge_locations(existing: &mut Artifact, incoming: &Artifact) {
    let root_paths: Vec<String> = incoming.root_paths().iter().map(|s| (*s).to_owned()).collect();
    for path in root_paths {
        existing.append_root_path(&path);
    }
    let projects: Vec<String> = incoming.projects().iter().map(|s| (*s).to_owned()).collect();
    for project in projects {
        existing.append_project(&project);
    }
    let errors: Vec<String> = incoming.errors().iter().map(|s| (*s).to_owned()).collect();
    for error in errors {
        existing.append_error(&error);
    }
}

fn list_subdirs(root: &Path) -> Result<Vec<PathBuf>, ScanEngineError> {
    let entries = std::fs::read_dir(root).map_err(|e| ScanEngineError::Io {
        path: root.display().to_string(),
        source: e,
    })?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && !path.is_symlink())
        .collect())
}

/// 서브트리 하나를 스캔합니다 (blocking).
///
/// `base`는 선택 글롭의 기준 디렉토리(스캔 루트 또는 해제 디렉토리),
/// `dir`는 실제 탐색 시작점입니다. `shallow`가 참이면 직계만 봅니다.
fn scan_subtree(
    ctx: &Arc<ScanContext>,
    base: &Path,
    dir: &Path,
    logical_prefix: &str,
    unpack_depth: usize,
    shallow: bool,
) {
    // 심볼릭 링크 테이블 기준 정규화: 순환/이탈 구조는 건너뜀
    if let Some(canonical) = canonicalize_dir(ctx, dir) {
        let mut visited = ctx.visited_dirs.lock().unwrap_or_else(|e| e.into_inner());
        if !visited.insert(canonical) {
            debug!(dir = %dir.display(), "directory already scanned via another location, skipping");
            return;
        }
    } else {
        return;
    }

    let mut covered: HashSet<PathBuf> = HashSet::new();

    let mut walker = WalkDir::new(dir).follow_links(false);
    if shallow {
        walker = walker.max_depth(1);
    }

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();

        if entry.file_type().is_dir() {
            // 얕은 작업에서 하위 디렉토리는 별도의 서브트리 작업이 담당
            if shallow && entry.depth() > 0 {
                continue;
            }
            if ctx.config.detect_component_patterns {
                run_contributors(ctx, base, path, logical_prefix, &mut covered);
            }
            continue;
        }
        if !entry.file_type().is_file() {
            debug!(path = %path.display(), "skipping non-regular file");
            continue;
        }
        if covered.contains(path) {
            continue;
        }

        let Some(rel) = relative_str(base, path) else {
            continue;
        };
        if !ctx.selectors.select.is_selected(&rel) {
            continue;
        }

        metrics::counter!(m::SCAN_FILES_SEEN_TOTAL).increment(1);
        let logical = join_logical(logical_prefix, &rel);

        let unpackable = ctx.config.implicit_unpack
            && unpack_depth < ctx.config.max_unpack_depth
            && ctx.selectors.unpack.is_selected(&rel)
            && has_archive_signature(path)
            && ctx.unpacker.can_unpack(path);

        if unpackable {
            let mut artifact = file_artifact(ctx, path, &logical, unpack_depth);
            artifact.attributes.set(ATTR_TYPE, "archive");

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "archive".to_owned());

            match unpack_into_scratch(ctx, path, &name) {
                Ok(dest) => {
                    metrics::counter!(m::SCAN_ARCHIVES_UNPACKED_TOTAL).increment(1);
                    let inner_prefix = embedded_prefix(logical_prefix, &rel, &name);
                    scan_subtree(ctx, &dest, &dest, &inner_prefix, unpack_depth + 1, false);
                }
                Err(e) => {
                    metrics::counter!(m::SCAN_UNPACK_FAILURES_TOTAL).increment(1);
                    warn!(path = %path.display(), error = %e, "archive unpack failed, continuing");
                    artifact.append_error(&format!("unpack failed: {e}"));
                }
            }

            send_artifact(ctx, artifact);
            continue;
        }

        // 내장 원시 파일은 include_embedded가 꺼져 있으면 나열 생략
        if unpack_depth > 0 && !ctx.config.include_embedded {
            continue;
        }

        let artifact = file_artifact(ctx, path, &logical, unpack_depth);
        send_artifact(ctx, artifact);
    }
}

/// 디렉토리를 심볼릭 링크 테이블 기준으로 정규화합니다.
///
/// 순환/루트 이탈 구조는 `None` — 예상되는 입력이므로 경고만 남깁니다.
fn canonicalize_dir(ctx: &ScanContext, dir: &Path) -> Option<String> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(dir)
    };
    let text = absolute.to_string_lossy();

    match ctx.resolver.resolve(&text) {
        Ok(resolution) if resolution.is_done() => Some(resolution.path),
        Ok(resolution) => {
            warn!(
                dir = %text,
                status = %resolution.status,
                "directory skipped by path resolution"
            );
            None
        }
        Err(e) => {
            warn!(dir = %text, error = %e, "path resolution rejected directory");
            None
        }
    }
}

/// 디렉토리에서 컨트리뷰터를 실행하고 기여를 수집기로 보냅니다.
fn run_contributors(
    ctx: &Arc<ScanContext>,
    base: &Path,
    dir: &Path,
    logical_prefix: &str,
    covered: &mut HashSet<PathBuf>,
) {
    for contributor in ctx.contributors.iter() {
        if !contributor.applies_to(dir) {
            continue;
        }
        match contributor.contribute(dir) {
            Ok(Some(contribution)) => {
                metrics::counter!(
                    m::SCAN_CONTRIBUTOR_MATCHES_TOTAL,
                    m::LABEL_CONTRIBUTOR => contributor.name().to_owned()
                )
                .increment(1);

                let dir_logical = relative_str(base, dir)
                    .map(|rel| join_logical(logical_prefix, &rel))
                    .unwrap_or_else(|| logical_prefix.to_owned());

                for mut artifact in contribution.artifacts {
                    artifact.append_root_path(&dir_logical);
                    artifact.append_project(&ctx.project);
                    apply_reference(ctx, &mut artifact);
                    send_artifact(ctx, artifact);
                }
                send(ctx, CollectorMsg::Pattern(contribution.pattern));
                covered.extend(contribution.covered_files);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    contributor = contributor.name(),
                    dir = %dir.display(),
                    error = %e,
                    "contributor failed, continuing"
                );
            }
        }
    }
}

/// 원시 파일 아티팩트를 만듭니다 (체크섬, 위치, 참조 매칭 포함).
fn file_artifact(
    ctx: &ScanContext,
    path: &Path,
    logical: &str,
    unpack_depth: usize,
) -> Artifact {
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| logical.to_owned());

    let mut artifact = Artifact::with_id(id);
    artifact.attributes.set(ATTR_TYPE, "file");
    artifact.append_root_path(logical);
    artifact.append_project(&ctx.project);
    if unpack_depth > 0 {
        artifact
            .attributes
            .set(ATTR_ARCHIVE_PATH, path.display().to_string());
    }

    match checksum_file(path, ctx.config.max_file_size) {
        Ok(Some(checksum)) => artifact.set_checksum(checksum),
        Ok(None) => {
            artifact.append_error("checksum skipped: file exceeds max_file_size");
        }
        Err(e) => {
            artifact.append_error(&format!("checksum failed: {e}"));
        }
    }

    apply_reference(ctx, &mut artifact);
    artifact
}

/// 참조 인벤토리 일치를 적용합니다.
fn apply_reference(ctx: &ScanContext, artifact: &mut Artifact) {
    if ctx.reference.is_empty() {
        return;
    }
    if let Some(hit) = ctx.reference.lookup(artifact) {
        metrics::counter!(m::SCAN_REFERENCE_HITS_TOTAL).increment(1);
        debug!(
            artifact = %artifact,
            strategy = hit.strategy,
            "reference inventory hit"
        );
        hit.apply_to(artifact);
    }
}

fn send_artifact(ctx: &ScanContext, artifact: Artifact) {
    send(ctx, CollectorMsg::Artifact(ArtifactEvent::new(artifact)));
}

fn send(ctx: &ScanContext, msg: CollectorMsg) {
    if ctx.tx.blocking_send(msg).is_err() {
        debug!("collector channel closed, dropping message");
    }
}

fn unpack_into_scratch(
    ctx: &ScanContext,
    archive: &Path,
    name: &str,
) -> Result<PathBuf, ScanEngineError> {
    let dest = ctx.allocator.allocate(name)?;
    ctx.unpacker.unpack(archive, &dest)?;
    Ok(dest)
}

/// 파일 내용의 SHA-256 체크섬 (16진수 소문자).
///
/// `max_file_size`를 넘는 파일은 `Ok(None)` — 체크섬 생략.
fn checksum_file(path: &Path, max_file_size: u64) -> std::io::Result<Option<String>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > max_file_size {
        return Ok(None);
    }

    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(Some(hex))
}

fn relative_str(base: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(base)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        .filter(|rel| !rel.is_empty())
}

/// 논리 위치 문자열을 조립합니다.
fn join_logical(prefix: &str, rel: &str) -> String {
    if prefix.is_empty() {
        rel.to_owned()
    } else {
        format!("{prefix}{rel}")
    }
}

/// 아카이브 내부의 논리 접두사: `lib/[outer.jar]/`
fn embedded_prefix(logical_prefix: &str, archive_rel: &str, archive_name: &str) -> String {
    let parent = match archive_rel.rfind('/') {
        Some(idx) => &archive_rel[..=idx],
        None => "",
    };
    format!("{}{}[{}]/", logical_prefix, parent, archive_name)
}
