//! rpm 컨트리뷰터 — NDB 패키지 데이터베이스 인식
//!
//! rpmdb 디렉토리(`Packages.db`)를 인식하고, NDB 카탈로그 스트림을
//! 소비하여 설치 패키지마다 아티팩트를 냅니다. 패턴은 하나이고
//! rpmdb 파일들을 덮습니다 — 카탈로그가 기술하는 패키지들이 패턴이
//! 대표하는 논리 아티팩트입니다.
//!
//! 손상된 슬롯은 스트림에 값으로 전달되며, 여기서는 데이터베이스
//! 아티팩트의 `Errors` 속성으로 강등됩니다. 손상이 있어도 유효한
//! 레코드는 모두 수확합니다.

use std::path::Path;

use tracing::debug;

use stocktake_core::attrs::{ATTR_COMPONENT, ATTR_TYPE, ATTR_VERSION};
use stocktake_core::types::{ATTR_COMPONENT_PART, Artifact, ComponentPatternData};

use crate::contributor::ndb::{self, CatalogEntry};
use crate::contributor::{collect_files, ComponentPatternContribution, Contributor};
use crate::error::ScanEngineError;

/// 카탈로그 스트림 큐 용량
const CATALOG_QUEUE_CAPACITY: usize = 64;

/// rpm NDB 데이터베이스 인식기
#[derive(Default)]
pub struct RpmNdbContributor;

impl Contributor for RpmNdbContributor {
    fn name(&self) -> &str {
        "rpm-ndb"
    }

    fn applies_to(&self, dir: &Path) -> bool {
        dir.join("Packages.db").is_file()
    }

    /// NDB 카탈로그를 스트리밍 소비하여 기여를 만듭니다.
    ///
    /// blocking 컨텍스트에서 호출해야 합니다 (스캔 워커는
    /// `spawn_blocking` 내부에서 컨트리뷰터를 실행합니다).
    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError> {
        let db_path = dir.join("Packages.db");
        let mut rx = ndb::stream_catalog(&db_path, CATALOG_QUEUE_CAPACITY);

        let mut db_artifact = Artifact::with_id("rpm-database");
        db_artifact.attributes.set(ATTR_TYPE, "rpm-database");

        let mut artifacts = Vec::new();
        let mut corrupt_slots = 0usize;

        // 센티널까지 읽고, 내장 에러는 값으로 처리
        while let Some(entry) = rx.blocking_recv() {
            match entry {
                CatalogEntry::Package(pkg) => {
                    let id = format!("{}-{}", pkg.name, pkg.version);
                    let mut artifact = Artifact::with_id(&id);
                    artifact.attributes.set(ATTR_COMPONENT, &pkg.name);
                    artifact.attributes.set(ATTR_VERSION, &pkg.version);
                    artifact.attributes.set(ATTR_TYPE, "rpm-package");
                    if let Some(arch) = &pkg.arch {
                        artifact.attributes.set("Architecture", arch);
                    }
                    if let Some(release) = &pkg.release {
                        artifact.attributes.set("Release", release);
                    }
                    artifacts.push(artifact);
                }
                CatalogEntry::Corrupt { slot, reason } => {
                    corrupt_slots += 1;
                    debug!(path = %db_path.display(), slot, reason = %reason, "corrupt ndb slot");
                    db_artifact.append_error(&format!("slot {slot}: {reason}"));
                }
                CatalogEntry::End => break,
            }
        }

        if artifacts.is_empty() && corrupt_slots == 0 {
            // 빈 데이터베이스는 기여 없음
            return Ok(None);
        }

        debug!(
            path = %db_path.display(),
            packages = artifacts.len(),
            corrupt = corrupt_slots,
            "ndb catalog consumed"
        );

        let mut pattern = ComponentPatternData::new("rpm-database", "ndb", "Packages.db");
        pattern.attributes.set(ATTR_COMPONENT_PART, "rpm-database");
        pattern.add_include_pattern("Packages.db");
        pattern.add_include_pattern("Index.db");
        pattern.add_include_pattern("*.db");

        artifacts.insert(0, db_artifact);
        let covered_files = collect_files(dir, &[])
            .into_iter()
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| ext == "db")
            })
            .collect();

        Ok(Some(ComponentPatternContribution {
            pattern,
            artifacts,
            covered_files,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::ndb::fixture;

    fn write_db(dir: &Path, packages: &[(u32, &str, &str)], corrupt: &[u32]) {
        std::fs::write(dir.join("Packages.db"), fixture::build_ndb(packages, corrupt)).unwrap();
    }

    #[test]
    fn recognizes_rpmdb_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_db(
            dir.path(),
            &[(1, "bash", "5.2.21"), (2, "coreutils", "9.4")],
            &[],
        );

        let contributor = RpmNdbContributor;
        assert!(contributor.applies_to(dir.path()));

        let contribution = contributor.contribute(dir.path()).unwrap().unwrap();
        // 데이터베이스 아티팩트 + 패키지 2개
        assert_eq!(contribution.artifacts.len(), 3);
        assert_eq!(contribution.artifacts[0].id(), Some("rpm-database"));
        assert_eq!(contribution.artifacts[1].id(), Some("bash-5.2.21"));
        assert_eq!(
            contribution.artifacts[1].attributes.get("Architecture"),
            Some("x86_64")
        );
        assert_eq!(contribution.covered_files.len(), 1);
    }

    #[test]
    fn corrupt_slot_degrades_to_database_error() {
        let dir = tempfile::tempdir().unwrap();
        write_db(dir.path(), &[(1, "bash", "5.2"), (2, "zlib", "1.3")], &[2]);

        let contribution = RpmNdbContributor.contribute(dir.path()).unwrap().unwrap();
        // 유효 패키지는 수확되고 손상은 에러 속성으로
        assert_eq!(contribution.artifacts.len(), 2);
        assert!(!contribution.artifacts[0].errors().is_empty());
        assert_eq!(contribution.artifacts[1].id(), Some("bash-5.2"));
    }

    #[test]
    fn empty_database_yields_no_contribution() {
        let dir = tempfile::tempdir().unwrap();
        write_db(dir.path(), &[], &[]);
        assert!(RpmNdbContributor.contribute(dir.path()).unwrap().is_none());
    }

    #[test]
    fn does_not_apply_without_packages_db() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!RpmNdbContributor.applies_to(dir.path()));
    }
}
