//! wheel 컨트리뷰터 — *.dist-info/METADATA 기반 파이썬 배포본 인식

use std::path::Path;

use stocktake_core::attrs::{ATTR_COMPONENT, ATTR_TYPE, ATTR_VERSION};
use stocktake_core::types::{ATTR_COMPONENT_PART, Artifact, ComponentPatternData};

use crate::contributor::{collect_files, ComponentPatternContribution, Contributor};
use crate::error::ScanEngineError;

/// 파이썬 wheel 배포본 인식기
///
/// site-packages의 `{name}-{version}.dist-info` 디렉토리를 인식합니다.
/// `METADATA`는 RFC 822 스타일 `Key: value` 헤더 형식입니다.
pub struct WheelContributor;

impl Contributor for WheelContributor {
    fn name(&self) -> &str {
        "wheel"
    }

    fn applies_to(&self, dir: &Path) -> bool {
        dir.extension().and_then(|e| e.to_str()) == Some("dist-info")
            && dir.join("METADATA").is_file()
    }

    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError> {
        let metadata_path = dir.join("METADATA");
        let content =
            std::fs::read_to_string(&metadata_path).map_err(|e| ScanEngineError::Io {
                path: metadata_path.display().to_string(),
                source: e,
            })?;

        let mut name = None;
        let mut version = None;
        for line in content.lines() {
            // 헤더 블록은 첫 빈 줄에서 끝남 (이후는 description 본문)
            if line.trim().is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Name:") {
                name = Some(value.trim().to_owned());
            } else if let Some(value) = line.strip_prefix("Version:") {
                version = Some(value.trim().to_owned());
            }
        }

        let (Some(name), Some(version)) = (name, version) else {
            return Ok(None);
        };

        let id = format!("{name}-{version}");
        let mut artifact = Artifact::with_id(&id);
        artifact.attributes.set(ATTR_COMPONENT, &name);
        artifact.attributes.set(ATTR_VERSION, &version);
        artifact.attributes.set(ATTR_TYPE, "python-wheel");

        let mut pattern = ComponentPatternData::new(&name, &version, "METADATA");
        pattern.attributes.set(ATTR_COMPONENT_PART, &id);
        pattern.add_include_pattern("**/*");

        let covered_files = collect_files(dir, &[]);

        Ok(Some(ComponentPatternContribution {
            pattern,
            artifacts: vec![artifact],
            covered_files,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist_info(base: &Path, dir_name: &str, metadata: &str) -> std::path::PathBuf {
        let dir = base.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("METADATA"), metadata).unwrap();
        dir
    }

    #[test]
    fn recognizes_dist_info() {
        let base = tempfile::tempdir().unwrap();
        let dir = dist_info(
            base.path(),
            "requests-2.31.0.dist-info",
            "Metadata-Version: 2.1\nName: requests\nVersion: 2.31.0\n\nHTTP library\n",
        );
        std::fs::write(dir.join("RECORD"), "").unwrap();

        let contributor = WheelContributor;
        assert!(contributor.applies_to(&dir));

        let contribution = contributor.contribute(&dir).unwrap().unwrap();
        let artifact = &contribution.artifacts[0];
        assert_eq!(artifact.id(), Some("requests-2.31.0"));
        assert_eq!(artifact.artifact_type(), Some("python-wheel"));
        assert_eq!(contribution.covered_files.len(), 2);
    }

    #[test]
    fn body_headers_are_not_parsed() {
        let base = tempfile::tempdir().unwrap();
        let dir = dist_info(
            base.path(),
            "pkg-1.0.dist-info",
            "Name: pkg\nVersion: 1.0\n\nName: fake-in-body\n",
        );
        let contribution = WheelContributor.contribute(&dir).unwrap().unwrap();
        assert_eq!(contribution.artifacts[0].component(), Some("pkg"));
    }

    #[test]
    fn missing_version_yields_no_contribution() {
        let base = tempfile::tempdir().unwrap();
        let dir = dist_info(base.path(), "x.dist-info", "Name: x\n");
        assert!(WheelContributor.contribute(&dir).unwrap().is_none());
    }

    #[test]
    fn does_not_apply_to_plain_directory() {
        let base = tempfile::tempdir().unwrap();
        assert!(!WheelContributor.applies_to(base.path()));
    }
}
