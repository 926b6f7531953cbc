//! npm 컨트리뷰터 — package.json 기반 모듈 인식

use std::path::Path;

use tracing::debug;

use stocktake_core::attrs::{ATTR_COMPONENT, ATTR_VERSION};
use stocktake_core::types::{ATTR_COMPONENT_PART, Artifact, ComponentPatternData};

use crate::contributor::{collect_files, ComponentPatternContribution, Contributor};
use crate::error::ScanEngineError;

/// npm 모듈 인식기
///
/// `package.json`이 있는 디렉토리를 하나의 node 모듈로 수렴시킵니다.
/// 중첩된 `node_modules`는 별도의 모듈 디렉토리에서 다시 인식되므로
/// 이 패턴이 덮지 않습니다.
pub struct NpmContributor;

impl Contributor for NpmContributor {
    fn name(&self) -> &str {
        "npm"
    }

    fn applies_to(&self, dir: &Path) -> bool {
        dir.join("package.json").is_file()
    }

    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError> {
        let manifest_path = dir.join("package.json");
        let content =
            std::fs::read_to_string(&manifest_path).map_err(|e| ScanEngineError::Io {
                path: manifest_path.display().to_string(),
                source: e,
            })?;

        let manifest: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %manifest_path.display(), error = %e, "unparseable package.json, skipping");
                return Ok(None);
            }
        };

        let Some(name) = manifest.get("name").and_then(|v| v.as_str()) else {
            return Ok(None);
        };
        let version = manifest
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unspecified");

        let mut artifact = Artifact::with_id(format!("{name}-{version}"));
        artifact.attributes.set(ATTR_COMPONENT, name);
        artifact.attributes.set(ATTR_VERSION, version);
        artifact
            .attributes
            .set(stocktake_core::attrs::ATTR_TYPE, "nodejs-module");

        let mut pattern = ComponentPatternData::new(name, version, "package.json");
        pattern
            .attributes
            .set(ATTR_COMPONENT_PART, format!("{name}-{version}"));
        pattern.add_include_pattern("**/*");
        pattern.add_exclude_pattern("node_modules/**");

        let covered_files = collect_files(dir, &["node_modules"]);

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

    #[test]
    fn recognizes_module_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "lodash", "version": "4.17.21"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("index.js"), "module.exports = {};").unwrap();

        let contributor = NpmContributor;
        assert!(contributor.applies_to(dir.path()));

        let contribution = contributor.contribute(dir.path()).unwrap().unwrap();
        assert_eq!(contribution.artifacts.len(), 1);
        let artifact = &contribution.artifacts[0];
        assert_eq!(artifact.id(), Some("lodash-4.17.21"));
        assert_eq!(artifact.component(), Some("lodash"));
        assert_eq!(artifact.version(), Some("4.17.21"));
        assert_eq!(contribution.pattern.component_name(), Some("lodash"));
        assert_eq!(contribution.covered_files.len(), 2);
    }

    #[test]
    fn nested_node_modules_not_covered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "version": "1.0.0"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
        std::fs::write(
            dir.path().join("node_modules/dep/package.json"),
            r#"{"name": "dep", "version": "2.0.0"}"#,
        )
        .unwrap();

        let contribution = NpmContributor.contribute(dir.path()).unwrap().unwrap();
        assert!(
            contribution
                .covered_files
                .iter()
                .all(|p| !p.to_string_lossy().contains("node_modules"))
        );
    }

    #[test]
    fn missing_name_yields_no_contribution() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"version": "1.0.0"}"#).unwrap();
        assert!(NpmContributor.contribute(dir.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_manifest_yields_no_contribution() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        assert!(NpmContributor.contribute(dir.path()).unwrap().is_none());
    }

    #[test]
    fn does_not_apply_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!NpmContributor.applies_to(dir.path()));
    }
}
