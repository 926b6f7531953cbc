//! cargo 컨트리뷰터 — Cargo.toml 기반 크레이트 인식

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use stocktake_core::attrs::{ATTR_COMPONENT, ATTR_TYPE, ATTR_VERSION};
use stocktake_core::types::{ATTR_COMPONENT_PART, Artifact, ComponentPatternData};

use crate::contributor::{collect_files, ComponentPatternContribution, Contributor};
use crate::error::ScanEngineError;

/// `Cargo.toml`의 `[package]` 섹션 (필요한 필드만)
#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: String,
    version: Option<toml::Value>,
}

/// cargo 크레이트 인식기
///
/// `[package]` 섹션이 있는 `Cargo.toml` 디렉토리를 하나의 크레이트로
/// 수렴시킵니다. 워크스페이스 루트(`[package]` 없음)는 기여하지 않고
/// 멤버 디렉토리에서 개별 인식됩니다.
pub struct CargoContributor;

impl Contributor for CargoContributor {
    fn name(&self) -> &str {
        "cargo"
    }

    fn applies_to(&self, dir: &Path) -> bool {
        dir.join("Cargo.toml").is_file()
    }

    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError> {
        let manifest_path = dir.join("Cargo.toml");
        let content =
            std::fs::read_to_string(&manifest_path).map_err(|e| ScanEngineError::Io {
                path: manifest_path.display().to_string(),
                source: e,
            })?;

        let manifest: CargoManifest = match toml::from_str(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(path = %manifest_path.display(), error = %e, "unparseable Cargo.toml, skipping");
                return Ok(None);
            }
        };

        let Some(package) = manifest.package else {
            // workspace 루트는 멤버에서 인식
            return Ok(None);
        };
        let version = match &package.version {
            Some(toml::Value::String(v)) => v.clone(),
            // version.workspace = true 등은 버전 미상으로 취급
            _ => "unspecified".to_owned(),
        };

        let id = format!("{}-{version}", package.name);
        let mut artifact = Artifact::with_id(&id);
        artifact.attributes.set(ATTR_COMPONENT, &package.name);
        artifact.attributes.set(ATTR_VERSION, &version);
        artifact.attributes.set(ATTR_TYPE, "cargo-crate");

        let mut pattern = ComponentPatternData::new(&package.name, &version, "Cargo.toml");
        pattern.attributes.set(ATTR_COMPONENT_PART, &id);
        pattern.add_include_pattern("Cargo.toml");
        pattern.add_include_pattern("Cargo.lock");
        pattern.add_include_pattern("src/**");
        pattern.add_include_pattern("build.rs");
        pattern.add_exclude_pattern("target/**");

        let compiled = pattern
            .compile()
            .map_err(|e| ScanEngineError::Config {
                field: "component pattern".to_owned(),
                reason: e.to_string(),
            })?;
        let covered_files = collect_files(dir, &["target"])
            .into_iter()
            .filter(|path| {
                path.strip_prefix(dir)
                    .ok()
                    .and_then(|rel| rel.to_str())
                    .is_some_and(|rel| compiled.covers(rel))
            })
            .collect();

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
    fn recognizes_crate_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"zerocopy\"\nversion = \"0.7.35\"\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "pub fn x() {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();

        let contribution = CargoContributor.contribute(dir.path()).unwrap().unwrap();
        let artifact = &contribution.artifacts[0];
        assert_eq!(artifact.id(), Some("zerocopy-0.7.35"));
        assert_eq!(artifact.artifact_type(), Some("cargo-crate"));

        // README는 패턴이 덮지 않음
        let covered: Vec<String> = contribution
            .covered_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(covered.contains(&"Cargo.toml".to_owned()));
        assert!(covered.contains(&"lib.rs".to_owned()));
        assert!(!covered.contains(&"README.md".to_owned()));
    }

    #[test]
    fn workspace_root_without_package_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[workspace]\nmembers = [\"a\"]\n",
        )
        .unwrap();
        assert!(CargoContributor.contribute(dir.path()).unwrap().is_none());
    }

    #[test]
    fn workspace_inherited_version_is_unspecified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"member\"\nversion.workspace = true\n",
        )
        .unwrap();
        let contribution = CargoContributor.contribute(dir.path()).unwrap().unwrap();
        assert_eq!(
            contribution.artifacts[0].version(),
            Some("unspecified")
        );
    }

    #[test]
    fn malformed_manifest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "not [[ toml").unwrap();
        assert!(CargoContributor.contribute(dir.path()).unwrap().is_none());
    }
}
