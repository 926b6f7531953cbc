//! maven 컨트리뷰터 — META-INF/maven pom.properties 기반 모듈 인식

use std::path::Path;

use stocktake_core::attrs::{ATTR_COMPONENT, ATTR_GROUP_ID, ATTR_TYPE, ATTR_VERSION};
use stocktake_core::types::{ATTR_COMPONENT_PART, Artifact, ComponentPatternData};

use crate::contributor::{ComponentPatternContribution, Contributor};
use crate::error::ScanEngineError;

/// maven 모듈 인식기
///
/// jar 해제 결과의 `META-INF/maven/{group}/{artifact}/pom.properties`
/// 디렉토리를 인식합니다. `pom.properties`는 `key=value` 줄 형식입니다.
pub struct MavenContributor;

impl Contributor for MavenContributor {
    fn name(&self) -> &str {
        "maven"
    }

    fn applies_to(&self, dir: &Path) -> bool {
        dir.join("pom.properties").is_file()
    }

    fn contribute(
        &self,
        dir: &Path,
    ) -> Result<Option<ComponentPatternContribution>, ScanEngineError> {
        let properties_path = dir.join("pom.properties");
        let content =
            std::fs::read_to_string(&properties_path).map_err(|e| ScanEngineError::Io {
                path: properties_path.display().to_string(),
                source: e,
            })?;

        let mut group_id = None;
        let mut artifact_id = None;
        let mut version = None;
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "groupId" => group_id = Some(value.trim().to_owned()),
                    "artifactId" => artifact_id = Some(value.trim().to_owned()),
                    "version" => version = Some(value.trim().to_owned()),
                    _ => {}
                }
            }
        }

        let (Some(group_id), Some(artifact_id), Some(version)) =
            (group_id, artifact_id, version)
        else {
            return Ok(None);
        };

        let id = format!("{artifact_id}-{version}.jar");
        let mut artifact = Artifact::with_id(&id);
        artifact.attributes.set(ATTR_COMPONENT, &artifact_id);
        artifact.attributes.set(ATTR_GROUP_ID, &group_id);
        artifact.attributes.set(ATTR_VERSION, &version);
        artifact.attributes.set(ATTR_TYPE, "maven-module");

        let mut pattern = ComponentPatternData::new(&artifact_id, &version, "pom.properties");
        pattern.attributes.set(ATTR_COMPONENT_PART, &id);
        pattern.add_include_pattern("pom.properties");
        pattern.add_include_pattern("pom.xml");

        let mut covered_files = vec![properties_path];
        let pom_xml = dir.join("pom.xml");
        if pom_xml.is_file() {
            covered_files.push(pom_xml);
        }

        Ok(Some(ComponentPatternContribution {
            pattern,
            artifacts: vec![artifact],
            covered_files,
        }))
    }
}
