//! 本地 JSON 数据源（读取事先保存的接口响应）

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use crate::utils::log::debug;

use super::{ConfigSource, PropertyRef, parse_custom_behaviors, parse_property_versions};
use crate::error::{AkError, AkResult};
use crate::group::{GroupRecord, parse_groups};
use crate::ruletree::{RuleTreeDocument, parse_rule_tree_document};

/// 本地文件数据源
/// 规则树文件只保存一个属性版本，rule_tree 忽略传入的 ID 与版本号
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    groups_file: Option<PathBuf>,
    rules_file: Option<PathBuf>,
    custom_behaviors_file: Option<PathBuf>,
    search_file: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.groups_file = Some(path.into());
        self
    }

    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    pub fn custom_behaviors_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_behaviors_file = Some(path.into());
        self
    }

    /// 保存的 search/find-by-value 响应
    pub fn search_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_file = Some(path.into());
        self
    }

    async fn read_json(path: &Path) -> AkResult<Value> {
        let content = tokio::fs::read(path).await?;
        debug!("读取本地文件：{}（{} 字节）", path.display(), content.len());
        Ok(serde_json::from_slice(&content)?)
    }

    fn required<'p>(path: &'p Option<PathBuf>, what: &str) -> AkResult<&'p Path> {
        path.as_deref()
            .ok_or_else(|| AkError::InvalidInput(format!("未指定{}文件", what)))
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    async fn groups(&self) -> AkResult<Vec<GroupRecord>> {
        let path = Self::required(&self.groups_file, "分组")?;
        Ok(parse_groups(Self::read_json(path).await?)?)
    }

    async fn rule_tree(&self, property_id: &str, version: u32) -> AkResult<RuleTreeDocument> {
        let path = Self::required(&self.rules_file, "规则树")?;
        debug!("本地规则树：property={} version={}", property_id, version);
        Ok(parse_rule_tree_document(Self::read_json(path).await?)?)
    }

    async fn custom_behavior(&self, behavior_id: &str) -> AkResult<Option<String>> {
        let Some(path) = self.custom_behaviors_file.as_deref() else {
            return Ok(None);
        };
        let items = parse_custom_behaviors(Self::read_json(path).await?)?;
        Ok(items
            .into_iter()
            .find(|item| item.behavior_id == behavior_id)
            .and_then(|item| item.xml))
    }

    async fn find_property(&self, property_name: &str) -> AkResult<Option<PropertyRef>> {
        let Some(path) = self.search_file.as_deref() else {
            return Ok(None);
        };
        let target = property_name.trim();
        let items: Vec<_> = parse_property_versions(Self::read_json(path).await?)?
            .into_iter()
            .filter(|item| item.property_name.eq_ignore_ascii_case(target))
            .collect();
        Ok(PropertyRef::from_versions(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aksummary-file-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_saved_responses() {
        let groups = write_temp(
            "groups.json",
            r#"{"groups": {"items": [{"groupId": 1, "groupName": "Root", "contractIds": ["ctr_1"]}]}}"#,
        )
        .await;
        let rules = write_temp(
            "rules.json",
            r#"{"propertyName": "www.example.com", "rules": {"name": "default"}}"#,
        )
        .await;
        let behaviors = write_temp(
            "custom.json",
            r#"{"customBehaviors": {"items": [{"behaviorId": "cbe_1", "xml": "<x/>"}]}}"#,
        )
        .await;

        let source = FileSource::new()
            .groups_file(groups)
            .rules_file(rules)
            .custom_behaviors_file(behaviors);

        let records = source.groups().await.unwrap();
        assert_eq!(records[0].group_id, "1");

        let doc = source.rule_tree("prp_1", 1).await.unwrap();
        assert_eq!(doc.property_name.as_deref(), Some("www.example.com"));

        assert_eq!(source.custom_behavior("cbe_1").await.unwrap().as_deref(), Some("<x/>"));
        assert_eq!(source.custom_behavior("cbe_2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_property_from_saved_search() {
        let search = write_temp(
            "search.json",
            r#"{"versions": {"items": [
                {"propertyId": "prp_1", "propertyName": "www.example.com", "propertyVersion": 7, "productionStatus": "ACTIVE"},
                {"propertyId": "prp_1", "propertyName": "www.example.com", "propertyVersion": 9},
                {"propertyId": "prp_2", "propertyName": "api.example.com", "propertyVersion": 2}
            ]}}"#,
        )
        .await;
        let source = FileSource::new().search_file(search);

        let found = source.find_property("WWW.example.com").await.unwrap().unwrap();
        assert_eq!(found.property_id, "prp_1");
        assert_eq!(found.production_version, 7);
        assert_eq!(source.find_property("missing.example.com").await.unwrap(), None);
        assert_eq!(FileSource::new().find_property("www.example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_paths() {
        let source = FileSource::new();
        assert!(matches!(source.groups().await, Err(AkError::InvalidInput(_))));
        assert_eq!(source.custom_behavior("cbe_1").await.unwrap(), None);

        let missing = FileSource::new().groups_file("/nonexistent/aksummary/groups.json");
        assert!(matches!(missing.groups().await, Err(AkError::IoError(_))));
    }
}
