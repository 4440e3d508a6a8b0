//! 账户汇总编排：数据源 → 分组/规则树核心 → 导出端

use std::collections::HashMap;
use std::sync::Arc;

use crate::utils::log::{debug, info, warn};

use crate::config::GlobalConfig;
use crate::error::{AkError, AkResult};
use crate::export::{Table, TableSink};
use crate::group::{GroupSummary, PathBuilder};
use crate::ruletree::{BehaviorInspector, FlatRow, Flattener, ItemKind, RuleNode, RuleTreeWalker};
use crate::source::ConfigSource;
use crate::utils::preview_compact;

use super::tables::{LoadedProperty, advanced_table, behavior_table};

/// 分组汇总表名
pub const GROUPS_TABLE: &str = "groups";
/// 规则树扁平化表名
pub const RULES_TABLE: &str = "rules";
/// 属性行为汇总表名
pub const BEHAVIORS_TABLE: &str = "behaviors";
/// 高级 XML 明细表名
pub const ADVANCED_TABLE: &str = "advanced";

/// 待汇总的属性版本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTarget {
    /// 输出使用的属性名，缺省时取规则树响应中的 propertyName
    pub name: Option<String>,
    pub property_id: String,
    pub version: u32,
}

impl PropertyTarget {
    pub fn new(property_id: &str, version: u32) -> Self {
        Self {
            name: None,
            property_id: property_id.to_string(),
            version,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// 属性汇总结果：扁平化行 + 行为汇总表 + 高级 XML 表
#[derive(Debug, Clone)]
pub struct PropertyReport {
    pub rows: Vec<FlatRow>,
    pub behaviors: Table,
    pub advanced: Table,
}

/// 账户汇总器
pub struct AccountReporter {
    source: Arc<dyn ConfigSource>,
    config: GlobalConfig,
}

impl AccountReporter {
    pub fn new(source: Arc<dyn ConfigSource>, config: GlobalConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// 分组汇总（环/重复ID直接返回错误）
    pub async fn group_summary(&self) -> AkResult<GroupSummary> {
        let records = self.source.groups().await?;
        let builder = PathBuilder::new(self.config.max_group_depth);
        let summary = GroupSummary::build(&records, &builder)?;
        info!("分组汇总完成：分组 {} 个，输出 {} 行", records.len(), summary.rows().len());
        Ok(summary)
    }

    /// 确定属性ID与版本
    /// 两者都已给出时直接使用，否则按属性名检索，版本缺省取生产网络激活版本
    pub async fn resolve_target(
        &self,
        name: &str,
        property_id: Option<&str>,
        version: Option<u32>,
    ) -> AkResult<PropertyTarget> {
        if let (Some(id), Some(version)) = (property_id, version) {
            return Ok(PropertyTarget::new(id, version).named(name));
        }

        let found = self
            .source
            .find_property(name)
            .await?
            .ok_or_else(|| AkError::InvalidInput(format!("未找到属性：{}", name)))?;
        let id = property_id.unwrap_or(found.property_id.as_str());
        let version = version.unwrap_or(found.production_version);
        info!("{:<40} {} v{}", name, id, version);
        Ok(PropertyTarget::new(id, version).named(name))
    }

    // 按顺序拉取规则树并解析自定义行为
    async fn load_properties(&self, targets: &[PropertyTarget]) -> AkResult<Vec<(LoadedProperty, HashMap<String, String>)>> {
        let mut loaded = Vec::with_capacity(targets.len());
        for target in targets {
            let doc = self.source.rule_tree(&target.property_id, target.version).await?;
            let property = target
                .name
                .clone()
                .or(doc.property_name.clone())
                .unwrap_or_else(|| target.property_id.clone());
            let registry = self.resolve_custom_behaviors(&property, &doc.rules).await;
            loaded.push((
                LoadedProperty {
                    property,
                    property_id: target.property_id.clone(),
                    version: target.version,
                    tree: doc.rules,
                },
                registry,
            ));
        }
        Ok(loaded)
    }

    /// 属性汇总；counted 为需要单独计数的行为名
    pub async fn property_report(&self, targets: &[PropertyTarget], counted: &[String]) -> AkResult<PropertyReport> {
        let loaded = self.load_properties(targets).await?;

        // 多个属性共用一个扁平化器，按属性依次输出行为与匹配条件
        let mut rows = Vec::new();
        for (property, registry) in &loaded {
            let mut flattener = Flattener::new(registry);
            for kind in [ItemKind::Behavior, ItemKind::Criteria] {
                let occurrences = RuleTreeWalker::walk(&property.tree, kind)?;
                rows.extend(flattener.flatten(&property.property, kind, &occurrences));
            }
            debug!("{:<40} 累计输出 {} 行", property.property, rows.len());
        }

        let properties: Vec<LoadedProperty> = loaded.into_iter().map(|(property, _)| property).collect();
        Ok(PropertyReport {
            rows,
            behaviors: behavior_table(&properties, counted)?,
            advanced: advanced_table(&properties)?,
        })
    }

    /// 仅扁平化行
    pub async fn property_rows(&self, targets: &[PropertyTarget]) -> AkResult<Vec<FlatRow>> {
        Ok(self.property_report(targets, &[]).await?.rows)
    }

    /// 逐个拉取规则树引用的自定义行为，失败的ID记录警告后跳过
    async fn resolve_custom_behaviors(&self, property: &str, tree: &RuleNode) -> HashMap<String, String> {
        let mut registry = HashMap::new();
        for behavior_id in BehaviorInspector::custom_behavior_ids(tree) {
            match self.source.custom_behavior(&behavior_id).await {
                Ok(Some(xml)) => {
                    debug!("{:<40} {} {}", property, behavior_id, preview_compact(&xml, 60));
                    registry.insert(behavior_id, xml);
                }
                Ok(None) => warn!("{:<40} 自定义行为不存在：{}", property, behavior_id),
                Err(e) => warn!("{:<40} 自定义行为 {} 拉取失败：{}", property, behavior_id, e),
            }
        }
        registry
    }

    /// 导出分组汇总
    pub async fn export_groups(&self, sink: &mut dyn TableSink) -> AkResult<GroupSummary> {
        let summary = self.group_summary().await?;
        sink.write_table(GROUPS_TABLE, &summary.to_table()?).await?;
        Ok(summary)
    }

    /// 导出规则树扁平化结果、行为汇总与高级 XML
    pub async fn export_rules(
        &self,
        targets: &[PropertyTarget],
        counted: &[String],
        sink: &mut dyn TableSink,
    ) -> AkResult<PropertyReport> {
        let report = self.property_report(targets, counted).await?;
        sink.write_table(RULES_TABLE, &FlatRow::to_table(&report.rows)?).await?;
        sink.write_table(BEHAVIORS_TABLE, &report.behaviors).await?;
        sink.write_table(ADVANCED_TABLE, &report.advanced).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::config::ConfigManager;
    use crate::export::MemorySink;
    use crate::group::GroupRecord;
    use crate::ruletree::{Payload, RuleTreeDocument, parse_rule_tree_document};
    use crate::source::PropertyRef;

    struct InMemorySource {
        groups: Vec<GroupRecord>,
        documents: HashMap<String, RuleTreeDocument>,
        custom: HashMap<String, String>,
    }

    #[async_trait]
    impl ConfigSource for InMemorySource {
        async fn groups(&self) -> AkResult<Vec<GroupRecord>> {
            Ok(self.groups.clone())
        }

        async fn rule_tree(&self, property_id: &str, _version: u32) -> AkResult<RuleTreeDocument> {
            self.documents
                .get(property_id)
                .cloned()
                .ok_or_else(|| AkError::InvalidInput(format!("unknown property {}", property_id)))
        }

        async fn custom_behavior(&self, behavior_id: &str) -> AkResult<Option<String>> {
            if behavior_id == "cbe_broken" {
                return Err(AkError::HttpStatus {
                    url: "memory://custom".to_string(),
                    status: 500,
                });
            }
            Ok(self.custom.get(behavior_id).cloned())
        }

        async fn find_property(&self, property_name: &str) -> AkResult<Option<PropertyRef>> {
            Ok(self
                .documents
                .iter()
                .filter(|(_, doc)| doc.property_name.as_deref() == Some(property_name))
                .map(|(id, _)| PropertyRef {
                    property_id: id.clone(),
                    property_name: property_name.to_string(),
                    staging_version: 4,
                    production_version: 3,
                })
                .next())
        }
    }

    fn sample_source() -> InMemorySource {
        let doc = parse_rule_tree_document(json!({
            "propertyName": "www.example.com",
            "rules": {
                "name": "default",
                "behaviors": [{"name": "cpCode", "options": {"value": {"id": 1}}}],
                "children": [
                    {
                        "name": "Legacy",
                        "behaviors": [
                            {"name": "customBehavior", "options": {"behaviorId": "cbe_1"}},
                            {"name": "customBehavior", "options": {"behaviorId": "cbe_broken"}}
                        ]
                    },
                    {
                        "name": "Static",
                        "criteria": [{"name": "fileExtension", "options": {"values": ["css"]}}]
                    }
                ]
            }
        }))
        .unwrap();

        InMemorySource {
            groups: vec![
                GroupRecord::new("1", "Root", None).with_contracts(&["ctr_A"]),
                GroupRecord::new("2", "Web", Some("1")).with_contracts(&["ctr_A", "ctr_B"]),
            ],
            documents: HashMap::from([("prp_1".to_string(), doc)]),
            custom: HashMap::from([("cbe_1".to_string(), "<strip-headers/>".to_string())]),
        }
    }

    fn reporter(source: InMemorySource) -> AccountReporter {
        AccountReporter::new(Arc::new(source), ConfigManager::get_default())
    }

    #[tokio::test]
    async fn test_export_groups_to_sink() {
        let mut sink = MemorySink::new();
        let summary = reporter(sample_source()).export_groups(&mut sink).await.unwrap();

        assert_eq!(summary.rows().len(), 3);
        let table = sink.get(GROUPS_TABLE).unwrap();
        assert_eq!(table.column("path").unwrap(), vec!["Root", "Root > Web", "Root > Web"]);
        assert_eq!(
            table.column("groupStructure").unwrap(),
            vec!["Root", "Root > Web_ctr_A", "Root > Web_ctr_B"]
        );
    }

    #[tokio::test]
    async fn test_group_cycle_aborts() {
        let mut source = sample_source();
        source.groups = vec![
            GroupRecord::new("1", "A", Some("2")),
            GroupRecord::new("2", "B", Some("1")),
        ];
        let err = reporter(source).group_summary().await.unwrap_err();
        assert!(matches!(err, AkError::CycleDetected { .. }));
    }

    #[tokio::test]
    async fn test_property_rows_resolve_custom_behaviors() {
        let rows = reporter(sample_source())
            .property_rows(&[PropertyTarget::new("prp_1", 3)])
            .await
            .unwrap();

        // 行为在前，匹配条件在后
        let kinds: Vec<ItemKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Behavior, ItemKind::Behavior, ItemKind::Behavior, ItemKind::Criteria]
        );
        assert!(rows.iter().all(|r| r.property == "www.example.com"));

        assert_eq!(rows[1].path, "default [  1] > Legacy");
        assert_eq!(rows[1].payload, Payload::Xml("<strip-headers/>".to_string()));
        assert_eq!(rows[1].occurrence_index, 1);

        // 拉取失败的自定义行为降级为空载荷
        assert_eq!(rows[2].payload, Payload::Empty);
        assert_eq!(rows[2].custom_behavior_id.as_deref(), Some("cbe_broken"));
        assert_eq!(rows[2].occurrence_index, 2);

        assert_eq!(rows[3].path, "default [  2] > Static");
    }

    #[tokio::test]
    async fn test_export_rules_uses_explicit_name() {
        let mut sink = MemorySink::new();
        let targets = [PropertyTarget::new("prp_1", 3).named("legacy-site")];
        reporter(sample_source()).export_rules(&targets, &[], &mut sink).await.unwrap();

        let table = sink.get(RULES_TABLE).unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.column("property").unwrap().iter().all(|p| *p == "legacy-site"));
    }

    #[tokio::test]
    async fn test_export_rules_writes_behavior_and_advanced_tables() {
        let mut source = sample_source();
        let edge = parse_rule_tree_document(json!({
            "propertyName": "edge.example.com",
            "rules": {
                "name": "default",
                "behaviors": [
                    {"name": "cpCode", "options": {"value": {"id": 300}}},
                    {"name": "advanced", "options": {"xml": "<edge:rewrite/>"}}
                ],
                "children": [{"name": "Api", "behaviors": [
                    {"name": "cpCode", "options": {"value": {"id": 40}}},
                    {"name": "origin", "options": {"hostname": "api-origin.example.com"}}
                ]}]
            }
        }))
        .unwrap();
        source.documents.insert("prp_2".to_string(), edge);

        let mut sink = MemorySink::new();
        let targets = [PropertyTarget::new("prp_1", 3), PropertyTarget::new("prp_2", 5)];
        let report = reporter(source)
            .export_rules(&targets, &["cpCode".to_string()], &mut sink)
            .await
            .unwrap();

        let behaviors = sink.get(BEHAVIORS_TABLE).unwrap();
        assert_eq!(behaviors, &report.behaviors);
        assert_eq!(behaviors.column("property").unwrap(), vec!["www.example.com", "edge.example.com"]);
        assert_eq!(behaviors.column("version").unwrap(), vec!["3", "5"]);
        assert_eq!(behaviors.column("cpcode").unwrap(), vec!["1", "40\n300"]);
        assert_eq!(behaviors.column("customBehavior").unwrap(), vec!["cbe_1\ncbe_broken", ""]);
        assert_eq!(behaviors.column("origin").unwrap(), vec!["", "api-origin.example.com"]);
        assert_eq!(behaviors.column("cpCode").unwrap(), vec!["1", "2"]);

        let advanced = sink.get(ADVANCED_TABLE).unwrap();
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced.column("property").unwrap(), vec!["edge.example.com"]);
        assert_eq!(advanced.column("type").unwrap(), vec!["advBehavior"]);
        assert_eq!(advanced.column("xml").unwrap(), vec!["<edge:rewrite/>"]);
    }

    #[tokio::test]
    async fn test_resolve_target_by_name() {
        let reporter = reporter(sample_source());

        // 仅给出属性名：ID 与生产网络版本均来自检索
        let target = reporter.resolve_target("www.example.com", None, None).await.unwrap();
        assert_eq!(target, PropertyTarget::new("prp_1", 3).named("www.example.com"));

        // 显式版本优先
        let pinned = reporter.resolve_target("www.example.com", None, Some(9)).await.unwrap();
        assert_eq!(pinned.version, 9);
        assert_eq!(pinned.property_id, "prp_1");

        // ID 与版本齐全时不检索
        let direct = reporter.resolve_target("unlisted", Some("prp_7"), Some(2)).await.unwrap();
        assert_eq!(direct, PropertyTarget::new("prp_7", 2).named("unlisted"));

        let missing = reporter.resolve_target("missing.example.com", None, None).await;
        assert!(matches!(missing, Err(AkError::InvalidInput(_))));

        let rows = reporter.property_rows(&[target]).await.unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_property_propagates() {
        let result = reporter(sample_source())
            .property_rows(&[PropertyTarget::new("prp_missing", 1)])
            .await;
        assert!(matches!(result, Err(AkError::InvalidInput(_))));
    }
}
