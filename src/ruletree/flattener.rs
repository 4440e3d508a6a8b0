//! 扁平化：把遍历得到的 (路径, 条目列表) 展开为逐条输出行
//! 出现序号按 (属性, 类型, 路径) 分组计数，从 1 开始

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use crate::utils::log::warn;

use super::model::{ItemKind, RuleItem};
use super::walker::Occurrence;
use crate::error::{AkError, AkResult};
use crate::export::Table;

/// 引用外部自定义行为的行为名
pub const CUSTOM_BEHAVIOR: &str = "customBehavior";
/// 高级行为（内嵌 XML）
pub const ADVANCED_BEHAVIOR: &str = "advanced";
/// 高级匹配条件（openXml + closeXml）
pub const ADVANCED_MATCH: &str = "matchAdvanced";

/// 自定义行为查询接口（注入，便于离线测试）
pub trait CustomBehaviorLookup {
    /// 按 behaviorId 返回自定义行为 XML
    fn lookup(&self, behavior_id: &str) -> Option<String>;
}

impl CustomBehaviorLookup for HashMap<String, String> {
    fn lookup(&self, behavior_id: &str) -> Option<String> {
        self.get(behavior_id).cloned()
    }
}

/// 空注册表：所有自定义行为均无法解析
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCustomBehaviors;

impl CustomBehaviorLookup for NoCustomBehaviors {
    fn lookup(&self, _behavior_id: &str) -> Option<String> {
        None
    }
}

/// 输出行载荷
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// 原始 options
    Options(Value),
    /// 高级行为 / 高级匹配 / 自定义行为的 XML
    Xml(String),
    /// 无法解析的自定义行为
    Empty,
}

impl Payload {
    /// 表格单元格文本
    pub fn to_cell(&self) -> String {
        match self {
            Payload::Options(Value::String(s)) => s.clone(),
            Payload::Options(Value::Null) => String::new(),
            Payload::Options(value) => value.to_string(),
            Payload::Xml(xml) => xml.clone(),
            Payload::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

/// 扁平化输出行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    pub property: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub payload: Payload,
    pub occurrence_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_behavior_id: Option<String>,
}

impl FlatRow {
    pub const COLUMNS: [&'static str; 7] = [
        "property",
        "path",
        "type",
        "name",
        "payload",
        "occurrenceIndex",
        "customBehaviorId",
    ];

    pub fn to_table(rows: &[FlatRow]) -> AkResult<Table> {
        let mut table = Table::new(Self::COLUMNS);
        for row in rows {
            table.push_row(vec![
                row.property.clone(),
                row.path.clone(),
                row.kind.to_string(),
                row.name.clone(),
                row.payload.to_cell(),
                row.occurrence_index.to_string(),
                row.custom_behavior_id.clone().unwrap_or_default(),
            ])?;
        }
        Ok(table)
    }
}

/// 扁平化器，计数器在多次调用间保留
pub struct Flattener<'r> {
    registry: &'r dyn CustomBehaviorLookup,
    counters: HashMap<(String, ItemKind, String), usize>,
}

impl<'r> Flattener<'r> {
    pub fn new(registry: &'r dyn CustomBehaviorLookup) -> Self {
        Self {
            registry,
            counters: HashMap::new(),
        }
    }

    pub fn flatten(&mut self, property: &str, kind: ItemKind, occurrences: &[Occurrence<'_>]) -> Vec<FlatRow> {
        let mut rows = Vec::new();

        for occurrence in occurrences {
            for item in occurrence.items {
                let counter = self
                    .counters
                    .entry((property.to_string(), kind, occurrence.path.clone()))
                    .or_insert(0);
                *counter += 1;
                let occurrence_index = *counter;

                let (payload, custom_behavior_id) = self.extract_payload(property, kind, item);
                rows.push(FlatRow {
                    property: property.to_string(),
                    path: occurrence.path.clone(),
                    kind,
                    name: item.name.clone(),
                    payload,
                    occurrence_index,
                    custom_behavior_id,
                });
            }
        }

        rows
    }

    fn extract_payload(&self, property: &str, kind: ItemKind, item: &RuleItem) -> (Payload, Option<String>) {
        match (kind, item.name.as_str()) {
            (ItemKind::Behavior, CUSTOM_BEHAVIOR) => {
                let Some(behavior_id) = item.option_scalar(&["behaviorId"]) else {
                    warn!("{:<40} {}", property, AkError::UnresolvedReference("<missing behaviorId>".to_string()));
                    return (Payload::Empty, None);
                };
                match self.registry.lookup(&behavior_id) {
                    Some(xml) => (Payload::Xml(xml), Some(behavior_id)),
                    None => {
                        warn!("{:<40} {}", property, AkError::UnresolvedReference(behavior_id.clone()));
                        (Payload::Empty, Some(behavior_id))
                    }
                }
            }
            (ItemKind::Behavior, ADVANCED_BEHAVIOR) => match item.option_at(&["xml"]).and_then(Value::as_str) {
                Some(xml) => (Payload::Xml(xml.to_string()), None),
                // 缺少 xml 时保留原始 options
                None => (Payload::Options(item.options.clone()), None),
            },
            (ItemKind::Criteria, ADVANCED_MATCH) => {
                let part = |key: &str| item.option_at(&[key]).and_then(Value::as_str).unwrap_or("").to_string();
                (Payload::Xml(format!("{}{}", part("openXml"), part("closeXml"))), None)
            }
            _ => (Payload::Options(item.options.clone()), None),
        }
    }
}
