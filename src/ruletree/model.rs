//! 规则树数据模型定义
//! 对应 /papi/v1/properties/{id}/versions/{v}/rules 响应中的 rules 节点

use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 规则树中的行为或匹配条件
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleItem {
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

impl RuleItem {
    pub fn new(name: &str, options: Value) -> Self {
        Self {
            name: name.to_string(),
            options,
        }
    }

    /// 读取 options 下的嵌套字段，如 option_at(&["value", "id"])
    pub fn option_at(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(&self.options, |current, key| current.get(key))
    }

    /// 读取标量字段，字符串/数字统一为字符串（空串视为缺失）
    pub fn option_scalar(&self, keys: &[&str]) -> Option<String> {
        scalar(self.option_at(keys))
    }
}

// 字符串/数字取值统一为字符串
pub(crate) fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 规则树节点（子节点独占，严格树形）
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuleNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub behaviors: Vec<RuleItem>,
    #[serde(default)]
    pub criteria: Vec<RuleItem>,
    #[serde(default)]
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_behaviors(mut self, behaviors: Vec<RuleItem>) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<RuleItem>) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_children(mut self, children: Vec<RuleNode>) -> Self {
        self.children = children;
        self
    }

    pub fn items(&self, kind: ItemKind) -> &[RuleItem] {
        match kind {
            ItemKind::Behavior => &self.behaviors,
            ItemKind::Criteria => &self.criteria,
        }
    }

    /// 是否有需要命名的内容（子节点/行为/条件）
    pub fn has_content(&self) -> bool {
        !self.children.is_empty() || !self.behaviors.is_empty() || !self.criteria.is_empty()
    }
}

/// 扁平化条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Behavior,
    Criteria,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Behavior => "behavior",
            ItemKind::Criteria => "criteria",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规则树文档：属性名（若响应中携带）+ 根节点
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTreeDocument {
    #[serde(default)]
    pub property_name: Option<String>,
    pub rules: RuleNode,
}

/// 解析规则树文档，兼容接口外壳 {"rules": {...}} 与裸规则节点
pub fn parse_rule_tree_document(value: Value) -> serde_json::Result<RuleTreeDocument> {
    if value.get("rules").is_some_and(Value::is_object) {
        return serde_json::from_value(value);
    }
    Ok(RuleTreeDocument {
        property_name: None,
        rules: serde_json::from_value(value)?,
    })
}

/// 仅解析根节点
pub fn parse_rule_tree(value: Value) -> serde_json::Result<RuleNode> {
    parse_rule_tree_document(value).map(|doc| doc.rules)
}
