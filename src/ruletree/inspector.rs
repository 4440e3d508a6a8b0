//! 规则树行为检查工具
//! 递归统计行为名称/次数，并提取 CP Code、源站、SiteShield 等常用取值

use serde_json::Value;

use super::flattener::{ADVANCED_BEHAVIOR, ADVANCED_MATCH, CUSTOM_BEHAVIOR};
use super::model::{ItemKind, RuleItem, RuleNode};
use crate::utils::sorted_unique;

/// 高级行为 / 高级匹配条件中的 XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedXml {
    /// 所在规则名
    pub rule: String,
    pub kind: ItemKind,
    pub xml: String,
}

/// 行为检查工具（无状态）
pub struct BehaviorInspector;

impl BehaviorInspector {
    /// 前序遍历所有节点
    fn for_each_node<'a>(node: &'a RuleNode, visit: &mut dyn FnMut(&'a RuleNode)) {
        visit(node);
        for child in &node.children {
            Self::for_each_node(child, visit);
        }
    }

    fn for_each_behavior<'a>(node: &'a RuleNode, visit: &mut dyn FnMut(&'a RuleItem)) {
        Self::for_each_node(node, &mut |n: &'a RuleNode| {
            for behavior in &n.behaviors {
                visit(behavior);
            }
        });
    }

    /// 全部行为名称（前序，含重复）
    pub fn behavior_names(tree: &RuleNode) -> Vec<String> {
        let mut names = Vec::new();
        Self::for_each_behavior(tree, &mut |b| names.push(b.name.clone()));
        names
    }

    /// 指定行为出现次数（忽略大小写）
    pub fn behavior_count(tree: &RuleNode, target: &str) -> usize {
        let mut count = 0;
        Self::for_each_behavior(tree, &mut |b| {
            if b.name.eq_ignore_ascii_case(target) {
                count += 1;
            }
        });
        count
    }

    /// 按行为名收集取值，去重后数字在前按数值排序
    fn collect_values(tree: &RuleNode, extract: &dyn Fn(&RuleItem) -> Vec<String>) -> Vec<String> {
        let mut values = Vec::new();
        Self::for_each_behavior(tree, &mut |b| values.extend(extract(b)));
        sorted_unique(values)
    }

    /// CP Code：cpCode / failAction / visitorPrioritization
    pub fn cpcode_values(tree: &RuleNode) -> Vec<String> {
        Self::collect_values(tree, &|b| match b.name.as_str() {
            "cpCode" => b.option_scalar(&["value", "id"]).into_iter().collect(),
            "failAction" => b.option_scalar(&["cpCode", "id"]).into_iter().collect(),
            "visitorPrioritization" => [
                b.option_scalar(&["waitingRoomCpCode", "cpCode"]),
                b.option_scalar(&["waitingRoomNetStorage", "cpCode"]),
            ]
            .into_iter()
            .flatten()
            .collect(),
            _ => Vec::new(),
        })
    }

    /// 源站主机名（含 NetStorage 下载域名）
    pub fn origin_values(tree: &RuleNode) -> Vec<String> {
        Self::collect_values(tree, &|b| match b.name.as_str() {
            "origin" => [
                b.option_scalar(&["hostname"]),
                b.option_scalar(&["netStorage", "downloadDomainName"]),
            ]
            .into_iter()
            .flatten()
            .collect(),
            _ => Vec::new(),
        })
    }

    /// SiteShield 映射
    pub fn siteshield_values(tree: &RuleNode) -> Vec<String> {
        Self::collect_values(tree, &|b| match b.name.as_str() {
            "siteShield" => b.option_scalar(&["ssmap", "value"]).into_iter().collect(),
            _ => Vec::new(),
        })
    }

    /// SureRoute 映射（位于 siteShield 行为中）
    pub fn sureroute_values(tree: &RuleNode) -> Vec<String> {
        Self::collect_values(tree, &|b| match b.name.as_str() {
            "siteShield" => b.option_scalar(&["ssmap", "srmap"]).into_iter().collect(),
            _ => Vec::new(),
        })
    }

    /// 引用的自定义行为ID
    pub fn custom_behavior_ids(tree: &RuleNode) -> Vec<String> {
        Self::collect_values(tree, &|b| match b.name.as_str() {
            CUSTOM_BEHAVIOR => b.option_scalar(&["behaviorId"]).into_iter().collect(),
            _ => Vec::new(),
        })
    }

    /// 高级行为与高级匹配条件的 XML（前序，规则内先行为后条件）
    pub fn advanced_xml(tree: &RuleNode) -> Vec<AdvancedXml> {
        let mut found = Vec::new();
        Self::for_each_node(tree, &mut |node| {
            let rule = node.name.clone().unwrap_or_default();
            for behavior in node.behaviors.iter().filter(|b| b.name == ADVANCED_BEHAVIOR) {
                if let Some(xml) = behavior.option_at(&["xml"]).and_then(Value::as_str) {
                    found.push(AdvancedXml {
                        rule: rule.clone(),
                        kind: ItemKind::Behavior,
                        xml: xml.to_string(),
                    });
                }
            }
            for criterion in node.criteria.iter().filter(|c| c.name == ADVANCED_MATCH) {
                let part = |key: &str| criterion.option_at(&[key]).and_then(Value::as_str).unwrap_or("");
                let xml = format!("{}{}", part("openXml"), part("closeXml"));
                if !xml.is_empty() {
                    found.push(AdvancedXml {
                        rule: rule.clone(),
                        kind: ItemKind::Criteria,
                        xml,
                    });
                }
            }
        });
        found
    }
}
