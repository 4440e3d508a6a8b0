//! 属性级汇总表：行为取值汇总与高级 XML 明细

use crate::error::AkResult;
use crate::export::Table;
use crate::ruletree::{BehaviorInspector, ItemKind, RuleNode};

/// 行为汇总表固定列（其后追加按名称计数的列）
pub const BEHAVIOR_COLUMNS: [&str; 12] = [
    "property",
    "propertyId",
    "version",
    "behaviorCount",
    "cpcode",
    "cpcodeCount",
    "origin",
    "originCount",
    "siteshield",
    "sureroute",
    "customBehavior",
    "customBehaviorCount",
];

/// 高级 XML 表列
pub const ADVANCED_COLUMNS: [&str; 4] = ["property", "type", "rule", "xml"];

/// 已加载的属性规则树
#[derive(Debug, Clone)]
pub struct LoadedProperty {
    pub property: String,
    pub property_id: String,
    pub version: u32,
    pub tree: RuleNode,
}

// 多个取值换行拼接
fn join_values(values: &[String]) -> String {
    values.join("\n")
}

/// 每个属性一行：CP Code、源站、SiteShield、SureRoute、自定义行为，以及指定行为的出现次数
pub fn behavior_table(properties: &[LoadedProperty], counted: &[String]) -> AkResult<Table> {
    let mut columns: Vec<String> = BEHAVIOR_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(counted.iter().cloned());

    let mut table = Table::new(columns);
    for loaded in properties {
        let tree = &loaded.tree;
        let cpcodes = BehaviorInspector::cpcode_values(tree);
        let origins = BehaviorInspector::origin_values(tree);
        let custom = BehaviorInspector::custom_behavior_ids(tree);

        let mut cells = vec![
            loaded.property.clone(),
            loaded.property_id.clone(),
            loaded.version.to_string(),
            BehaviorInspector::behavior_names(tree).len().to_string(),
            join_values(&cpcodes),
            cpcodes.len().to_string(),
            join_values(&origins),
            origins.len().to_string(),
            join_values(&BehaviorInspector::siteshield_values(tree)),
            join_values(&BehaviorInspector::sureroute_values(tree)),
            join_values(&custom),
            custom.len().to_string(),
        ];
        cells.extend(
            counted
                .iter()
                .map(|name| BehaviorInspector::behavior_count(tree, name).to_string()),
        );
        table.push_row(cells)?;
    }
    Ok(table)
}

/// 高级行为（advBehavior）与高级匹配（advMatch）的 XML 明细
pub fn advanced_table(properties: &[LoadedProperty]) -> AkResult<Table> {
    let mut table = Table::new(ADVANCED_COLUMNS);
    for loaded in properties {
        for entry in BehaviorInspector::advanced_xml(&loaded.tree) {
            let kind = match entry.kind {
                ItemKind::Behavior => "advBehavior",
                ItemKind::Criteria => "advMatch",
            };
            table.push_row(vec![loaded.property.clone(), kind.to_string(), entry.rule, entry.xml])?;
        }
    }
    Ok(table)
}
