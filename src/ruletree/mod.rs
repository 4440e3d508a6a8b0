//! 规则树模块：数据模型、遍历、扁平化与行为检查
pub mod model;
pub mod walker;
pub mod flattener;
pub mod inspector;

// 导出核心接口
pub use self::model::{ItemKind, RuleItem, RuleNode, RuleTreeDocument, parse_rule_tree, parse_rule_tree_document};
pub use self::walker::{Occurrence, RuleTreeWalker, join_path, sibling_marker};
pub use self::flattener::{
    CustomBehaviorLookup, FlatRow, Flattener, NoCustomBehaviors, Payload,
    ADVANCED_BEHAVIOR, ADVANCED_MATCH, CUSTOM_BEHAVIOR,
};
pub use self::inspector::{AdvancedXml, BehaviorInspector};
