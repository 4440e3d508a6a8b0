//! aksummary - Akamai 账户分组层级汇总与规则树扁平化工具

// 导出全局错误类型
pub use self::error::{AkError, AkResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, ExportConfig, GlobalConfig, DEFAULT_MAX_GROUP_DEPTH};

// 导出分组模块核心接口
pub use self::group::{
    GroupRecord, GroupSummary, GroupSummaryRow, LevelColumns, ParentChain, ParentStep,
    PathBuilder, TreeIndex, PATH_SEPARATOR, parse_groups,
};

// 导出规则树模块核心接口
pub use self::ruletree::{
    AdvancedXml, BehaviorInspector, CustomBehaviorLookup, FlatRow, Flattener, ItemKind, NoCustomBehaviors,
    Occurrence, Payload, RuleItem, RuleNode, RuleTreeDocument, RuleTreeWalker,
    parse_rule_tree, parse_rule_tree_document,
};

// 导出数据源与导出端
pub use self::source::{ConfigSource, FileSource, HttpSource, PropertyRef, PropertyVersionItem};
pub use self::export::{ConsoleSink, JsonFileSink, MemorySink, Table, TableSink};

// 导出编排接口
pub use self::report::{AccountReporter, PropertyReport, PropertyTarget};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod group;
pub mod ruletree;
pub mod source;
pub mod export;
pub mod report;
pub mod utils;
