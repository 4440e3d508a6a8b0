//! 汇总编排模块
pub mod reporter;
pub mod tables;

// 导出核心接口
pub use self::reporter::{
    AccountReporter, PropertyReport, PropertyTarget, ADVANCED_TABLE, BEHAVIORS_TABLE, GROUPS_TABLE,
    RULES_TABLE,
};
pub use self::tables::{LoadedProperty, advanced_table, behavior_table};
