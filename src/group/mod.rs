//! 分组模块：分组记录模型、索引、路径构建、层级拆分与汇总
pub mod model;
pub mod index;
pub mod path;
pub mod level;
pub mod summary;

// 导出核心接口
pub use self::model::{GroupRecord, parse_groups};
pub use self::index::TreeIndex;
pub use self::path::{ParentChain, ParentStep, PathBuilder, PATH_SEPARATOR};
pub use self::level::{LevelColumns, level_count, level_value, split_levels};
pub use self::summary::{GroupSummary, GroupSummaryRow};
