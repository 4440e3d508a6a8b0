//! 导出模块：表格结构与导出端（JSON 文件 / 控制台 / 内存）
pub mod table;
pub mod sink;

// 导出核心接口
pub use self::table::Table;
pub use self::sink::{ConsoleSink, JsonFileSink, MemorySink, TableSink, render_table};
