//! 导出端实现
//! 表格渲染细节（如电子表格样式）不在此处理，只负责把行写到目标位置

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use crate::utils::log::debug;

use super::table::Table;
use crate::config::ExportConfig;
use crate::error::{AkError, AkResult};
use crate::utils::{preview_compact, preview_width};

/// 导出端接口
#[async_trait]
pub trait TableSink: Send {
    async fn write_table(&mut self, name: &str, table: &Table) -> AkResult<()>;
}

/// JSON 文件导出：每张表写为 `{目录}/{表名}.json`（对象数组）
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output_dir: PathBuf,
    config: ExportConfig,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>, config: ExportConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", sanitize_file_name(name)))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl TableSink for JsonFileSink {
    async fn write_table(&mut self, name: &str, table: &Table) -> AkResult<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let records = Value::Array(table.to_records());
        let data = if self.config.pretty {
            serde_json::to_vec_pretty(&records)?
        } else {
            serde_json::to_vec(&records)?
        };

        let path = self.table_path(name);
        tokio::fs::write(&path, data).await?;
        debug!("表格 [{}] 已写入 {}，行数：{}", name, path.display(), table.len());
        Ok(())
    }
}

/// 控制台预览导出
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    config: ExportConfig,
}

impl ConsoleSink {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TableSink for ConsoleSink {
    async fn write_table(&mut self, name: &str, table: &Table) -> AkResult<()> {
        println!("{}", render_table(name, table, &self.config));
        Ok(())
    }
}

/// 渲染为对齐的纯文本表格（单元格按 `max_cell_width` 截断）
pub fn render_table(name: &str, table: &Table, config: &ExportConfig) -> String {
    let max = config.max_cell_width.max(1);
    let mut widths: Vec<usize> = table.columns().iter().map(|c| preview_width(c, max)).collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(preview_width(cell, max));
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "== {} ({} rows)", name, table.len());
    render_line(&mut out, table.columns(), &widths, max);
    for row in table.rows() {
        render_line(&mut out, row, &widths, max);
    }
    out
}

fn render_line(out: &mut String, cells: &[String], widths: &[usize], max: usize) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let text = preview_compact(cell, max).to_string();
            let pad = width.saturating_sub(text.chars().count());
            format!("{}{}", text, " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// 内存导出端（测试使用）
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Vec<(String, Table)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[(String, Table)] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn write_table(&mut self, name: &str, table: &Table) -> AkResult<()> {
        if name.trim().is_empty() {
            return Err(AkError::InvalidInput("表名不能为空".to_string()));
        }
        self.tables.push((name.to_string(), table.clone()));
        Ok(())
    }
}

// 文件名中不允许的字符替换为下划线
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}
