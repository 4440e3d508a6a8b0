//! 通用表格结构：列名 + 字符串行，交给导出端写出

use serde_json::{Map, Value};

use crate::error::{AkError, AkResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// 追加一行，列数必须与表头一致
    pub fn push_row(&mut self, row: Vec<String>) -> AkResult<()> {
        if row.len() != self.columns.len() {
            return Err(AkError::InvalidInput(format!(
                "行列数 {} 与表头列数 {} 不一致",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按列名取整列
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[pos].as_str()).collect())
    }

    /// 转为 JSON 对象数组（键顺序由 serde_json::Map 决定）
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), Value::String(cell.clone())))
                    .collect();
                Value::Object(record)
            })
            .collect()
    }
}
