//! 路径层级拆分：将 "A > B > C" 拆为 L0/L1/L2 列

use super::path::PATH_SEPARATOR;

/// 拆分路径为各层级名称
pub fn split_levels(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR).collect()
}

/// 层级数 = 分隔符数 + 1
pub fn level_count(path: &str) -> usize {
    path.matches(PATH_SEPARATOR).count() + 1
}

/// 第 n 层名称，不存在时为空字符串
pub fn level_value(path: &str, level: usize) -> &str {
    path.split(PATH_SEPARATOR).nth(level).unwrap_or("")
}

/// 整批路径的层级列（稀疏列按最大层级数补齐）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelColumns {
    max_levels: usize,
    rows: Vec<Vec<String>>,
}

impl LevelColumns {
    pub fn from_paths<'p, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'p str>,
    {
        Self::from_levels(paths.into_iter().map(split_levels))
    }

    /// 由已拆分的层级名称构建（名称内含分隔符时不会被再次拆分）
    pub fn from_levels<'p, I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Vec<&'p str>>,
    {
        let split: Vec<Vec<&str>> = levels.into_iter().collect();
        let max_levels = split.iter().map(Vec::len).max().unwrap_or(0);

        let rows = split
            .into_iter()
            .map(|levels| {
                let mut row: Vec<String> = levels.into_iter().map(str::to_string).collect();
                row.resize(max_levels, String::new());
                row
            })
            .collect();

        Self { max_levels, rows }
    }

    /// 列名 L0..L{max-1}
    pub fn column_names(&self) -> Vec<String> {
        (0..self.max_levels).map(|level| format!("L{}", level)).collect()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn row(&self, pos: usize) -> Option<&[String]> {
        self.rows.get(pos).map(Vec::as_slice)
    }

    /// 单列取值（按行顺序）
    pub fn column(&self, level: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(level).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
