//! 账户分组汇总
//! 整合索引、路径、层级拆分，输出按合同拆行的分组表

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::utils::log::debug;

use super::index::TreeIndex;
use super::level::LevelColumns;
use super::model::GroupRecord;
use super::path::{PathBuilder, PATH_SEPARATOR};
use crate::error::AkResult;
use crate::export::Table;
use crate::utils::compare_numeric_first;

/// 分组汇总行（一行对应一个 分组 x 合同）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummaryRow {
    pub path: String,
    pub levels: Vec<String>,
    pub group_id: String,
    pub group_name: String,
    pub parent_group_id: Option<String>,
    pub contract_id: String,
    /// 同一路径出现在多行时追加 `_合同ID` 以区分
    pub group_structure: String,
}

#[derive(Debug, Clone, Default)]
pub struct GroupSummary {
    level_names: Vec<String>,
    rows: Vec<GroupSummaryRow>,
}

impl GroupSummary {
    pub fn build(records: &[GroupRecord], builder: &PathBuilder) -> AkResult<Self> {
        let index = TreeIndex::new(records)?;

        // 层级列取自祖先链，分组名内含 " > " 时不会多拆出层级
        let chains = records
            .iter()
            .map(|record| builder.build_levels(record, &index))
            .collect::<AkResult<Vec<_>>>()?;
        let paths: Vec<String> = chains.iter().map(|names| names.join(PATH_SEPARATOR)).collect();
        let levels = LevelColumns::from_levels(chains);
        let level_names = levels.column_names();

        let mut entries: Vec<(&GroupRecord, String, Vec<String>)> = records
            .iter()
            .zip(paths)
            .zip(levels.into_rows())
            .map(|((record, path), levels)| (record, path, levels))
            .collect();
        entries.sort_by(|a, b| compare_entries((a.0, a.2.as_slice()), (b.0, b.2.as_slice())));

        let mut rows = Vec::with_capacity(entries.len());
        for (record, path, levels) in entries {
            let contracts: Vec<String> = if record.contract_ids.is_empty() {
                vec![String::new()]
            } else {
                record.contract_ids.clone()
            };
            for contract_id in contracts {
                rows.push(GroupSummaryRow {
                    path: path.clone(),
                    levels: levels.clone(),
                    group_id: record.group_id.clone(),
                    group_name: record.group_name.clone(),
                    parent_group_id: record.parent_id().map(str::to_string),
                    contract_id,
                    group_structure: String::new(),
                });
            }
        }

        let mut path_counts: HashMap<String, usize> = HashMap::new();
        for row in &rows {
            *path_counts.entry(row.path.clone()).or_default() += 1;
        }
        for row in &mut rows {
            let shared = path_counts.get(&row.path).copied().unwrap_or(0) > 1;
            row.group_structure = if shared && !row.contract_id.is_empty() {
                format!("{}_{}", row.path, row.contract_id)
            } else {
                row.path.clone()
            };
        }

        debug!(
            "分组汇总完成，分组数：{}，输出行数：{}，最大层级：{}",
            records.len(),
            rows.len(),
            level_names.len()
        );

        Ok(Self { level_names, rows })
    }

    pub fn rows(&self) -> &[GroupSummaryRow] {
        &self.rows
    }

    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    /// 列：path, L0..Ln, groupId, parentGroupId, contractId, groupName, groupStructure
    pub fn to_table(&self) -> AkResult<Table> {
        let mut columns = vec!["path".to_string()];
        columns.extend(self.level_names.iter().cloned());
        columns.extend(
            ["groupId", "parentGroupId", "contractId", "groupName", "groupStructure"]
                .iter()
                .map(|c| c.to_string()),
        );

        let mut table = Table::new(columns);
        for row in &self.rows {
            let mut cells = vec![row.path.clone()];
            cells.extend(row.levels.iter().cloned());
            cells.push(row.group_id.clone());
            cells.push(row.parent_group_id.clone().unwrap_or_default());
            cells.push(row.contract_id.clone());
            cells.push(row.group_name.clone());
            cells.push(row.group_structure.clone());
            table.push_row(cells)?;
        }
        Ok(table)
    }
}

// 排序：L0(小写) -> parentGroupId(根为0) -> L1 -> groupId
fn compare_entries(a: (&GroupRecord, &[String]), b: (&GroupRecord, &[String])) -> Ordering {
    let level = |levels: &[String], pos: usize| levels.get(pos).cloned().unwrap_or_default();

    level(a.1, 0)
        .to_lowercase()
        .cmp(&level(b.1, 0).to_lowercase())
        .then_with(|| compare_numeric_first(a.0.parent_id().unwrap_or("0"), b.0.parent_id().unwrap_or("0")))
        .then_with(|| level(a.1, 1).cmp(&level(b.1, 1)))
        .then_with(|| compare_numeric_first(&a.0.group_id, &b.0.group_id))
}
