//! 分组索引：groupId -> 记录，解析父子关系

use std::collections::HashMap;

use super::model::GroupRecord;
use crate::error::{AkError, AkResult};

/// 分组索引（只读，借用原始记录）
#[derive(Debug)]
pub struct TreeIndex<'a> {
    records: &'a [GroupRecord],
    by_id: HashMap<&'a str, usize>,
}

impl<'a> TreeIndex<'a> {
    /// 构建索引，groupId 必须唯一
    pub fn new(records: &'a [GroupRecord]) -> AkResult<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if by_id.insert(record.group_id.as_str(), pos).is_some() {
                return Err(AkError::DuplicateKey(record.group_id.clone()));
            }
        }
        Ok(Self { records, by_id })
    }

    pub fn get(&self, group_id: &str) -> Option<&'a GroupRecord> {
        self.by_id.get(group_id).map(|&pos| &self.records[pos])
    }

    /// 解析父分组：无父ID、空父ID、父ID不存在均返回 None（按根处理）
    pub fn resolve_parent(&self, record: &GroupRecord) -> Option<&'a GroupRecord> {
        record.parent_id().and_then(|parent_id| self.get(parent_id))
    }

    /// 直接子分组（保持输入顺序）
    pub fn children_of(&self, group_id: &str) -> Vec<&'a GroupRecord> {
        self.records
            .iter()
            .filter(|record| record.parent_id() == Some(group_id))
            .collect()
    }

    /// 根分组（含父ID无法解析的孤儿）
    pub fn roots(&self) -> Vec<&'a GroupRecord> {
        self.records
            .iter()
            .filter(|record| self.resolve_parent(record).is_none())
            .collect()
    }

    pub fn records(&self) -> &'a [GroupRecord] {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
