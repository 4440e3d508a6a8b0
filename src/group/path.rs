//! 分组路径构建
//! 沿父指针向上遍历到根，生成 "祖先 > ... > 自身" 形式的层级路径

use super::index::TreeIndex;
use super::model::GroupRecord;
use crate::config::DEFAULT_MAX_GROUP_DEPTH;
use crate::error::{AkError, AkResult};

/// 路径分隔符
pub const PATH_SEPARATOR: &str = " > ";

/// 父链单步结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParentStep<'a> {
    Resolved(&'a GroupRecord),
    Root,
    /// 超过深度上限，遍历中止
    CycleAborted,
}

/// 有界父链迭代器，按 自身父 -> 根 的顺序产出祖先
pub struct ParentChain<'i, 'a> {
    index: &'i TreeIndex<'a>,
    current: &'a GroupRecord,
    depth: usize,
    max_depth: usize,
    finished: bool,
}

impl<'i, 'a> ParentChain<'i, 'a> {
    pub fn new(index: &'i TreeIndex<'a>, start: &'a GroupRecord, max_depth: usize) -> Self {
        Self {
            index,
            current: start,
            depth: 0,
            max_depth,
            finished: false,
        }
    }
}

impl<'i, 'a> Iterator for ParentChain<'i, 'a> {
    type Item = ParentStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.index.resolve_parent(self.current) {
            None => {
                self.finished = true;
                Some(ParentStep::Root)
            }
            Some(_) if self.depth >= self.max_depth => {
                self.finished = true;
                Some(ParentStep::CycleAborted)
            }
            Some(parent) => {
                self.depth += 1;
                self.current = parent;
                Some(ParentStep::Resolved(parent))
            }
        }
    }
}

/// 路径构建器
#[derive(Debug, Clone, Copy)]
pub struct PathBuilder {
    max_depth: usize,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GROUP_DEPTH)
    }
}

impl PathBuilder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 单步解析父分组（不计深度）
    pub fn step<'a>(&self, record: &GroupRecord, index: &TreeIndex<'a>) -> ParentStep<'a> {
        match index.resolve_parent(record) {
            Some(parent) => ParentStep::Resolved(parent),
            None => ParentStep::Root,
        }
    }

    /// 祖先链上的各层名称（根在前）
    ///
    /// 父ID无法解析时按根处理。父链长度超过 `max_depth` 时返回 `CycleDetected`。
    pub fn build_levels<'a>(&self, record: &'a GroupRecord, index: &TreeIndex<'a>) -> AkResult<Vec<&'a str>> {
        let mut names = vec![record.group_name.as_str()];

        for step in ParentChain::new(index, record, self.max_depth) {
            match step {
                ParentStep::Resolved(parent) => names.push(parent.group_name.as_str()),
                ParentStep::Root => break,
                ParentStep::CycleAborted => {
                    return Err(AkError::CycleDetected {
                        group_id: record.group_id.clone(),
                        max_depth: self.max_depth,
                    });
                }
            }
        }

        names.reverse();
        Ok(names)
    }

    /// 构建层级路径
    ///
    /// 根分组的路径即自身名称，不输出截断路径。
    pub fn build_path<'a>(&self, record: &'a GroupRecord, index: &TreeIndex<'a>) -> AkResult<String> {
        Ok(self.build_levels(record, index)?.join(PATH_SEPARATOR))
    }
}
