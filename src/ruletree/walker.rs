//! 规则树遍历器
//! 深度优先前序遍历规则树，收集携带路径上下文的行为/条件列表
//!
//! 路径规则：
//! 1. 节点路径 = `{上级路径} {节点名}`（去除首尾空白），`default default` 折叠为 `default`
//! 2. 节点有多个子节点时，第 i 个子节点的上级路径为 `{节点路径} [  i] >`
//! 3. 相同路径只保留首次出现的条目列表

use std::collections::HashSet;

use crate::utils::log::debug;

use super::model::{ItemKind, RuleItem, RuleNode};
use crate::error::{AkError, AkResult};

/// 一处带路径的条目列表
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    pub path: String,
    pub items: &'a [RuleItem],
}

/// 遍历累加器（显式传递，不依赖闭包捕获的可变状态）
#[derive(Debug, Default)]
struct WalkState<'a> {
    visited_paths: HashSet<String>,
    occurrences: Vec<Occurrence<'a>>,
    dropped: usize,
}

impl<'a> WalkState<'a> {
    fn record(&mut self, path: &str, items: &'a [RuleItem]) {
        if self.visited_paths.insert(path.to_string()) {
            self.occurrences.push(Occurrence {
                path: path.to_string(),
                items,
            });
        } else {
            debug!("路径重复，保留首次出现的条目：{}", path);
            self.dropped += 1;
        }
    }
}

/// 兄弟序号标注，如 `[  2] >`
pub fn sibling_marker(position: usize) -> String {
    format!("[{:>3}] >", position)
}

/// 拼接节点路径并做 `default default` 折叠
pub fn join_path(ongoing: &str, name: &str) -> String {
    format!("{} {}", ongoing, name)
        .trim()
        .replace("default default", "default")
}

pub struct RuleTreeWalker;

impl RuleTreeWalker {
    /// 遍历规则树，返回所有 (路径, 条目列表)，顺序与遍历顺序一致
    pub fn walk(root: &RuleNode, kind: ItemKind) -> AkResult<Vec<Occurrence<'_>>> {
        let mut state = WalkState::default();
        Self::visit(root, "", "<root>", kind, &mut state)?;

        debug!(
            "规则树遍历完成，类型：{}，输出路径数：{}，重复丢弃：{}",
            kind,
            state.occurrences.len(),
            state.dropped
        );
        Ok(state.occurrences)
    }

    fn visit<'a>(
        node: &'a RuleNode,
        ongoing: &str,
        location: &str,
        kind: ItemKind,
        state: &mut WalkState<'a>,
    ) -> AkResult<()> {
        // 空白名称与缺失同等处理，否则路径段为空会与上级路径重合
        let name = match node.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ if node.has_content() => {
                return Err(AkError::MalformedTree(format!(
                    "规则节点缺少 name 字段，位置：{}",
                    location
                )));
            }
            // 空叶子节点：无可输出内容
            _ => return Ok(()),
        };

        let current = join_path(ongoing, name);

        let items = node.items(kind);
        if !items.is_empty() {
            state.record(&current, items);
        }

        let multiple = node.children.len() > 1;
        for (pos, child) in node.children.iter().enumerate() {
            let child_ongoing = if multiple {
                format!("{} {}", current, sibling_marker(pos + 1))
            } else {
                current.clone()
            };
            // 与路径标注一致，序号从 1 开始
            let child_location = format!("{} -> children[{}]", current, pos + 1);
            Self::visit(child, &child_ongoing, &child_location, kind, state)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn behavior(name: &str) -> RuleItem {
        RuleItem::new(name, json!({}))
    }

    fn paths(occurrences: &[Occurrence<'_>]) -> Vec<String> {
        occurrences.iter().map(|o| o.path.clone()).collect()
    }

    #[test]
    fn test_default_default_collapses() {
        let tree = RuleNode::named("default")
            .with_children(vec![RuleNode::named("default").with_behaviors(vec![behavior("cpCode")])]);

        let occurrences = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        assert_eq!(paths(&occurrences), vec!["default"]);
        assert_eq!(occurrences[0].items[0].name, "cpCode");
    }

    #[test]
    fn test_sibling_markers_and_preorder() {
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("origin")])
            .with_children(vec![
                RuleNode::named("Performance")
                    .with_behaviors(vec![behavior("caching")])
                    .with_children(vec![RuleNode::named("Compressible").with_behaviors(vec![behavior("gzipResponse")])]),
                RuleNode::named("Offload").with_behaviors(vec![behavior("downstreamCache")]),
            ]);

        let occurrences = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        assert_eq!(
            paths(&occurrences),
            vec![
                "default",
                "default [  1] > Performance",
                "default [  1] > Performance Compressible",
                "default [  2] > Offload",
            ]
        );
    }

    #[test]
    fn test_nodes_without_items_are_traversed() {
        let tree = RuleNode::named("default").with_children(vec![
            RuleNode::named("Empty").with_children(vec![
                RuleNode::named("Deep").with_criteria(vec![behavior("path")]),
            ]),
            RuleNode::named("Other"),
        ]);

        let criteria = RuleTreeWalker::walk(&tree, ItemKind::Criteria).unwrap();
        assert_eq!(paths(&criteria), vec!["default [  1] > Empty Deep"]);
        assert!(RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap().is_empty());
    }

    #[test]
    fn test_first_occurrence_wins_on_colliding_paths() {
        // 父子同名 default 折叠后路径相同，只保留父节点的条目
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("first")])
            .with_children(vec![RuleNode::named("default").with_behaviors(vec![behavior("second")])]);

        let occurrences = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].items[0].name, "first");
    }

    #[test]
    fn test_collisions_resolved_per_sibling_branch() {
        let branch = |inner: &str| {
            RuleNode::named("default")
                .with_behaviors(vec![behavior(&format!("{}-outer", inner))])
                .with_children(vec![RuleNode::named("default").with_behaviors(vec![behavior(inner)])])
        };
        let tree = RuleNode::named("root").with_children(vec![branch("a"), branch("b")]);

        let occurrences = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        assert_eq!(paths(&occurrences), vec!["root [  1] > default", "root [  2] > default"]);
        assert_eq!(occurrences[0].items[0].name, "a-outer");
        assert_eq!(occurrences[1].items[0].name, "b-outer");
    }

    #[test]
    fn test_walk_is_idempotent() {
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("origin")])
            .with_children(vec![
                RuleNode::named("A").with_behaviors(vec![behavior("x")]),
                RuleNode::named("A").with_behaviors(vec![behavior("y")]),
            ]);

        let first = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        let second = RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_name_with_children_fails_fast() {
        let tree = RuleNode::named("default").with_children(vec![RuleNode {
            name: None,
            children: vec![RuleNode::named("Inner")],
            ..RuleNode::default()
        }]);

        match RuleTreeWalker::walk(&tree, ItemKind::Behavior) {
            Err(AkError::MalformedTree(msg)) => assert!(msg.contains("default -> children[1]")),
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_name_with_content_fails_fast() {
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("origin")])
            .with_children(vec![RuleNode::named("").with_behaviors(vec![behavior("caching")])]);

        match RuleTreeWalker::walk(&tree, ItemKind::Behavior) {
            Err(AkError::MalformedTree(msg)) => assert!(msg.contains("default -> children[1]")),
            other => panic!("expected MalformedTree, got {:?}", other),
        }

        let spaced = RuleNode::named("default").with_children(vec![
            RuleNode::named("A"),
            RuleNode::named("  ").with_criteria(vec![behavior("path")]),
        ]);
        match RuleTreeWalker::walk(&spaced, ItemKind::Criteria) {
            Err(AkError::MalformedTree(msg)) => assert!(msg.contains("default -> children[2]")),
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_named_empty_leaf_is_skipped() {
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("origin")])
            .with_children(vec![RuleNode::named("")]);

        assert_eq!(paths(&RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap()), vec!["default"]);
    }

    #[test]
    fn test_nameless_empty_leaf_is_skipped() {
        let tree = RuleNode::named("default")
            .with_behaviors(vec![behavior("origin")])
            .with_children(vec![RuleNode::default()]);

        assert_eq!(RuleTreeWalker::walk(&tree, ItemKind::Behavior).unwrap().len(), 1);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(sibling_marker(12), "[ 12] >");
        assert_eq!(join_path("", "default"), "default");
        assert_eq!(join_path("default [  1] >", "Images"), "default [  1] > Images");
    }
}
