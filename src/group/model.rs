//! 分组数据模型定义
//! 仅存储接口返回的分组记录，支持字符串/整数两种ID格式

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 账户分组记录（来自 /papi/v1/groups）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub group_id: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id", skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub contract_ids: Vec<String>,
}

impl GroupRecord {
    /// 快速构造（测试与内存数据源使用）
    pub fn new(group_id: &str, group_name: &str, parent_group_id: Option<&str>) -> Self {
        Self {
            group_id: group_id.to_string(),
            group_name: group_name.to_string(),
            parent_group_id: parent_group_id.map(str::to_string),
            contract_ids: Vec::new(),
        }
    }

    pub fn with_contracts(mut self, contracts: &[&str]) -> Self {
        self.contract_ids = contracts.iter().map(|c| c.to_string()).collect();
        self
    }

    /// 父ID（空字符串视为根）
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_group_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// 分组接口响应外壳：{"groups": {"items": [...]}}
#[derive(Debug, Deserialize)]
struct GroupsEnvelope {
    groups: GroupItems,
}

#[derive(Debug, Deserialize)]
struct GroupItems {
    items: Vec<GroupRecord>,
}

/// 解析分组列表，兼容接口外壳与裸数组
pub fn parse_groups(value: Value) -> serde_json::Result<Vec<GroupRecord>> {
    if value.is_array() {
        return serde_json::from_value(value);
    }
    let envelope: GroupsEnvelope = serde_json::from_value(value)?;
    Ok(envelope.groups.items)
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("groupId 必须为字符串或整数"))
}

// null / 缺失 / 空字符串 均视为无父分组
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(value).filter(|id| !id.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope_with_mixed_id_types() {
        let value = json!({
            "groups": {
                "items": [
                    {"groupId": "grp_1", "groupName": "Root", "contractIds": ["ctr_A"]},
                    {"groupId": 22, "groupName": "Child", "parentGroupId": 1, "contractIds": []}
                ]
            }
        });

        let groups = parse_groups(value).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "grp_1");
        assert_eq!(groups[0].parent_group_id, None);
        assert_eq!(groups[1].group_id, "22");
        assert_eq!(groups[1].parent_id(), Some("1"));
    }

    #[test]
    fn test_parse_bare_array_with_null_and_empty_parent() {
        let value = json!([
            {"groupId": "1", "groupName": "A", "parentGroupId": null},
            {"groupId": "2", "groupName": "B", "parentGroupId": ""}
        ]);

        let groups = parse_groups(value).unwrap();
        assert!(groups.iter().all(|g| g.parent_id().is_none()));
    }

    #[test]
    fn test_reject_object_group_id() {
        let value = json!([{"groupId": {"id": 1}, "groupName": "A"}]);
        assert!(parse_groups(value).is_err());
    }
}
