//! 配置数据源模块：PAPI 接口（HTTP）与本地保存的 JSON 响应
pub mod http;
pub mod file;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AkResult;
use crate::group::GroupRecord;
use crate::ruletree::RuleTreeDocument;

// 导出核心接口
pub use self::http::HttpSource;
pub use self::file::FileSource;

/// 账户配置数据源
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// 账户下全部分组（父指针扁平列表）
    async fn groups(&self) -> AkResult<Vec<GroupRecord>>;

    /// 属性指定版本的规则树
    async fn rule_tree(&self, property_id: &str, version: u32) -> AkResult<RuleTreeDocument>;

    /// 自定义行为 XML，不存在时返回 None
    async fn custom_behavior(&self, behavior_id: &str) -> AkResult<Option<String>>;

    /// 按属性名检索属性ID与激活版本，未找到时返回 None
    async fn find_property(&self, property_name: &str) -> AkResult<Option<PropertyRef>>;
}

const ACTIVE: &str = "ACTIVE";

/// 属性版本检索条目（search/find-by-value 响应的 versions.items[]）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyVersionItem {
    #[serde(deserialize_with = "crate::group::model::deserialize_id")]
    pub property_id: String,
    #[serde(default)]
    pub property_name: String,
    pub property_version: u32,
    #[serde(default)]
    pub staging_status: Option<String>,
    #[serde(default)]
    pub production_status: Option<String>,
}

/// 属性定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub property_id: String,
    pub property_name: String,
    pub staging_version: u32,
    pub production_version: u32,
}

impl PropertyRef {
    /// 由检索条目确定激活版本
    /// 无 ACTIVE 版本时取最大版本号；仅一个条目时两个网络均取该版本
    pub fn from_versions(items: &[PropertyVersionItem]) -> Option<Self> {
        let first = items.first()?;
        let latest = items.iter().map(|i| i.property_version).max().unwrap_or(first.property_version);
        let active = |production: bool| {
            items
                .iter()
                .filter(|i| {
                    let status = if production { &i.production_status } else { &i.staging_status };
                    status.as_deref() == Some(ACTIVE)
                })
                .map(|i| i.property_version)
                .max()
        };

        let (staging_version, production_version) = if items.len() == 1 {
            (first.property_version, first.property_version)
        } else {
            (
                active(false).unwrap_or(latest),
                active(true).unwrap_or(latest),
            )
        };

        Some(Self {
            property_id: first.property_id.clone(),
            property_name: first.property_name.clone(),
            staging_version,
            production_version,
        })
    }
}

/// 解析属性版本检索结果，兼容 {"versions": {"items": [...]}} 外壳与裸数组
pub fn parse_property_versions(value: Value) -> serde_json::Result<Vec<PropertyVersionItem>> {
    match value {
        Value::Object(mut map) => {
            let items = map
                .remove("versions")
                .and_then(|mut v| v.get_mut("items").map(Value::take))
                .unwrap_or(Value::Array(Vec::new()));
            serde_json::from_value(items)
        }
        other => serde_json::from_value(other),
    }
}

/// 自定义行为条目（customBehaviors.items[]）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBehaviorItem {
    pub behavior_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub xml: Option<String>,
}

/// 解析自定义行为列表，兼容 {"customBehaviors": {"items": [...]}} 外壳与裸数组
pub fn parse_custom_behaviors(value: Value) -> serde_json::Result<Vec<CustomBehaviorItem>> {
    match value {
        Value::Object(mut map) => {
            let items = map
                .remove("customBehaviors")
                .and_then(|mut v| v.get_mut("items").map(Value::take))
                .unwrap_or(Value::Array(Vec::new()));
            serde_json::from_value(items)
        }
        other => serde_json::from_value(other),
    }
}
