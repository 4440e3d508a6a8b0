//! PAPI HTTP 数据源
//! 请求签名不在此处理，base_url 指向已鉴权的网关或代理

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use crate::utils::log::debug;
use url::Url;

use super::{ConfigSource, PropertyRef, parse_custom_behaviors, parse_property_versions};
use crate::config::GlobalConfig;
use crate::error::{AkError, AkResult};
use crate::group::{GroupRecord, parse_groups};
use crate::ruletree::{RuleTreeDocument, parse_rule_tree_document};

const PAPI_PREFIX: &str = "papi/v1";

/// PAPI 接口数据源
pub struct HttpSource {
    client: Client,
    base_url: Url,
    account_switch_key: Option<String>,
}

impl HttpSource {
    pub fn new(config: &GlobalConfig) -> AkResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        // 保证以 / 结尾，join 时保留网关路径前缀
        let mut base = config.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            account_switch_key: config.account_switch_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// 拼接接口地址（附带 accountSwitchKey）
    pub fn endpoint(&self, path: &str) -> AkResult<Url> {
        let mut url = self.base_url.join(&format!("{}/{}", PAPI_PREFIX, path.trim_start_matches('/')))?;
        if let Some(key) = &self.account_switch_key {
            url.query_pairs_mut().append_pair("accountSwitchKey", key);
        }
        Ok(url)
    }

    async fn get_json(&self, path: &str) -> AkResult<Value> {
        let url = self.endpoint(path)?;
        let request = self.client.get(url.clone());
        Self::send_json(request, &url).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> AkResult<Value> {
        let url = self.endpoint(path)?;
        let request = self.client.post(url.clone()).json(body);
        Self::send_json(request, &url).await
    }

    async fn send_json(request: RequestBuilder, url: &Url) -> AkResult<Value> {
        let response = request
            .header("PAPI-Use-Prefixes", "false")
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!("{:<50} {}", url.path(), status.as_u16());
        if !status.is_success() {
            return Err(AkError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ConfigSource for HttpSource {
    async fn groups(&self) -> AkResult<Vec<GroupRecord>> {
        let value = self.get_json("groups").await?;
        let groups = parse_groups(value)?;
        debug!("拉取分组完成，数量：{}", groups.len());
        Ok(groups)
    }

    async fn rule_tree(&self, property_id: &str, version: u32) -> AkResult<RuleTreeDocument> {
        let path = format!("properties/{}/versions/{}/rules", property_id.trim(), version);
        let value = self.get_json(&path).await?;
        Ok(parse_rule_tree_document(value)?)
    }

    async fn custom_behavior(&self, behavior_id: &str) -> AkResult<Option<String>> {
        let path = format!("custom-behaviors/{}", behavior_id.trim());
        let value = self.get_json(&path).await?;
        let items = parse_custom_behaviors(value)?;
        Ok(items.into_iter().find_map(|item| item.xml))
    }

    async fn find_property(&self, property_name: &str) -> AkResult<Option<PropertyRef>> {
        let body = json!({"propertyName": property_name.trim()});
        let value = self.post_json("search/find-by-value", &body).await?;
        let items = parse_property_versions(value)?;
        let found = PropertyRef::from_versions(&items);
        if let Some(found) = &found {
            debug!(
                "{:<40} {} staging:production v{}:v{}",
                property_name, found.property_id, found.staging_version, found.production_version
            );
        }
        Ok(found)
    }
}
