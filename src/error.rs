//! 全局错误类型定义

use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum AkError {
    // 结构性错误（致命，中止整个汇总）
    #[error("规则树结构异常：{0}")]
    MalformedTree(String),
    #[error("分组父链超过最大深度 {max_depth}，疑似存在环：groupId={group_id}")]
    CycleDetected { group_id: String, max_depth: usize },
    #[error("分组ID重复：{0}")]
    DuplicateKey(String),

    // 辅助数据解析失败（非致命，降级为空载荷）
    #[error("自定义行为无法解析：behaviorId={0}")]
    UnresolvedReference(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL {url} 返回状态码 {status}")]
    HttpStatus { url: String, status: u16 },

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl AkError {
    /// 是否为结构性错误（环、重复键、畸形节点）
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AkError::MalformedTree(_) | AkError::CycleDetected { .. } | AkError::DuplicateKey(_)
        )
    }
}

// 全局Result类型
pub type AkResult<T> = Result<T, AkError>;
