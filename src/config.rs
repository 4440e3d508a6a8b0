//! 全局配置管理,存储所有可配置项

/// 父链遍历默认最大深度
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 64;

/// 导出格式配置（替代全局表格显示选项）
#[derive(Debug, Clone)]
pub struct ExportConfig {
    // JSON 输出是否美化
    pub pretty: bool,
    // 控制台预览单元格最大宽度（字符数）
    pub max_cell_width: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            max_cell_width: 60,
        }
    }
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // PAPI 接口根地址
    pub api_base_url: String,
    // 账户切换键（可选）
    pub account_switch_key: Option<String>,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 分组父链最大深度
    pub max_group_depth: usize,
    // 是否启用详细日志
    pub verbose: bool,
    pub export: ExportConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://localhost/".to_string(),
            account_switch_key: None,
            http_timeout: 30,
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            verbose: false,
            export: ExportConfig::default(),
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn api_base_url(mut self, url: String) -> Self {
        self.config.api_base_url = url;
        self
    }

    pub fn account_switch_key(mut self, key: Option<String>) -> Self {
        self.config.account_switch_key = key;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// 深度至少为 1
    pub fn max_group_depth(mut self, depth: usize) -> Self {
        self.config.max_group_depth = depth.max(1);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.export.pretty = pretty;
        self
    }

    pub fn max_cell_width(mut self, width: usize) -> Self {
        self.config.export.max_cell_width = width;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
