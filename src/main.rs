//! aksummary 命令行入口
//!
//! aksummary groups --groups-file groups.json
//! aksummary rules --rules-file rules.json --property www.example.com --output out/
//! aksummary rules --base-url https://gateway.example.com --property www.example.com --count-behavior caching

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use aksummary::{
    AccountReporter, ConfigManager, ConfigSource, ConsoleSink, FileSource, GlobalConfig, HttpSource,
    JsonFileSink, PropertyTarget, TableSink,
};

const LOCAL_PROPERTY_ID: &str = "local";

#[derive(Debug, Parser)]
#[command(name = "aksummary", version, about = "Akamai 账户分组汇总与规则树扁平化")]
struct Cli {
    /// HTTP 超时（秒）
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// 输出调试日志（RUST_LOG 优先）
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 分组层级汇总
    Groups {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 属性规则树扁平化
    Rules {
        /// 属性名；未给出 ID 或版本时按名称检索（缺省取规则树响应中的 propertyName）
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        property_id: Option<String>,
        /// 属性版本（按名称检索时缺省取生产网络激活版本）
        #[arg(long)]
        version: Option<u32>,
        /// 需要单独计数的行为名，可重复
        #[arg(long = "count-behavior")]
        count_behavior: Vec<String>,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// PAPI 网关地址（指定后走 HTTP）
    #[arg(long, conflicts_with_all = ["groups_file", "rules_file", "custom_behaviors_file", "search_file"])]
    base_url: Option<String>,
    #[arg(long)]
    groups_file: Option<PathBuf>,
    #[arg(long)]
    rules_file: Option<PathBuf>,
    #[arg(long)]
    custom_behaviors_file: Option<PathBuf>,
    /// 保存的 search/find-by-value 响应，用于按属性名定位
    #[arg(long)]
    search_file: Option<PathBuf>,
    #[arg(long)]
    account_switch_key: Option<String>,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// JSON 输出目录（缺省打印到控制台）
    #[arg(long)]
    output: Option<PathBuf>,
    /// 紧凑 JSON
    #[arg(long)]
    compact: bool,
    /// 控制台单元格最大宽度
    #[arg(long, default_value_t = 60)]
    max_cell_width: usize,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "aksummary=debug" } else { "aksummary=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn build_config(cli: &Cli, source: &SourceArgs, output: &OutputArgs) -> GlobalConfig {
    let mut builder = ConfigManager::custom()
        .http_timeout(cli.timeout)
        .verbose(cli.verbose)
        .account_switch_key(source.account_switch_key.clone())
        .pretty(!output.compact)
        .max_cell_width(output.max_cell_width);
    if let Some(url) = &source.base_url {
        builder = builder.api_base_url(url.clone());
    }
    builder.build()
}

fn build_source(args: &SourceArgs, config: &GlobalConfig) -> Result<Arc<dyn ConfigSource>> {
    if args.base_url.is_some() {
        let source = HttpSource::new(config).context("初始化 HTTP 数据源失败")?;
        return Ok(Arc::new(source));
    }

    let mut source = FileSource::new();
    if let Some(path) = &args.groups_file {
        source = source.groups_file(path);
    }
    if let Some(path) = &args.rules_file {
        source = source.rules_file(path);
    }
    if let Some(path) = &args.custom_behaviors_file {
        source = source.custom_behaviors_file(path);
    }
    if let Some(path) = &args.search_file {
        source = source.search_file(path);
    }
    Ok(Arc::new(source))
}

fn build_sink(output: &OutputArgs, config: &GlobalConfig) -> Box<dyn TableSink> {
    match &output.output {
        Some(dir) => Box::new(JsonFileSink::new(dir, config.export.clone())),
        None => Box::new(ConsoleSink::new(config.export.clone())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Groups { source, output } => {
            if source.base_url.is_none() && source.groups_file.is_none() {
                bail!("需要指定 --base-url 或 --groups-file");
            }
            let config = build_config(&cli, source, output);
            let reporter = AccountReporter::new(build_source(source, &config)?, config.clone());
            let mut sink = build_sink(output, &config);

            let summary = reporter
                .export_groups(sink.as_mut())
                .await
                .context("分组汇总失败")?;
            info!("输出分组 {} 行，层级列 {} 个", summary.rows().len(), summary.level_names().len());
        }
        Command::Rules { property, property_id, version, count_behavior, source, output } => {
            if source.base_url.is_none() && source.rules_file.is_none() {
                bail!("需要指定 --base-url 或 --rules-file");
            }
            let config = build_config(&cli, source, output);
            let reporter = AccountReporter::new(build_source(source, &config)?, config.clone());
            let mut sink = build_sink(output, &config);

            let searchable = source.base_url.is_some() || source.search_file.is_some();
            let target = match property {
                Some(name) if searchable => reporter
                    .resolve_target(name, property_id.as_deref(), *version)
                    .await
                    .with_context(|| format!("定位属性失败：{}", name))?,
                _ => {
                    if source.base_url.is_some() && (property_id.is_none() || version.is_none()) {
                        bail!("HTTP 数据源需要 --property，或同时指定 --property-id 与 --version");
                    }
                    // 本地规则树文件只含一个版本，ID 与版本仅用于标注
                    let mut target = PropertyTarget::new(
                        property_id.as_deref().unwrap_or(LOCAL_PROPERTY_ID),
                        version.unwrap_or(1),
                    );
                    if let Some(name) = property {
                        target = target.named(name);
                    }
                    target
                }
            };

            let report = reporter
                .export_rules(std::slice::from_ref(&target), count_behavior, sink.as_mut())
                .await
                .with_context(|| format!("规则树扁平化失败：{} v{}", target.property_id, target.version))?;
            info!(
                "输出规则树 {} 行，高级 XML {} 条",
                report.rows.len(),
                report.advanced.len()
            );
        }
    }

    Ok(())
}
