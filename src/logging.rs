// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 级别由 RUST_LOG 控制，输出格式由 IMS_OVERRIDE_LOG_FORMAT 控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量（text / json）
pub const LOG_FORMAT_ENV: &str = "IMS_OVERRIDE_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// 单行 JSON，便于设备侧 logcat 采集后解析
    Json,
}

impl LogFormat {
    /// 解析格式名称；无法识别时为 Text
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=ims_override::privileged=debug
/// - IMS_OVERRIDE_LOG_FORMAT: text（默认）或 json
///
/// 重复初始化时静默忽略（宿主进程可能已安装 subscriber）。
///
/// # 示例
/// ```no_run
/// use ims_override::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

pub fn init_with(format: LogFormat) {
    let result = match format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter())
            .with_current_span(true)
            .with_target(true)
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("日志系统已初始化，跳过");
    }
}

/// 测试环境日志（debug 级别，输出到测试捕获）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
