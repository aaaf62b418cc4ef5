// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 命令行开关: 以 JSON 格式输出日志
pub const JSON_LOGS_FLAG: &str = "--json-logs";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 从命令行参数中取出日志格式开关
///
/// 开关可出现在任意位置，返回的参数列表已去除开关
pub fn take_log_format(args: Vec<String>) -> (LogFormat, Vec<String>) {
    let (flags, rest): (Vec<String>, Vec<String>) =
        args.into_iter().partition(|arg| arg == JSON_LOGS_FLAG);

    let format = if flags.is_empty() {
        LogFormat::Text
    } else {
        LogFormat::Json
    };
    (format, rest)
}

/// 按指定格式初始化日志系统
pub fn init_with_format(format: LogFormat) {
    match format {
        LogFormat::Text => init(),
        LogFormat::Json => init_json(),
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=curriculum_engine=trace
///
/// # 示例
/// ```no_run
/// use curriculum_engine::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 以 JSON 格式初始化日志（供服务端采集）
pub fn init_json() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试；重复调用是安全的
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
