//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅者
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 `debug` / `info`。
/// 重复调用是安全的（测试中多次初始化时只有第一次生效）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
