//! 日志初始化：宿主进程或测试入口调用一次

use tracing_subscriber::fmt::SubscriberBuilder;

/// 初始化INFO级别的fmt订阅器
///
/// 已有全局订阅器时静默返回，重复调用安全
pub fn init_tracing() {
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}
