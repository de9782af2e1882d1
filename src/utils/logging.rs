/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::models::CurationResult;

/// 记录一次策展运行的开始
pub fn log_run_start(objective: &str, total_items: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始策展: \"{}\"", truncate_text(objective, 60));
    info!("📊 候选视频数: {}", total_items);
    info!("{}", "=".repeat(60));
}

/// 记录批次划分信息
///
/// # 参数
/// - `total_batches`: 批次总数
/// - `batch_size`: 每批大小
/// - `total_items`: 视频总数
pub fn log_batches_planned(total_batches: usize, batch_size: usize, total_items: usize) {
    info!(
        "📦 {} 个视频切分为 {} 批（每批最多 {} 个），全部并发处理",
        total_items, total_batches, batch_size
    );
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号（从 1 开始）
/// - `total_batches`: 批次总数
/// - `selected`: 本批选中的数量
/// - `batch_len`: 本批视频数量
pub fn log_batch_settled(batch_num: usize, total_batches: usize, selected: usize, batch_len: usize) {
    info!(
        "✓ 第 {}/{} 批完成: 选中 {}/{}",
        batch_num, total_batches, selected, batch_len
    );
}

/// 打印最终统计信息
pub fn print_final_stats(result: &CurationResult) {
    info!("\n{}", "=".repeat(60));
    info!("📊 策展完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📁 播放列表: {}", result.label);
    info!("✅ 选中视频: {}", result.items.len());
    info!("⏱️ 总时长: {}", format_duration(result.total_duration_seconds()));
    info!("🧭 来源: {:?}", result.source);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 把秒数格式化为 `m:ss` 或 `h:mm:ss`，0 表示未知时长
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "Unknown duration".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, remaining)
    } else {
        format!("{}:{:02}", minutes, remaining)
    }
}
