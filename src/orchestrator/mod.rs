//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次的并发调度与结果汇总，是策展流程中唯一的并行区域。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批次调度器
//! - 按提交顺序切分批次（每批最多 10 个）
//! - 所有批次并发发出，全部结算后汇合
//! - 按到达顺序发出批次完成事件
//! - 单批失败只贡献空结果
//!
//! ### `aggregator` - 结果汇总
//! - 按提交顺序合并、按 url 去重
//! - 选择播放列表名称
//!
//! ## 层次关系
//!
//! ```text
//! workflow::CurationFlow (一次策展运行)
//!     ↓
//! batch_processor (处理 Vec<BatchJob>) → aggregator
//!     ↓
//! services (提示词编译 / 响应解析)
//!     ↓
//! infrastructure (ClassifierPort)
//! ```

pub mod aggregator;
pub mod batch_processor;

pub use aggregator::aggregate;
pub use batch_processor::{partition, BatchOrchestrator};
