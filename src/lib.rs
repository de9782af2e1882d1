//! # Folder Curator
//!
//! 根据自然语言目标整理视频收藏：为单个视频选择分类，或从整个语料中
//! 策展出一个去重、满足时长约束的播放列表
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（分类能力会话），只暴露能力
//! - `ClassifierPort` - 生成式分类能力的抽象，每次调用一个全新会话
//! - `OpenAiClassifierPort` - OpenAI 兼容接口的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `TopicNormalizer` - 把目标压缩成检索主题
//! - `prompt_compiler` / `response_parser` - 提示词编译与响应校验
//! - `duration_parser` / `constraint_applier` - 时长约束的解析与应用
//! - `FolderClassifier` - 单条分类与标签校验
//! - `FallbackScorer` - 确定性的关键词兜底打分
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次策展"的完整处理流程
//! - `RunState` - 运行状态（归一化 → 批次 → 汇总 → 约束，或兜底）
//! - `CurationFlow` - 流程编排，决定何时调用模型、何时兜底
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次切分与并发调度，按到达顺序发出事件
//! - `orchestrator/aggregator` - 按提交顺序汇总去重
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Availability, ClassifierPort, OpenAiClassifierPort};
pub use models::{BatchCompleted, Corpus, CurationResult, MediaItem};
pub use orchestrator::BatchOrchestrator;
pub use services::{Classification, SingleItemRequest};
pub use workflow::{CurationFlow, RunState};
