//! 策展流程 - 流程层
//!
//! 核心职责：定义"一次策展"的完整处理流程
//!
//! 流程顺序：
//! 1. 语料为空 → 直接返回空结果
//! 2. 分类能力不可用 → 兜底打分
//! 3. 主题归一化 → 并发批次 → 汇总去重
//! 4. 汇总为空 → 兜底打分；否则应用从原始目标解析的时长约束
//!
//! 策展路径从不向调用方抛出错误。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{wait_until_available, Availability, ClassifierPort, InvokeOptions};
use crate::models::{BatchCompleted, Category, Corpus, CurationResult, MediaItem, Objective};
use crate::orchestrator::{aggregate, BatchOrchestrator};
use crate::services::{
    apply_constraint, synthesize_label, Classification, FallbackScorer, FolderClassifier,
    SingleItemRequest, TopicNormalizer,
};
use crate::utils::logging::log_run_start;
use crate::workflow::run_state::{RunState, RunTrace};

/// 策展流程
///
/// - 持有分类能力端口（依赖注入，不是全局单例）
/// - 决定何时调用模型、何时兜底
/// - 只依赖业务能力（services / orchestrator）
pub struct CurationFlow {
    port: Arc<dyn ClassifierPort>,
    normalizer: TopicNormalizer,
    orchestrator: BatchOrchestrator,
    classifier: FolderClassifier,
    download_wait: Duration,
    download_poll: Duration,
}

impl CurationFlow {
    /// 创建新的策展流程
    pub fn new(port: Arc<dyn ClassifierPort>, config: &Config) -> Self {
        let curation_options =
            InvokeOptions::new(config.curation_temperature, config.curation_top_k);
        let classify_options =
            InvokeOptions::new(config.classify_temperature, config.classify_top_k);

        Self {
            normalizer: TopicNormalizer::new(
                port.clone(),
                config.curation_timeout_ms,
                curation_options,
            ),
            orchestrator: BatchOrchestrator::new(
                port.clone(),
                config.curation_timeout_ms,
                curation_options,
            ),
            classifier: FolderClassifier::new(
                port.clone(),
                config.classify_timeout_ms,
                classify_options,
            ),
            download_wait: Duration::from_millis(config.download_wait_ms),
            download_poll: Duration::from_millis(config.download_poll_ms),
            port,
        }
    }

    /// 执行一次策展
    ///
    /// # 参数
    /// - `objective`: 用户的原始目标文本
    /// - `items`: 展平后的候选视频（见 `Corpus::flatten_for_curation`）
    /// - `events`: 可选的批次完成事件接收端
    pub async fn run(
        &self,
        objective: &str,
        items: &[MediaItem],
        events: Option<UnboundedSender<BatchCompleted>>,
    ) -> CurationResult {
        self.run_traced(objective, items, events).await.0
    }

    /// 与 [`run`](Self::run) 相同，同时返回经过的状态
    pub async fn run_traced(
        &self,
        objective: &str,
        items: &[MediaItem],
        events: Option<UnboundedSender<BatchCompleted>>,
    ) -> (CurationResult, RunTrace) {
        let mut trace = RunTrace::new();
        log_run_start(objective, items.len());

        if items.is_empty() {
            info!("语料为空，返回空结果");
            trace.advance(RunState::Done);
            return (CurationResult::empty(), trace);
        }

        if !self.is_port_ready().await {
            warn!("⚠️ 分类能力不可用，使用兜底打分");
            let result = self.fallback(objective, items, &mut trace);
            return (result, trace);
        }

        // 约束必须从原始目标解析：归一化会去掉时长描述
        let mut objective = Objective::new(objective);

        trace.advance(RunState::TopicNormalizing);
        let topic = self.normalizer.normalize(&objective.raw).await;
        objective = objective.with_topic(topic);

        trace.advance(RunState::BatchDispatch);
        let outcomes = self
            .orchestrator
            .dispatch(&objective.topic, items, events)
            .await;

        trace.advance(RunState::Aggregating);
        let aggregated = aggregate(&outcomes);

        if aggregated.is_empty() {
            warn!("⚠️ 所有批次均未选中视频，使用兜底打分");
            let result = self.fallback(&objective.raw, items, &mut trace);
            return (result, trace);
        }

        trace.advance(RunState::ConstraintFiltering);
        let mut result = aggregated;
        if Category::validate_name(&result.label).is_err() {
            let replacement = synthesize_label(&objective.raw);
            warn!(
                "⚠️ 模型给出的名称 \"{}\" 不合法，改用 \"{}\"",
                result.label, replacement
            );
            result.label = replacement;
        }
        if let Some(constraint) = &objective.constraint {
            result.items = apply_constraint(result.items, constraint);
        }

        trace.advance(RunState::Done);
        (result, trace)
    }

    /// 在后台任务中执行策展，立即返回事件流和最终结果句柄
    ///
    /// 调用方丢弃接收端或句柄都不会取消已发出的批次。
    pub fn curate_streaming(
        self: &Arc<Self>,
        objective: impl Into<String>,
        items: Vec<MediaItem>,
    ) -> (UnboundedReceiver<BatchCompleted>, JoinHandle<CurationResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let flow = Arc::clone(self);
        let objective = objective.into();

        let handle = tokio::spawn(async move { flow.run(&objective, &items, Some(tx)).await });
        (rx, handle)
    }

    /// 为单个视频选择分类，结果总在允许集合中
    pub async fn classify(&self, request: &SingleItemRequest, corpus: &Corpus) -> Classification {
        self.classifier.classify(request, corpus).await
    }

    /// 入口处的可用性检查；下载中时按配置等待
    async fn is_port_ready(&self) -> bool {
        match self.port.availability().await {
            Availability::Available => true,
            Availability::Downloading => {
                info!("⏳ 模型下载中，最多等待 {:?}", self.download_wait);
                wait_until_available(self.port.as_ref(), self.download_wait, self.download_poll)
                    .await
            }
            Availability::Downloadable | Availability::Unavailable => false,
        }
    }

    /// 兜底打分，不应用时长约束
    fn fallback(&self, objective: &str, items: &[MediaItem], trace: &mut RunTrace) -> CurationResult {
        trace.advance(RunState::FallbackScoring);
        let result = FallbackScorer::new(objective).curate(items);
        trace.advance(RunState::Done);
        result
    }
}
