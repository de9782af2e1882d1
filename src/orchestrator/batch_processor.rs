//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **切分**：把展平后的语料按提交顺序切成最多 10 个一批
//! 2. **并发**：所有批次同时发出（fan-out），全部结算后汇合（fan-in）
//! 3. **事件**：每个批次结算时按到达顺序发出 `BatchCompleted`
//! 4. **隔离**：任何批次的失败或超时只让该批贡献空结果，不影响其他批次
//!
//! ## 设计特点
//!
//! - 批次级别不重试，兜底只在顶层触发
//! - 每个批次在独立的 `tokio::spawn` 任务中运行；调用方放弃等待时，
//!   已发出的批次继续跑完，结果无人接收即丢弃
//! - 结果按批次序号写入对应位置，汇总时总是按提交顺序

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::infrastructure::{ClassifierPort, InvokeOptions, PromptSpec};
use crate::models::{
    BatchCompleted, BatchJob, BatchOutcome, BatchStatus, MediaItem, BATCH_SIZE,
};
use crate::services::{compile_curation_prompt, parse_curation_reply};
use crate::utils::logging::{log_batch_settled, log_batches_planned};

/// 按提交顺序切分批次；空输入得到空列表
pub fn partition(items: &[MediaItem], size: usize) -> Vec<BatchJob> {
    let size = size.max(1);
    items
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| BatchJob {
            index,
            items: chunk.to_vec(),
        })
        .collect()
}

/// 批次调度器
pub struct BatchOrchestrator {
    port: Arc<dyn ClassifierPort>,
    timeout_ms: u64,
    options: InvokeOptions,
}

impl BatchOrchestrator {
    pub fn new(port: Arc<dyn ClassifierPort>, timeout_ms: u64, options: InvokeOptions) -> Self {
        Self {
            port,
            timeout_ms,
            options,
        }
    }

    /// 并发处理所有批次
    ///
    /// # 参数
    /// - `topic`: 已归一化的主题
    /// - `items`: 展平后的候选视频
    /// - `events`: 可选的事件接收端，接收端关闭后发送失败被忽略
    ///
    /// # 返回
    /// 按提交顺序排列的批次结果，长度等于批次数
    pub async fn dispatch(
        &self,
        topic: &str,
        items: &[MediaItem],
        events: Option<UnboundedSender<BatchCompleted>>,
    ) -> Vec<BatchOutcome> {
        let jobs = partition(items, BATCH_SIZE);
        let total_batches = jobs.len();
        if total_batches == 0 {
            return Vec::new();
        }

        log_batches_planned(total_batches, BATCH_SIZE, items.len());

        let mut pending = FuturesUnordered::new();
        let mut batch_sizes = Vec::with_capacity(total_batches);

        for job in jobs {
            let index = job.index;
            batch_sizes.push(job.items.len());

            let port = self.port.clone();
            let topic = topic.to_string();
            let timeout_ms = self.timeout_ms;
            let options = self.options;

            let handle = tokio::spawn(async move {
                run_batch(port.as_ref(), &topic, job, timeout_ms, options).await
            });
            pending.push(handle.map(move |joined| (index, joined)));
        }

        let mut outcomes: Vec<Option<BatchOutcome>> = vec![None; total_batches];

        while let Some((index, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[批次 {}] 任务执行失败: {}", index + 1, e);
                    BatchOutcome::failed(index)
                }
            };

            log_batch_settled(
                index + 1,
                total_batches,
                outcome.items().len(),
                batch_sizes[index],
            );

            if let Some(sender) = &events {
                let event = BatchCompleted {
                    batch_index: index + 1,
                    total_batches,
                    new_items: outcome.items().to_vec(),
                    label: outcome.selection.as_ref().map(|s| s.label.clone()),
                    status: outcome.status,
                };
                if sender.send(event).is_err() {
                    debug!("事件接收端已关闭，丢弃第 {} 批事件", index + 1);
                }
            }

            outcomes[index] = Some(outcome);
        }

        outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| outcome.unwrap_or_else(|| BatchOutcome::failed(index)))
            .collect()
    }
}

/// 处理单个批次：编译提示词、调用模型、解析响应
///
/// 任何失败都只让本批得到 `Failed`，不向上传播。
async fn run_batch(
    port: &dyn ClassifierPort,
    topic: &str,
    job: BatchJob,
    timeout_ms: u64,
    options: InvokeOptions,
) -> BatchOutcome {
    let batch_num = job.index + 1;
    let prompt = PromptSpec::Text(compile_curation_prompt(topic, &job.items));

    let response = match port.invoke(prompt, timeout_ms, options).await {
        Ok(response) => response,
        Err(e) => {
            warn!("[批次 {}] ⚠️ 调用失败，本批贡献空结果: {}", batch_num, e);
            return BatchOutcome::failed(job.index);
        }
    };

    match parse_curation_reply(&response, &job.items) {
        Ok(selection) => BatchOutcome {
            index: job.index,
            status: BatchStatus::Done,
            selection: Some(selection),
        },
        Err(e) => {
            warn!("[批次 {}] ⚠️ 响应解析失败，本批贡献空结果: {}", batch_num, e);
            BatchOutcome::failed(job.index)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::error::CapabilityError;
    use crate::infrastructure::mock::ScriptedPort;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem::new(format!("u{}", i), format!("video {}", i), 300))
            .collect()
    }

    /// 取提示词中第一个视频的标题序号，用来识别是哪一批
    fn first_video(prompt: &PromptSpec) -> usize {
        let text = prompt.text();
        let start = text.find("\"title\": \"video ").map(|p| p + 16).unwrap_or(0);
        text[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0)
    }

    fn select_first(label: &str) -> String {
        format!(
            r#"{{"folderName":"{}","videoIndices":[0],"reasoning":"ok","videoReasons":{{}}}}"#,
            label
        )
    }

    #[test]
    fn test_partition() {
        let batches = partition(&items(25), BATCH_SIZE);
        let sizes: Vec<usize> = batches.iter().map(|b| b.items.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(batches[2].index, 2);
        assert_eq!(batches[1].items[0].url, "u10");
        assert!(partition(&[], BATCH_SIZE).is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_all_batches_concurrently() {
        let port = Arc::new(ScriptedPort::new(|prompt| {
            Ok(select_first(&format!("batch {}", first_video(prompt))))
        }));
        let orchestrator =
            BatchOrchestrator::new(port.clone(), 60_000, InvokeOptions::new(0.4, 1));

        let outcomes = orchestrator.dispatch("trivia", &items(25), None).await;
        assert_eq!(port.invocations(), 3);
        assert_eq!(outcomes.len(), 3);
        let firsts: Vec<&str> = outcomes
            .iter()
            .map(|o| o.items()[0].item.url.as_str())
            .collect();
        assert_eq!(firsts, vec!["u0", "u10", "u20"]);
        assert!(outcomes.iter().all(|o| o.status == BatchStatus::Done));
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_arrival_order() {
        // 第一批最慢，最后一批最快
        let port = Arc::new(
            ScriptedPort::new(|prompt| Ok(select_first(&format!("b{}", first_video(prompt)))))
                .with_delay(|prompt| match first_video(prompt) {
                    0 => Duration::from_secs(3),
                    10 => Duration::from_secs(2),
                    _ => Duration::from_secs(1),
                }),
        );
        let orchestrator = BatchOrchestrator::new(port, 60_000, InvokeOptions::new(0.4, 1));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcomes = orchestrator.dispatch("trivia", &items(25), Some(tx)).await;

        let mut arrival = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.total_batches, 3);
            arrival.push(event.batch_index);
        }
        assert_eq!(arrival, vec![3, 2, 1]);

        // 结果仍按提交顺序
        let indices: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_isolated() {
        let port = Arc::new(
            ScriptedPort::new(|prompt| match first_video(prompt) {
                0 => Ok("not json at all".to_string()),
                10 => Err(CapabilityError::EmptyResponse {
                    model: "test".to_string(),
                }),
                _ => Ok(select_first("ok")),
            })
            .with_delay(|prompt| {
                if first_video(prompt) == 20 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(10)
                }
            }),
        );
        let orchestrator = BatchOrchestrator::new(port, 60_000, InvokeOptions::new(0.4, 1));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcomes = orchestrator.dispatch("trivia", &items(25), Some(tx)).await;
        let statuses: Vec<BatchStatus> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![BatchStatus::Failed, BatchStatus::Failed, BatchStatus::Done]
        );
        assert!(outcomes[0].items().is_empty());

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].batch_index, 3);
        assert!(events
            .iter()
            .filter(|e| e.status == BatchStatus::Failed)
            .all(|e| e.new_items.is_empty() && e.label.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_contributes_empty_batch() {
        let port = Arc::new(
            ScriptedPort::new(|_| Ok(select_first("slow")))
                .with_delay(|prompt| {
                    if first_video(prompt) == 0 {
                        Duration::from_secs(120)
                    } else {
                        Duration::ZERO
                    }
                }),
        );
        let orchestrator = BatchOrchestrator::new(port, 60_000, InvokeOptions::new(0.4, 1));
        let outcomes = orchestrator.dispatch("trivia", &items(15), None).await;
        assert_eq!(outcomes[0].status, BatchStatus::Failed);
        assert_eq!(outcomes[1].status, BatchStatus::Done);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_ignored() {
        let port = Arc::new(ScriptedPort::new(|_| Ok(select_first("x"))));
        let orchestrator = BatchOrchestrator::new(port, 60_000, InvokeOptions::new(0.4, 1));
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let outcomes = orchestrator.dispatch("trivia", &items(12), Some(tx)).await;
        assert_eq!(outcomes.len(), 2);
    }
}
