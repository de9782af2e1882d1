//! 测试用的可编程端口

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::capability::{Availability, ClassifierPort, InvokeOptions, PromptSpec};
use crate::error::CapabilityError;

type Responder = Box<dyn Fn(&PromptSpec) -> Result<String, CapabilityError> + Send + Sync>;
type Delay = Box<dyn Fn(&PromptSpec) -> Duration + Send + Sync>;

/// 按规则应答的端口，记录收到的每一条提示词
pub struct ScriptedPort {
    responder: Responder,
    delay: Option<Delay>,
    availability: Mutex<VecDeque<Availability>>,
    prompts: Mutex<Vec<PromptSpec>>,
    availability_checks: AtomicUsize,
}

impl ScriptedPort {
    pub fn new(
        responder: impl Fn(&PromptSpec) -> Result<String, CapabilityError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            availability: Mutex::new(VecDeque::from([Availability::Available])),
            prompts: Mutex::new(Vec::new()),
            availability_checks: AtomicUsize::new(0),
        }
    }

    pub fn with_availability(self, availability: Availability) -> Self {
        self.with_availability_sequence(vec![availability])
    }

    /// 依次返回给定状态，最后一个状态保持不变
    pub fn with_availability_sequence(self, sequence: Vec<Availability>) -> Self {
        *self.availability.lock().unwrap() = sequence.into();
        self
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&PromptSpec) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn prompts(&self) -> Vec<PromptSpec> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn availability_checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassifierPort for ScriptedPort {
    async fn availability(&self) -> Availability {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.availability.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Availability::Unavailable)
        } else {
            queue.front().copied().unwrap_or(Availability::Unavailable)
        }
    }

    async fn invoke(
        &self,
        prompt: PromptSpec,
        timeout_ms: u64,
        _options: InvokeOptions,
    ) -> Result<String, CapabilityError> {
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(delay) = &self.delay {
            let wait = delay(&prompt);
            if wait > Duration::from_millis(timeout_ms) {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                return Err(CapabilityError::Timeout { timeout_ms });
            }
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }

        (self.responder)(&prompt)
    }
}
