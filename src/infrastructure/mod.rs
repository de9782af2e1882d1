//! 基础设施层
//!
//! 持有稀缺资源（分类能力会话），只暴露能力，不认识业务概念。

pub mod capability;
#[cfg(test)]
pub mod mock;
pub mod openai_port;

pub use capability::{
    self_test, wait_until_available, Availability, ClassifierPort, InvokeOptions, PromptSpec,
};
pub use openai_port::OpenAiClassifierPort;
