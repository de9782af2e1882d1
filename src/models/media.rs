use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 永远不参与推荐的保留分类（归档 / 丢弃）
pub static RESERVED_CATEGORIES: phf::Set<&'static str> = phf::phf_set! {
    "done",
    "trash",
};

/// 默认分类：无法判断或新闻/热点类内容的归宿
pub const DEFAULT_CATEGORY: &str = "recently_added";

/// 分类名称的最大长度
pub const MAX_CATEGORY_NAME_LEN: usize = 30;

const INVALID_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// 单个媒体条目（以 url 作为唯一标识）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 时长（秒），0 表示未知
    #[serde(default, rename = "duration", deserialize_with = "deserialize_duration")]
    pub duration_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

fn untitled() -> String {
    "Untitled".to_string()
}

impl MediaItem {
    /// 创建只带标题和时长的条目
    pub fn new(url: impl Into<String>, title: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: String::new(),
            duration_seconds,
            channel_name: None,
            thumbnail: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_channel(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// 分类（文件夹）及其示例条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub exemplars: Vec<MediaItem>,
}

impl Category {
    pub fn new(name: impl Into<String>, exemplars: Vec<MediaItem>) -> Self {
        Self {
            name: name.into(),
            exemplars,
        }
    }

    /// 是否为保留分类
    pub fn is_reserved(name: &str) -> bool {
        RESERVED_CATEGORIES.contains(name)
    }

    /// 校验分类名称：非空、不超过 30 个字符、不含 `<>:"/\|?*`
    pub fn validate_name(name: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidCategoryName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("名称为空"));
        }
        if name.chars().count() > MAX_CATEGORY_NAME_LEN {
            return Err(invalid("超过 30 个字符"));
        }
        if name.contains(INVALID_NAME_CHARS) {
            return Err(invalid("包含非法字符"));
        }
        Ok(())
    }
}

// 时长既可能是整数也可能是数字字符串（例如 "754"），无法解析时视为未知
fn deserialize_duration<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or numeric string of seconds")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u64::try_from(value).unwrap_or(0))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value.is_finite() && value > 0.0 {
                Ok(value as u64)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let digits: String = value
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            Ok(digits.parse().unwrap_or(0))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
