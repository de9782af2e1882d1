//! 提示词编译
//!
//! 两种提示词：
//! - 策展：主题 + 一批视频的编号列表，要求返回严格 JSON
//! - 单条分类：视频信息 + 每个分类的示例条目，要求只返回分类名
//!
//! 全部是纯函数：相同输入必然产生相同文本。

use serde::Serialize;

use crate::models::{Category, MediaItem, DEFAULT_CATEGORY, RESERVED_CATEGORIES};
use crate::utils::logging::format_duration;

/// 缩略图描述提示词
pub const THUMBNAIL_PROMPT: &str = "Describe this YouTube video thumbnail in 1-2 sentences. \
Focus on the main subject, colors, text, and overall theme. Be concise and descriptive.";

/// 发送给模型的单个视频
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemForPrompt<'a> {
    index: usize,
    title: &'a str,
    description: &'a str,
    duration_seconds: u64,
    duration_minutes: u64,
    channel_name: &'a str,
}

impl<'a> From<(usize, &'a MediaItem)> for ItemForPrompt<'a> {
    fn from((index, item): (usize, &'a MediaItem)) -> Self {
        Self {
            index,
            title: &item.title,
            description: &item.description,
            duration_seconds: item.duration_seconds,
            duration_minutes: (item.duration_seconds + 30) / 60,
            channel_name: item.channel_name.as_deref().unwrap_or("Unknown"),
        }
    }
}

/// 单条分类请求中的视频信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleItemRequest {
    pub title: String,
    pub channel_name: Option<String>,
    pub duration_seconds: Option<u64>,
    pub thumbnail: Option<String>,
}

impl SingleItemRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

impl From<&MediaItem> for SingleItemRequest {
    fn from(item: &MediaItem) -> Self {
        Self {
            title: item.title.clone(),
            channel_name: item.channel_name.clone(),
            duration_seconds: (item.duration_seconds > 0).then_some(item.duration_seconds),
            thumbnail: item.thumbnail.clone(),
        }
    }
}

/// 构建策展提示词
///
/// # 参数
/// - `topic`: 已归一化的主题
/// - `items`: 本批视频，序号从 0 开始且只在本批内有效
pub fn compile_curation_prompt(topic: &str, items: &[MediaItem]) -> String {
    let items_for_prompt: Vec<ItemForPrompt> = items
        .iter()
        .enumerate()
        .map(ItemForPrompt::from)
        .collect();
    let items_json = serde_json::to_string_pretty(&items_for_prompt).unwrap_or_default();

    format!(
        r#"You are a strict video classifier acting as a search engine over the user's saved videos.

TOPIC TO FIND: "{topic}"

Select a video ONLY if its main subject is the topic, the title or description clearly shows it,
and you are confident. If you are unsure, leave it out.
It is better to return zero matches than to include a wrong video.

VIDEOS TO ANALYZE ({count} total):
{items_json}

For each video:
1. Read the title and check whether it is about "{topic}".
2. Read the description and check whether it is about "{topic}".
3. Include it only if it is PRIMARILY about "{topic}".

Respond with JSON only, in exactly this shape:
{{
  "folderName": "short descriptive name",
  "videoIndices": [indices of matching videos],
  "reasoning": "why these videos match overall",
  "videoReasons": {{
    "0": "why video 0 was chosen"
  }}
}}

If nothing matches, respond with:
{{
  "folderName": "{topic}",
  "videoIndices": [],
  "reasoning": "No videos are primarily about this topic",
  "videoReasons": {{}}
}}

Rules:
- Return ONLY valid JSON, nothing else.
- "videoIndices" uses the "index" values from the list above.
- "folderName" is at most 30 characters and contains none of < > : " / \ | ? *
- Every entry in "videoReasons" explains why that specific video matches."#,
        topic = topic,
        count = items.len(),
        items_json = items_json,
    )
}

/// 构建单条分类提示词
///
/// # 参数
/// - `request`: 待分类视频
/// - `categories`: 带示例条目的分类（已排除保留分类）
/// - `allowed`: 允许回答的分类名
/// - `thumbnail_description`: 缩略图描述（可选）
pub fn compile_single_item_prompt(
    request: &SingleItemRequest,
    categories: &[Category],
    allowed: &[String],
    thumbnail_description: Option<&str>,
) -> String {
    let mut video_line = format!(
        "Choose the best folder for a video titled \"{}\".",
        request.title
    );
    if let Some(channel) = &request.channel_name {
        video_line.push_str(&format!(" From channel \"{}\".", channel));
    }
    if let Some(description) = thumbnail_description {
        video_line.push_str(&format!(
            " Its thumbnail shows \"{}\".",
            description
        ));
    }
    video_line.push_str(&format!(
        " Duration: {}.",
        format_duration(request.duration_seconds.unwrap_or(0))
    ));

    let folder_dump = categories
        .iter()
        .map(describe_category)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut reserved: Vec<&str> = RESERVED_CATEGORIES.iter().copied().collect();
    reserved.sort_unstable();
    let reserved = reserved
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(" or ");

    format!(
        r#"You sort YouTube videos into the user's folders.
Titles and folder names may be in different languages; translate to English before deciding.
Decide mainly from the folder name and the media items already inside it (titles, descriptions, durations).

Rules:
1. {video_line}
2. If the video looks like news or trending content and no folder is about news or trending, answer "{default}".
3. Never answer {reserved}.
4. Only answer with one of the available folder names listed below.
5. Respond with the folder name only, nothing else.

Current folders and their items:

{folder_dump}

Available folders: {allowed}

Folder:"#,
        video_line = video_line,
        default = DEFAULT_CATEGORY,
        reserved = reserved,
        folder_dump = folder_dump,
        allowed = allowed.join(", "),
    )
}

fn describe_category(category: &Category) -> String {
    let header = format!("FOLDER: {}", category.name);
    if category.exemplars.is_empty() {
        return format!("{}\n(no media items in this folder)", header);
    }

    let items = category
        .exemplars
        .iter()
        .take(crate::models::corpus::MAX_EXEMPLARS)
        .map(|item| {
            let description = if item.description.is_empty() {
                "No description available"
            } else {
                &item.description
            };
            format!(
                "- Title: {}\n  Description: {}\n  Duration: {}",
                item.title,
                description,
                format_duration(item.duration_seconds)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}", header, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<MediaItem> {
        vec![
            MediaItem::new("u0", "General Knowledge Trivia #12", 615)
                .with_description("Test your knowledge")
                .with_channel("Quiz Night"),
            MediaItem::new("u1", "Lofi beats", 3600),
        ]
    }

    #[test]
    fn test_curation_prompt_is_deterministic() {
        let items = batch();
        assert_eq!(
            compile_curation_prompt("trivia", &items),
            compile_curation_prompt("trivia", &items)
        );
    }

    #[test]
    fn test_curation_prompt_embeds_items() {
        let prompt = compile_curation_prompt("trivia", &batch());
        assert!(prompt.contains("TOPIC TO FIND: \"trivia\""));
        assert!(prompt.contains("VIDEOS TO ANALYZE (2 total)"));
        assert!(prompt.contains("\"durationSeconds\": 615"));
        assert!(prompt.contains("\"durationMinutes\": 10"));
        assert!(prompt.contains("\"channelName\": \"Quiz Night\""));
        assert!(prompt.contains("\"channelName\": \"Unknown\""));
        assert!(prompt.contains("\"index\": 1"));
        assert!(prompt.contains("\"videoIndices\""));
    }

    #[test]
    fn test_single_item_prompt() {
        let categories = vec![
            Category::new(
                "Programming",
                (0..7)
                    .map(|i| MediaItem::new(format!("p{}", i), format!("Rust episode {}", i), 600))
                    .collect(),
            ),
            Category::new("Music", vec![]),
        ];
        let allowed = vec![
            "Programming".to_string(),
            "Music".to_string(),
            DEFAULT_CATEGORY.to_string(),
        ];
        let request = SingleItemRequest {
            title: "Borrow checker explained".to_string(),
            channel_name: Some("Rustacean Station".to_string()),
            duration_seconds: Some(754),
            thumbnail: None,
        };

        let prompt = compile_single_item_prompt(&request, &categories, &allowed, Some("a crab"));
        assert!(prompt.contains("\"Borrow checker explained\""));
        assert!(prompt.contains("From channel \"Rustacean Station\""));
        assert!(prompt.contains("Its thumbnail shows \"a crab\""));
        assert!(prompt.contains("Duration: 12:34."));
        assert!(prompt.contains("Rust episode 4"));
        assert!(!prompt.contains("Rust episode 5"));
        assert!(prompt.contains("(no media items in this folder)"));
        assert!(prompt.contains("Never answer \"done\" or \"trash\""));
        assert!(prompt.contains("Available folders: Programming, Music, recently_added"));
        assert_eq!(
            prompt,
            compile_single_item_prompt(&request, &categories, &allowed, Some("a crab"))
        );
    }

    #[test]
    fn test_single_item_from_media_item() {
        let item = MediaItem::new("u", "t", 0).with_thumbnail("thumb.jpg");
        let request = SingleItemRequest::from(&item);
        assert_eq!(request.duration_seconds, None);
        assert_eq!(request.thumbnail.as_deref(), Some("thumb.jpg"));
    }
}
