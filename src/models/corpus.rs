use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::media::{Category, MediaItem, DEFAULT_CATEGORY};

/// 单个分类在提示词中最多展示的示例条目数
pub const MAX_EXEMPLARS: usize = 5;

/// 外部语料：按分类分组的媒体条目，以及分类的显示顺序
///
/// 引擎只读，从不修改。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub folders_ordering: Vec<String>,
    #[serde(default)]
    pub folders: HashMap<String, Vec<MediaItem>>,
}

impl Corpus {
    pub fn new(folders_ordering: Vec<String>, folders: HashMap<String, Vec<MediaItem>>) -> Self {
        Self {
            folders_ordering,
            folders,
        }
    }

    /// 按确定顺序遍历所有分类名：先 `folders_ordering`，再按名称排序其余分类
    fn ordered_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut names: Vec<&str> = self
            .folders_ordering
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect();

        let mut rest: Vec<&str> = self
            .folders
            .keys()
            .map(String::as_str)
            .filter(|name| !seen.contains(name))
            .collect();
        rest.sort_unstable();
        names.extend(rest);
        names
    }

    /// 可供推荐的分类名（排除保留分类）
    pub fn available_categories(&self) -> Vec<String> {
        self.ordered_names()
            .into_iter()
            .filter(|name| !Category::is_reserved(name))
            .map(str::to_string)
            .collect()
    }

    /// 单条分类的允许集合：可推荐分类，且总是包含默认分类
    pub fn allowed_categories(&self) -> Vec<String> {
        let mut allowed = self.available_categories();
        if !allowed.iter().any(|name| name == DEFAULT_CATEGORY) {
            allowed.push(DEFAULT_CATEGORY.to_string());
        }
        allowed
    }

    /// 带示例条目的分类列表（每类最多 5 个示例，排除保留分类）
    pub fn categories(&self) -> Vec<Category> {
        self.available_categories()
            .into_iter()
            .map(|name| {
                let exemplars = self
                    .folders
                    .get(&name)
                    .map(|items| items.iter().take(MAX_EXEMPLARS).cloned().collect())
                    .unwrap_or_default();
                Category::new(name, exemplars)
            })
            .collect()
    }

    /// 展平为策展用的有序条目列表
    ///
    /// 跳过保留分类和没有 url 的条目；同一 url 只保留第一次出现。
    pub fn flatten_for_curation(&self) -> Vec<MediaItem> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for name in self.ordered_names() {
            if Category::is_reserved(name) {
                continue;
            }
            let Some(folder_items) = self.folders.get(name) else {
                continue;
            };
            for item in folder_items {
                if item.url.trim().is_empty() {
                    tracing::warn!("条目缺少 url，已跳过: {}", item.title);
                    continue;
                }
                if seen.insert(item.url.clone()) {
                    items.push(item.clone());
                }
            }
        }

        items
    }

    /// 语料中的条目总数（含保留分类）
    pub fn total_items(&self) -> usize {
        self.folders.values().map(Vec::len).sum()
    }
}
