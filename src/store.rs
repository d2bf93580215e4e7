use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

use crate::catalog::{self, composite_key, Catalog, DataSource, Resource};
use crate::error::{LoadError, PersistenceError};
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "resource-favorites";
pub const SEARCH_HISTORY_KEY: &str = "search-history";
pub const VISITS_KEY: &str = "resource-visits";
pub const THEME_KEY: &str = "theme";

/// 只保留最近的搜索次数
pub const SEARCH_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "浅色",
            Theme::Dark => "深色",
        }
    }
}

/// 资源目录与用户本地状态
///
/// 目录只通过 [`CatalogStore::load`] 整体替换；收藏、搜索历史、访问记录
/// 与主题在每次变更后立即写回存储后端。
pub struct CatalogStore {
    backend: Box<dyn KeyValueStore>,
    catalog: Option<Catalog>,
    favorites: BTreeSet<String>,
    search_history: Vec<String>,
    visits: BTreeMap<String, i64>,
    theme: Theme,
}

impl CatalogStore {
    /// 打开存储并读取已持久化的状态，各键读取失败时独立回退为空
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let favorites: BTreeSet<String> = read_or_default(backend.as_ref(), FAVORITES_KEY);
        let search_history =
            normalize_history(read_or_default(backend.as_ref(), SEARCH_HISTORY_KEY));
        let visits: BTreeMap<String, i64> = read_or_default(backend.as_ref(), VISITS_KEY);
        let theme: Theme = read_or_default(backend.as_ref(), THEME_KEY);

        debug!(
            "Opened {} store: {} favorites, {} history entries, {} visits",
            backend.backend_name(),
            favorites.len(),
            search_history.len(),
            visits.len()
        );

        Self {
            backend,
            catalog: None,
            favorites,
            search_history,
            visits,
            theme,
        }
    }

    /// 获取并解析数据集；失败时目录保持为空
    pub async fn load(&mut self, source: &DataSource) -> Result<&Catalog, LoadError> {
        self.catalog = None;
        match catalog::fetch(source).await {
            Ok(loaded) => {
                info!(
                    "✅ Loaded {} categories, {} resources from {}",
                    loaded.categories().len(),
                    loaded.total_resource_count(),
                    source
                );
                Ok(self.install(loaded))
            }
            Err(e) => {
                error!("❌ Failed to load dataset from {}: {}", source, e);
                Err(e)
            }
        }
    }

    /// 以已解析的目录替换当前目录
    pub fn install(&mut self, catalog: Catalog) -> &Catalog {
        self.catalog.insert(catalog)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn lookup(&self, category_id: &str, subcategory_id: &str, name: &str) -> Option<&Resource> {
        self.catalog.as_ref()?.find(category_id, subcategory_id, name)
    }

    pub fn total_resource_count(&self) -> usize {
        self.catalog
            .as_ref()
            .map(Catalog::total_resource_count)
            .unwrap_or(0)
    }

    pub fn is_favorite(&self, category_id: &str, resource_name: &str) -> bool {
        self.favorites
            .contains(&composite_key(category_id, resource_name))
    }

    /// 切换收藏并立即持久化，返回切换后的收藏状态
    pub fn toggle_favorite(&mut self, category_id: &str, resource_name: &str) -> bool {
        let key = composite_key(category_id, resource_name);
        let now_favorite = if self.favorites.remove(&key) {
            false
        } else {
            self.favorites.insert(key.clone());
            true
        };
        persist(self.backend.as_mut(), FAVORITES_KEY, &self.favorites);
        debug!("Favorite {} -> {}", key, now_favorite);
        now_favorite
    }

    pub fn favorites(&self) -> impl Iterator<Item = &str> {
        self.favorites.iter().map(String::as_str)
    }

    /// 记录访问时间，失败只记录日志
    pub fn record_visit(&mut self, category_id: &str, resource_name: &str) {
        let key = composite_key(category_id, resource_name);
        self.visits.insert(key, Utc::now().timestamp_millis());
        persist(self.backend.as_mut(), VISITS_KEY, &self.visits);
    }

    /// 规范化 (去空白、小写) 后去重插到最前，最多保留 10 条
    pub fn push_search_history(&mut self, query: &str) {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return;
        }
        self.search_history.retain(|q| q != &normalized);
        self.search_history.insert(0, normalized);
        self.search_history.truncate(SEARCH_HISTORY_LIMIT);
        persist(
            self.backend.as_mut(),
            SEARCH_HISTORY_KEY,
            &self.search_history,
        );
    }

    pub fn search_history(&self) -> &[String] {
        &self.search_history
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        persist(self.backend.as_mut(), THEME_KEY, &self.theme);
        self.theme
    }

    #[cfg(test)]
    pub(crate) fn last_visit(&self, category_id: &str, resource_name: &str) -> Option<i64> {
        self.visits
            .get(&composite_key(category_id, resource_name))
            .copied()
    }
}

/// 规范化已保存的历史：去空白、小写、去掉空项与重复项，保留最近 10 条
fn normalize_history(stored: Vec<String>) -> Vec<String> {
    let mut history: Vec<String> = Vec::with_capacity(SEARCH_HISTORY_LIMIT);
    for entry in stored {
        let normalized = entry.trim().to_lowercase();
        if !normalized.is_empty() && !history.contains(&normalized) {
            history.push(normalized);
        }
    }
    history.truncate(SEARCH_HISTORY_LIMIT);
    history
}

fn read_or_default<T>(backend: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("⚠️  Failed to read '{}': {}, using empty default", key, e);
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(source) => {
            let err = PersistenceError::Corrupt {
                key: key.to_string(),
                source,
            };
            warn!("⚠️  {}, using empty default", err);
            T::default()
        }
    }
}

fn persist<T: Serialize>(backend: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })
        .and_then(|encoded| backend.set(key, &encoded));

    if let Err(e) = result {
        error!("❌ Failed to persist '{}': {}", key, e);
    }
}
