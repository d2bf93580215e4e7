use crate::catalog::Status;
use crate::store::{CatalogStore, Theme};

struct CategoryStats {
    id: String,
    title: String,
    subcategories: Vec<(String, usize)>,
}

impl CategoryStats {
    fn total(&self) -> usize {
        self.subcategories.iter().map(|(_, n)| n).sum()
    }
}

/// 目录与本地状态的统计报告
pub struct StatsReport {
    loaded: bool,
    categories: Vec<CategoryStats>,
    by_status: Vec<(Status, usize)>,
    favorites: Vec<String>,
    history: Vec<String>,
    theme: Theme,
    total: usize,
}

impl StatsReport {
    pub fn collect(store: &CatalogStore) -> Self {
        let mut categories = Vec::new();
        let mut by_status: Vec<(Status, usize)> = Status::ALL.iter().map(|s| (*s, 0)).collect();

        if let Some(catalog) = store.catalog() {
            for category in catalog.categories() {
                categories.push(CategoryStats {
                    id: category.id.clone(),
                    title: category.title.clone(),
                    subcategories: category
                        .subcategories
                        .iter()
                        .map(|s| (s.title.clone(), s.resources.len()))
                        .collect(),
                });
            }
            for (_, _, resource) in catalog.iter_resources() {
                if let Some(entry) = by_status.iter_mut().find(|(s, _)| *s == resource.status) {
                    entry.1 += 1;
                }
            }
        }

        Self {
            loaded: store.catalog().is_some(),
            categories,
            by_status,
            favorites: store.favorites().map(str::to_string).collect(),
            history: store.search_history().to_vec(),
            theme: store.theme(),
            total: store.total_resource_count(),
        }
    }

    pub fn format(&self, detailed: bool) -> String {
        let mut output = String::new();

        output.push_str("\n📚 Resource Catalog Report\n");
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        if !self.loaded {
            output.push_str("❌ Dataset not loaded\n\n");
        }

        // Categories
        if !self.categories.is_empty() {
            output.push_str("📂 Categories:\n");
            for category in &self.categories {
                output.push_str(&format!(
                    "  • {} ({}): {} resources\n",
                    category.title,
                    category.id,
                    category.total()
                ));
                if detailed {
                    for (title, count) in &category.subcategories {
                        output.push_str(&format!("    - {}: {}\n", title, count));
                    }
                }
            }
            output.push('\n');

            output.push_str("🚦 Status:\n");
            for (status, count) in &self.by_status {
                output.push_str(&format!("  • {}: {}\n", status.text(), count));
            }
            output.push('\n');
        }

        // Favorites
        output.push_str(&format!("❤️  Favorites: {}\n", self.favorites.len()));
        if detailed {
            for key in &self.favorites {
                output.push_str(&format!("  • {}\n", key));
            }
        }

        // Search history
        output.push_str(&format!("🔍 Search History: {}\n", self.history.len()));
        if detailed {
            for query in &self.history {
                output.push_str(&format!("  • {}\n", query));
            }
        }

        output.push_str(&format!("🎨 Theme: {}\n", self.theme.label()));

        output.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        output.push_str(&format!(
            "\n📊 Summary: {}+ resources in {} categories\n\n",
            self.total,
            self.categories.len()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::loaded_store;

    #[test]
    fn test_report_counts() {
        let mut store = loaded_store();
        store.toggle_favorite("tools", "PubChem");
        store.push_search_history("API");

        let text = StatsReport::collect(&store).format(true);
        assert!(text.contains("国内资源 (domestic): 3 resources"));
        assert!(text.contains("    - 镜像站: 2"));
        assert!(text.contains("正常访问: 4"));
        assert!(text.contains("访问受限: 1"));
        assert!(text.contains("❤️  Favorites: 1"));
        assert!(text.contains("  • tools/PubChem"));
        assert!(text.contains("  • api"));
        assert!(text.contains("📊 Summary: 5+ resources in 2 categories"));
    }

    #[test]
    fn test_compact_report_omits_details() {
        let text = StatsReport::collect(&loaded_store()).format(false);
        assert!(!text.contains("    - 镜像站"));
        assert!(text.contains("🎨 Theme: 浅色"));
    }

    #[test]
    fn test_report_without_dataset() {
        let store = CatalogStore::open(Box::new(MemoryStore::default()));
        let text = StatsReport::collect(&store).format(false);
        assert!(text.contains("Dataset not loaded"));
        assert!(text.contains("0+ resources in 0 categories"));
    }
}
