//! 页面视图模型
//!
//! 目录加载完成后一次性构建所有卡片；之后的交互只修改卡片的可见性、
//! 收藏标记以及标签页的激活状态，不再回读目录。

use std::fmt;

use crate::catalog::{composite_key, Catalog, Category, Difficulty, Resource, Status, Subcategory};
use crate::filter::FilterState;
use crate::render;
use crate::store::{CatalogStore, Theme};

/// 卡片的稳定标识 `categoryId/subcategoryId/resourceName`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(String);

impl CardId {
    pub fn new(category_id: &str, subcategory_id: &str, resource_name: &str) -> Self {
        CardId(format!("{}/{}/{}", category_id, subcategory_id, resource_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub id: CardId,
    pub category_id: String,
    pub subcategory_id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub status: Status,
    pub favorite: bool,
    pub visible: bool,
    /// 卡片渲染后的全部文本，供搜索匹配
    pub search_text: String,
}

impl CardView {
    fn build(category: &Category, sub: &Subcategory, resource: &Resource, favorite: bool) -> Self {
        let mut card = CardView {
            id: CardId::new(&category.id, &sub.id, &resource.name),
            category_id: category.id.clone(),
            subcategory_id: sub.id.clone(),
            name: resource.name.clone(),
            description: resource.description.clone(),
            url: resource.url.clone(),
            tags: resource.tags.clone(),
            difficulty: resource.difficulty,
            status: resource.status,
            favorite,
            visible: true,
            search_text: String::new(),
        };
        card.search_text = render::card_text(&card);
        card
    }

    pub fn favorite_key(&self) -> String {
        composite_key(&self.category_id, &self.name)
    }

    pub fn favorite_title(&self) -> &'static str {
        favorite_title(self.favorite)
    }
}

pub fn favorite_title(favorite: bool) -> &'static str {
    if favorite {
        "取消收藏"
    } else {
        "收藏"
    }
}

#[derive(Debug, Clone)]
pub struct TabView {
    pub subcategory_id: String,
    pub title: String,
    pub status_dot: &'static str,
    pub active: bool,
}

/// 一个子分类的内容块
#[derive(Debug, Clone)]
pub struct TabContentView {
    pub dom_id: String,
    pub subcategory_id: String,
    pub active: bool,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone)]
pub struct SectionView {
    pub category_id: String,
    pub title: String,
    pub icon: String,
    /// 仅当子分类多于一个时存在
    pub tabs: Option<Vec<TabView>>,
    pub filter: FilterState,
    pub contents: Vec<TabContentView>,
}

impl SectionView {
    fn build(category: &Category, store: &CatalogStore) -> Self {
        let tabbed = category.subcategories.len() > 1;
        let tabs = tabbed.then(|| {
            category
                .subcategories
                .iter()
                .enumerate()
                .map(|(index, sub)| TabView {
                    subcategory_id: sub.id.clone(),
                    title: sub.title.clone(),
                    status_dot: status_dot(&sub.id),
                    active: index == 0,
                })
                .collect()
        });

        let contents = category
            .subcategories
            .iter()
            .enumerate()
            .map(|(index, sub)| TabContentView {
                dom_id: format!("{}-{}", category.id, sub.id),
                subcategory_id: sub.id.clone(),
                active: index == 0,
                cards: sub
                    .resources
                    .iter()
                    .map(|r| CardView::build(category, sub, r, store.is_favorite(&category.id, &r.name)))
                    .collect(),
            })
            .collect();

        SectionView {
            category_id: category.id.clone(),
            title: category.title.clone(),
            icon: category.icon.clone(),
            tabs,
            filter: FilterState::default(),
            contents,
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        self.contents.iter().flat_map(|c| c.cards.iter())
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut CardView> {
        self.contents.iter_mut().flat_map(|c| c.cards.iter_mut())
    }

    pub fn visible_count(&self) -> usize {
        self.cards().filter(|c| c.visible).count()
    }

    pub fn active_subcategory(&self) -> Option<&str> {
        self.contents
            .iter()
            .find(|c| c.active)
            .map(|c| c.subcategory_id.as_str())
    }

    /// 激活指定子分类的标签页与内容块；组内其余全部取消激活
    pub fn activate_tab(&mut self, subcategory_id: &str) -> bool {
        let Some(tabs) = self.tabs.as_mut() else {
            return false;
        };
        if !tabs.iter().any(|t| t.subcategory_id == subcategory_id) {
            return false;
        }
        for tab in tabs.iter_mut() {
            tab.active = tab.subcategory_id == subcategory_id;
        }
        for content in self.contents.iter_mut() {
            content.active = content.subcategory_id == subcategory_id;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub theme: Theme,
    pub total_resources: usize,
    pub sections: Vec<SectionView>,
}

impl PageView {
    /// 由目录构建页面；目录缺失时页面没有任何区块
    pub fn build(store: &CatalogStore) -> Self {
        let sections = store
            .catalog()
            .map(Catalog::categories)
            .unwrap_or_default()
            .iter()
            .map(|category| SectionView::build(category, store))
            .collect();

        PageView {
            theme: store.theme(),
            total_resources: store.total_resource_count(),
            sections,
        }
    }

    /// 统计栏显示的资源总数
    pub fn total_label(&self) -> String {
        format!("{}+", self.total_resources)
    }

    pub fn section(&self, category_id: &str) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.category_id == category_id)
    }

    pub fn section_mut(&mut self, category_id: &str) -> Option<&mut SectionView> {
        self.sections.iter_mut().find(|s| s.category_id == category_id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        self.sections.iter().flat_map(|s| s.cards())
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut CardView> {
        self.sections.iter_mut().flat_map(|s| s.cards_mut())
    }

    pub fn card(&self, id: &CardId) -> Option<&CardView> {
        self.cards().find(|c| &c.id == id)
    }

    pub fn visible_count(&self) -> usize {
        self.cards().filter(|c| c.visible).count()
    }
}

/// 标签页状态点颜色
fn status_dot(subcategory_id: &str) -> &'static str {
    match subcategory_id {
        "domestic" | "academic" => "green",
        "vpn" => "red",
        "mirror" | "api" => "yellow",
        _ => "green",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::loaded_store;
    use crate::storage::MemoryStore;

    #[test]
    fn test_tabs_only_for_multi_subcategory_sections() {
        let page = PageView::build(&loaded_store());
        let domestic = page.section("domestic").unwrap();
        let tabs = domestic.tabs.as_ref().unwrap();
        assert_eq!(tabs.len(), 2);
        assert!(tabs[0].active && !tabs[1].active);
        assert_eq!(tabs[0].status_dot, "yellow");
        assert_eq!(tabs[1].status_dot, "red");
        assert_eq!(domestic.active_subcategory(), Some("mirror"));

        let tools = page.section("tools").unwrap();
        assert!(tools.tabs.is_none());
        assert!(tools.contents[0].active);
    }

    #[test]
    fn test_every_resource_becomes_a_visible_card() {
        let page = PageView::build(&loaded_store());
        assert_eq!(page.cards().count(), 5);
        assert_eq!(page.visible_count(), 5);
        assert_eq!(page.total_label(), "5+");
    }

    #[test]
    fn test_card_carries_favorite_marker() {
        let mut store = loaded_store();
        store.toggle_favorite("domestic", "知网");
        let page = PageView::build(&store);
        let card = page.card(&CardId::new("domestic", "mirror", "知网")).unwrap();
        assert!(card.favorite);
        assert_eq!(card.favorite_title(), "取消收藏");
        assert_eq!(card.favorite_key(), "domestic/知网");
    }

    #[test]
    fn test_activate_tab_is_exclusive() {
        let mut page = PageView::build(&loaded_store());
        let domestic = page.section_mut("domestic").unwrap();
        assert!(domestic.activate_tab("vpn"));
        assert_eq!(domestic.active_subcategory(), Some("vpn"));
        let active_tabs = domestic.tabs.as_ref().unwrap().iter().filter(|t| t.active).count();
        assert_eq!(active_tabs, 1);
        assert!(!domestic.activate_tab("nope"));
        assert_eq!(domestic.active_subcategory(), Some("vpn"));
    }

    #[test]
    fn test_empty_store_builds_empty_page() {
        let store = CatalogStore::open(Box::new(MemoryStore::default()));
        let page = PageView::build(&store);
        assert!(page.sections.is_empty());
        assert_eq!(page.total_label(), "0+");
    }

    #[test]
    fn test_search_text_contains_rendered_fields() {
        let page = PageView::build(&loaded_store());
        let card = page.card(&CardId::new("tools", "api", "Materials Project")).unwrap();
        assert!(card.search_text.contains("Materials Project"));
        assert!(card.search_text.contains("REST API"));
        assert!(card.search_text.contains("需注册"));
        assert!(!card.search_text.contains("https://"));
    }
}
