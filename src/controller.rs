//! 页面控制器
//!
//! 把用户事件转换为显示指令。控制器持有目录存储和已构建的页面视图，
//! 事件只修改卡片可见性、收藏标记、标签页激活状态与主题。
//!
//! 搜索与筛选不叠加：搜索进行中时按全文匹配所有区块的卡片并忽略筛选；
//! 清空搜索后按各区块当前的筛选状态恢复可见性。

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clipboard::Clipboard;
use crate::filter::{text_matches, FilterChange};
use crate::store::{CatalogStore, Theme};
use crate::toast::Toast;
use crate::view::{favorite_title, CardId, PageView};

/// 复制成功提示的恢复时间
pub const COPY_AFFORDANCE: Duration = Duration::from_millis(1000);

/// 用户事件，以分类 id、子分类 id 或卡片 id 定位目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SwitchTab { category: String, subcategory: String },
    ChangeFilter { category: String, change: FilterChange },
    Search { query: String },
    ClearSearch,
    ToggleFavorite { category: String, resource: String },
    CopyLink { card: CardId },
    Visit { card: CardId },
    ToggleTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    FadeInUp,
    Pulse,
}

/// 发往显示层的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    CardVisibility {
        card: CardId,
        visible: bool,
        animation: Option<Animation>,
    },
    TabActive {
        category: String,
        subcategory: String,
        active: bool,
    },
    ContentActive {
        dom_id: String,
        active: bool,
    },
    FavoriteMarker {
        card: CardId,
        active: bool,
        title: &'static str,
    },
    LinkCopied {
        card: CardId,
        revert_after: Duration,
    },
    OpenUrl {
        url: String,
    },
    Theme(Theme),
    TotalResources(String),
}

/// 一次事件处理的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub ops: Vec<DisplayOp>,
    pub toasts: Vec<Toast>,
}

impl Reaction {
    fn toast(mut self, toast: Toast) -> Self {
        self.toasts.push(toast);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Filtered,
    Searching,
}

pub struct PresentationController {
    store: CatalogStore,
    page: PageView,
    clipboard: Box<dyn Clipboard>,
    active_query: Option<String>,
}

impl PresentationController {
    /// 在数据集加载完成 (成功或失败) 之后挂载页面
    pub fn mount(store: CatalogStore, clipboard: Box<dyn Clipboard>) -> Self {
        let page = PageView::build(&store);
        debug!(
            "Mounted page: {} sections, {} cards",
            page.sections.len(),
            page.cards().count()
        );
        Self {
            store,
            page,
            clipboard,
            active_query: None,
        }
    }

    /// 挂载后的初始指令：主题与资源总数
    pub fn initial_ops(&self) -> Vec<DisplayOp> {
        vec![
            DisplayOp::Theme(self.page.theme),
            DisplayOp::TotalResources(self.page.total_label()),
        ]
    }

    pub fn page(&self) -> &PageView {
        &self.page
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    pub fn session_state(&self) -> SessionState {
        if self.active_query.is_some() {
            SessionState::Searching
        } else if self.page.sections.iter().any(|s| !s.filter.is_default()) {
            SessionState::Filtered
        } else {
            SessionState::Idle
        }
    }

    pub fn handle(&mut self, event: UiEvent) -> Reaction {
        debug!("UI event: {:?}", event);
        match event {
            UiEvent::SwitchTab {
                category,
                subcategory,
            } => self.switch_tab(&category, &subcategory),
            UiEvent::ChangeFilter { category, change } => self.change_filter(&category, change),
            UiEvent::Search { query } => self.search(&query),
            UiEvent::ClearSearch => self.clear_search(),
            UiEvent::ToggleFavorite { category, resource } => {
                self.toggle_favorite(&category, &resource)
            }
            UiEvent::CopyLink { card } => self.copy_link(&card),
            UiEvent::Visit { card } => self.visit(&card),
            UiEvent::ToggleTheme => self.toggle_theme(),
        }
    }

    fn switch_tab(&mut self, category: &str, subcategory: &str) -> Reaction {
        let Some(section) = self.page.section_mut(category) else {
            warn!("⚠️  Tab switch for unknown category '{}'", category);
            return Reaction::default();
        };
        if !section.activate_tab(subcategory) {
            warn!("⚠️  No tab '{}' in category '{}'", subcategory, category);
            return Reaction::default();
        }

        let mut reaction = Reaction::default();
        for tab in section.tabs.iter().flatten() {
            reaction.ops.push(DisplayOp::TabActive {
                category: category.to_string(),
                subcategory: tab.subcategory_id.clone(),
                active: tab.active,
            });
        }
        for content in &section.contents {
            reaction.ops.push(DisplayOp::ContentActive {
                dom_id: content.dom_id.clone(),
                active: content.active,
            });
        }
        reaction
    }

    fn change_filter(&mut self, category: &str, change: FilterChange) -> Reaction {
        let Some(index) = self
            .page
            .sections
            .iter()
            .position(|s| s.category_id == category)
        else {
            warn!("⚠️  Filter change for unknown category '{}'", category);
            return Reaction::default();
        };

        self.page.sections[index].filter.apply(change);
        debug!("Filter for '{}': {}", category, self.page.sections[index].filter);

        if self.active_query.is_some() {
            // 搜索结束后才生效
            return Reaction::default();
        }
        let mut reaction = Reaction::default();
        self.apply_section_filter(index, &mut reaction.ops);
        reaction
    }

    fn apply_section_filter(&mut self, index: usize, ops: &mut Vec<DisplayOp>) {
        let section = &mut self.page.sections[index];
        let filter = section.filter;
        for card in section.cards_mut() {
            let visible = filter.matches(&card.tags, card.difficulty, card.status);
            card.visible = visible;
            ops.push(DisplayOp::CardVisibility {
                card: card.id.clone(),
                visible,
                animation: visible.then_some(Animation::FadeInUp),
            });
        }
    }

    fn search(&mut self, query: &str) -> Reaction {
        let query = query.trim();
        if query.is_empty() {
            return self.clear_search();
        }

        self.store.push_search_history(query);
        let needle = query.to_lowercase();

        let mut reaction = Reaction::default();
        let mut matched = 0;
        for card in self.page.cards_mut() {
            let visible = text_matches(&card.search_text, &needle);
            card.visible = visible;
            if visible {
                matched += 1;
            }
            reaction.ops.push(DisplayOp::CardVisibility {
                card: card.id.clone(),
                visible,
                animation: visible.then_some(Animation::Pulse),
            });
        }
        self.active_query = Some(needle);

        if matched == 0 {
            info!("没有找到匹配的资源: {}", query);
            reaction.toast(Toast::info("没有找到匹配的资源，请尝试其他关键词"))
        } else {
            info!("🔍 '{}' matched {} resources", query, matched);
            reaction.toast(Toast::success(format!("找到 {} 个相关资源", matched)))
        }
    }

    fn clear_search(&mut self) -> Reaction {
        self.active_query = None;
        let mut reaction = Reaction::default();
        for index in 0..self.page.sections.len() {
            self.apply_section_filter(index, &mut reaction.ops);
        }
        reaction
    }

    fn toggle_favorite(&mut self, category: &str, resource: &str) -> Reaction {
        let Some(section) = self.page.section_mut(category) else {
            warn!("⚠️  Favorite toggle for unknown category '{}'", category);
            return Reaction::default();
        };
        if !section.cards().any(|c| c.name == resource) {
            warn!("⚠️  No resource '{}' in category '{}'", resource, category);
            return Reaction::default();
        }

        let favorite = self.store.toggle_favorite(category, resource);
        let mut reaction = Reaction::default();
        for card in section.cards_mut().filter(|c| c.name == resource) {
            card.favorite = favorite;
            reaction.ops.push(DisplayOp::FavoriteMarker {
                card: card.id.clone(),
                active: favorite,
                title: favorite_title(favorite),
            });
        }
        reaction
    }

    fn copy_link(&mut self, card_id: &CardId) -> Reaction {
        let Some(card) = self.page.card(card_id) else {
            warn!("⚠️  Copy requested for unknown card '{}'", card_id);
            return Reaction::default();
        };

        match self.clipboard.copy(&card.url) {
            Ok(()) => Reaction {
                ops: vec![DisplayOp::LinkCopied {
                    card: card_id.clone(),
                    revert_after: COPY_AFFORDANCE,
                }],
                toasts: Vec::new(),
            },
            Err(e) => {
                warn!("⚠️  复制失败: {}", e);
                Reaction::default()
            }
        }
    }

    fn visit(&mut self, card_id: &CardId) -> Reaction {
        let Some(card) = self.page.card(card_id) else {
            warn!("⚠️  Visit requested for unknown card '{}'", card_id);
            return Reaction::default();
        };
        let (category, subcategory, name) = (
            card.category_id.clone(),
            card.subcategory_id.clone(),
            card.name.clone(),
        );
        let Some(url) = self
            .store
            .lookup(&category, &subcategory, &name)
            .map(|r| r.url.clone())
        else {
            warn!("⚠️  Card '{}' has no resource in the catalog", card_id);
            return Reaction::default();
        };

        self.store.record_visit(&category, &name);
        Reaction {
            ops: vec![DisplayOp::OpenUrl { url }],
            toasts: Vec::new(),
        }
    }

    fn toggle_theme(&mut self) -> Reaction {
        let theme = self.store.toggle_theme();
        self.page.theme = theme;
        Reaction {
            ops: vec![DisplayOp::Theme(theme)],
            toasts: Vec::new(),
        }
        .toast(Toast::success(format!("已切换到{}模式", theme.label())))
    }
}
