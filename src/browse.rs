//! 交互式浏览
//!
//! 从输入逐行读取命令，转换为 [`UiEvent`] 交给控制器处理，并把显示指令
//! 与提示消息写到输出。一次只处理一个事件。

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::controller::{DisplayOp, PresentationController, Reaction, SessionState, UiEvent};
use crate::error::InputError;
use crate::filter::{FilterChange, FilterDimension};
use crate::view::{CardId, PageView};

pub const HELP: &str = "\
Commands:
  show                                   list sections and visible cards
  tab <category> <subcategory>           switch tab
  filter <category> <dimension> <value>  dimension: tags | difficulty | status, value 'all' resets
  search <query>                         full-text search across all sections
  clear                                  end the search
  fav <category> <resource name>         toggle favorite
  copy <category>/<subcategory>/<name>   copy link
  open <category>/<subcategory>/<name>   visit resource
  theme                                  toggle light/dark
  history                                recent searches
  help                                   this text
  quit                                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    Show,
    History,
    Help,
    Quit,
}

/// 解析一行输入；空行返回 `None`
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "show" | "ls" => Command::Show,
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "theme" => Command::Event(UiEvent::ToggleTheme),
        "clear" => Command::Event(UiEvent::ClearSearch),
        "search" | "/" => Command::Event(UiEvent::Search {
            query: rest.to_string(),
        }),
        "tab" => {
            let (category, subcategory) =
                two_words(rest).ok_or(InputError::Usage("tab <category> <subcategory>"))?;
            Command::Event(UiEvent::SwitchTab {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            })
        }
        "filter" => {
            let usage = InputError::Usage("filter <category> <dimension> <value>");
            let mut parts = rest.split_whitespace();
            let (Some(category), Some(dimension), Some(value), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(usage);
            };
            let change = FilterChange::parse(FilterDimension::parse(dimension)?, value)?;
            Command::Event(UiEvent::ChangeFilter {
                category: category.to_string(),
                change,
            })
        }
        "fav" | "favorite" => {
            let (category, resource) =
                two_words(rest).ok_or(InputError::Usage("fav <category> <resource name>"))?;
            Command::Event(UiEvent::ToggleFavorite {
                category: category.to_string(),
                resource: resource.to_string(),
            })
        }
        "copy" => Command::Event(UiEvent::CopyLink {
            card: parse_card_id(rest)
                .ok_or(InputError::Usage("copy <category>/<subcategory>/<name>"))?,
        }),
        "open" | "visit" => Command::Event(UiEvent::Visit {
            card: parse_card_id(rest)
                .ok_or(InputError::Usage("open <category>/<subcategory>/<name>"))?,
        }),
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// 第一个词与其余部分 (资源名可能含空格)
fn two_words(rest: &str) -> Option<(&str, &str)> {
    let (first, second) = rest.split_once(char::is_whitespace)?;
    let second = second.trim();
    (!second.is_empty()).then_some((first, second))
}

/// `category/subcategory/name`，名称中可以再含 `/`
pub fn parse_card_id(value: &str) -> Option<CardId> {
    let mut parts = value.trim().splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(c), Some(s), Some(n)) if !c.is_empty() && !s.is_empty() && !n.is_empty() => {
            Some(CardId::new(c, s, n))
        }
        _ => None,
    }
}

/// 各区块的可见卡片列表
pub fn summary(page: &PageView) -> String {
    let mut out = String::new();
    for section in &page.sections {
        let _ = write!(
            out,
            "📂 {} ({}) [{}] {}/{} visible",
            section.title,
            section.category_id,
            section.filter,
            section.visible_count(),
            section.cards().count()
        );
        match section.active_subcategory() {
            Some(tab) if section.tabs.is_some() => {
                let _ = writeln!(out, " · tab {}", tab);
            }
            _ => out.push('\n'),
        }
        for content in &section.contents {
            let marker = if content.active { "▸" } else { " " };
            for card in content.cards.iter().filter(|c| c.visible) {
                let _ = writeln!(
                    out,
                    "  {} {}{}  {}  {}",
                    marker,
                    card.name,
                    if card.favorite { " ❤️" } else { "" },
                    card.id,
                    card.url
                );
            }
        }
    }
    if page.sections.is_empty() {
        out.push_str("(no sections)\n");
    }
    out
}

/// 当前会话状态：空闲、已筛选或搜索中
pub fn session_line(controller: &PresentationController) -> String {
    match (controller.session_state(), controller.active_query()) {
        (SessionState::Searching, Some(query)) => format!("🧭 searching '{}'", query),
        (SessionState::Searching, None) => "🧭 searching".to_string(),
        (SessionState::Filtered, _) => "🧭 filtered".to_string(),
        (SessionState::Idle, _) => "🧭 idle".to_string(),
    }
}

/// 事件结果的文字描述
pub fn describe(page: &PageView, reaction: &Reaction) -> String {
    let mut out = String::new();
    let mut visibility_changed = false;

    for op in &reaction.ops {
        match op {
            DisplayOp::CardVisibility { .. } => visibility_changed = true,
            DisplayOp::TabActive {
                category,
                subcategory,
                active: true,
            } => {
                let _ = writeln!(out, "📑 {} → {}", category, subcategory);
            }
            DisplayOp::TabActive { .. } | DisplayOp::ContentActive { .. } => {}
            DisplayOp::FavoriteMarker { card, active, .. } => {
                let _ = writeln!(
                    out,
                    "{} {}",
                    if *active { "❤️  已收藏" } else { "🤍 已取消收藏" },
                    card
                );
            }
            DisplayOp::LinkCopied { card, .. } => {
                let _ = writeln!(out, "🔗 已复制 {}", card);
            }
            DisplayOp::OpenUrl { url } => {
                let _ = writeln!(out, "🌐 {}", url);
            }
            DisplayOp::Theme(theme) => {
                let _ = writeln!(out, "🎨 theme = {}", theme.as_str());
            }
            DisplayOp::TotalResources(label) => {
                let _ = writeln!(out, "📊 {} 个资源", label);
            }
        }
    }
    if visibility_changed {
        let _ = writeln!(
            out,
            "👁  {}/{} cards visible",
            page.visible_count(),
            page.cards().count()
        );
    }
    for toast in &reaction.toasts {
        let _ = writeln!(out, "{}", toast);
    }
    out
}

/// 运行交互循环直到输入结束或 `quit`
pub async fn run<R, W>(controller: &mut PresentationController, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("🧭 Interactive browsing started, type 'help' for commands");
    for op in controller.initial_ops() {
        if let DisplayOp::TotalResources(label) = op {
            writeln!(out, "📊 {} 个资源", label)?;
        }
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "⚠️  {}", e)?;
                continue;
            }
        };
        debug!("Command: {:?}", command);

        match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Show => {
                writeln!(out, "{}", session_line(controller))?;
                write!(out, "{}", summary(controller.page()))?;
            }
            Command::History => {
                let history = controller.store().search_history();
                if history.is_empty() {
                    writeln!(out, "(no searches yet)")?;
                }
                for query in history {
                    writeln!(out, "  • {}", query)?;
                }
            }
            Command::Event(event) => {
                let reaction = controller.handle(event);
                write!(out, "{}", describe(controller.page(), &reaction))?;
            }
        }
        out.flush()?;
    }

    info!("👋 Interactive browsing finished");
    Ok(())
}
