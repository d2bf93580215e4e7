//! 视图模型到 HTML 的渲染
//!
//! 所有文本与属性都经过转义；卡片的查询属性 (标签、难度、状态) 以
//! `data-*` 形式写出，筛选无需回读目录。

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use scraper::Html;
use std::fmt::Write;

use crate::catalog::{Difficulty, Status};
use crate::filter::{tag_class, Choice, FilterState, TagClass};
use crate::view::{CardView, PageView, SectionView, TabContentView};

/// 渲染完整页面
pub fn render_page(page: &PageView) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"zh-CN\" data-theme=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>资源导航</title>\n</head>\n<body>\n",
        page.theme.as_str()
    );
    let _ = write!(
        out,
        "<header class=\"hero\">\n<div class=\"stats\"><span id=\"totalResources\">{}</span> 个资源</div>\n\
         <div class=\"search-box\"><input id=\"searchInput\" type=\"search\" placeholder=\"搜索资源...\"></div>\n</header>\n",
        text(&page.total_label())
    );
    out.push_str("<main id=\"dynamic-sections\">\n");
    for section in &page.sections {
        render_section(&mut out, section);
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn render_section(out: &mut String, section: &SectionView) {
    let _ = write!(
        out,
        "<section id=\"{}\" class=\"resource-section\">\n<div class=\"container\">\n\
         <h2><i class=\"{}\"></i> {}</h2>\n",
        attr(&section.category_id),
        attr(&section.icon),
        text(&section.title)
    );

    if let Some(tabs) = &section.tabs {
        let _ = writeln!(
            out,
            "<div class=\"subcategory-tabs\" data-category=\"{}\">",
            attr(&section.category_id)
        );
        for tab in tabs {
            let _ = writeln!(
                out,
                "<button class=\"tab-btn{}\" data-tab=\"{}-{}\"><span class=\"status-dot {}\"></span>{}</button>",
                if tab.active { " active" } else { "" },
                attr(&section.category_id),
                attr(&tab.subcategory_id),
                tab.status_dot,
                text(&tab.title)
            );
        }
        out.push_str("</div>\n");
    }

    render_filter_bar(out, &section.category_id, &section.filter);

    for content in &section.contents {
        render_tab_content(out, content);
    }
    out.push_str("</div>\n</section>\n");
}

fn render_filter_bar(out: &mut String, category_id: &str, filter: &FilterState) {
    let _ = writeln!(
        out,
        "<div class=\"filter-bar\" data-category=\"{}\">",
        attr(category_id)
    );

    let tag_options: Vec<(&str, &str, bool)> = TagClass::ALL
        .iter()
        .map(|c| (c.as_str(), c.label(), filter.tag == Choice::Only(*c)))
        .collect();
    render_select(out, "tags", "全部标签", filter.tag.is_all(), &tag_options);

    let difficulty_options: Vec<(&str, &str, bool)> = Difficulty::ALL
        .iter()
        .map(|d| (d.label(), d.label(), filter.difficulty == Choice::Only(*d)))
        .collect();
    render_select(out, "difficulty", "全部难度", filter.difficulty.is_all(), &difficulty_options);

    let status_options: Vec<(&str, &str, bool)> = Status::ALL
        .iter()
        .map(|s| (s.as_str(), status_option_label(*s), filter.status == Choice::Only(*s)))
        .collect();
    render_select(out, "status", "全部状态", filter.status.is_all(), &status_options);

    out.push_str("</div>\n");
}

fn render_select(
    out: &mut String,
    dimension: &str,
    all_label: &str,
    all_selected: bool,
    options: &[(&str, &str, bool)],
) {
    let _ = writeln!(out, "<select class=\"filter-select\" data-filter=\"{}\">", dimension);
    let _ = writeln!(
        out,
        "<option value=\"all\"{}>{}</option>",
        selected(all_selected),
        all_label
    );
    for (value, label, is_selected) in options {
        let _ = writeln!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            attr(value),
            selected(*is_selected),
            text(label)
        );
    }
    out.push_str("</select>\n");
}

fn selected(yes: bool) -> &'static str {
    if yes {
        " selected"
    } else {
        ""
    }
}

fn status_option_label(status: Status) -> &'static str {
    match status {
        Status::Active => "正常",
        Status::Limited => "受限",
        Status::Inactive => "不可用",
    }
}

fn render_tab_content(out: &mut String, content: &TabContentView) {
    let _ = writeln!(
        out,
        "<div class=\"tab-content{}\" id=\"{}\">\n<div class=\"resource-grid\">",
        if content.active { " active" } else { "" },
        attr(&content.dom_id)
    );
    for card in &content.cards {
        out.push_str(&card_html(card));
    }
    out.push_str("</div>\n</div>\n");
}

/// 单张资源卡片
pub fn card_html(card: &CardView) -> String {
    let mut out = String::new();
    let key = card.favorite_key();

    let _ = writeln!(
        out,
        "<div class=\"resource-card\" data-card=\"{}\" data-tags=\"{}\" data-difficulty=\"{}\" data-status=\"{}\"{}>",
        attr(card.id.as_str()),
        attr(&card.tags.join(",")),
        card.difficulty.label(),
        card.status.as_str(),
        if card.visible { "" } else { " style=\"display: none\"" }
    );
    let _ = writeln!(
        out,
        "<div class=\"card-header\"><h3>{}</h3>\n<div class=\"card-status\">\
         <span class=\"status-indicator {}\" title=\"{}\"></span><span class=\"last-checked\">今日验证</span></div></div>",
        text(&card.name),
        card.status.as_str(),
        card.status.text()
    );

    let _ = write!(
        out,
        "<div class=\"card-body\"><p>{}</p>\n<div class=\"tags\">",
        text(&card.description)
    );
    for tag in &card.tags {
        let _ = write!(
            out,
            "<span class=\"tag {}\">{}</span> ",
            attr(&tag_class(tag)),
            text(tag)
        );
    }
    out.push_str("</div></div>\n");

    let _ = writeln!(
        out,
        "<div class=\"card-footer\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"resource-link\" data-visit=\"{}\">\
         访问网站 <i class=\"fas fa-external-link-alt\"></i></a><div class=\"card-actions\">\
         <button class=\"btn-icon{}\" title=\"{}\" data-favorite=\"{}\"><i class=\"fa{} fa-heart\"></i></button>\
         <button class=\"btn-icon\" title=\"复制链接\" data-copy=\"{}\"><i class=\"fas fa-link\"></i></button></div></div>",
        attr(&card.url),
        attr(&key),
        if card.favorite { " active" } else { "" },
        card.favorite_title(),
        attr(&key),
        if card.favorite { "s" } else { "r" },
        attr(&card.url)
    );
    out.push_str("</div>\n");
    out
}

/// 卡片渲染后的文本内容，连续空白折叠为单个空格
pub fn card_text(card: &CardView) -> String {
    let fragment = Html::parse_fragment(&card_html(card));
    let raw: String = fragment.root_element().text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
