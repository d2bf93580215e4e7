//! 筛选条件与匹配规则
//!
//! 卡片可见当且仅当标签、难度、状态三个维度同时满足 (逻辑与)。
//! 每个维度取值为 "all" 或其枚举域中的一个值。

use std::borrow::Cow;
use std::fmt;

use crate::catalog::{Difficulty, Status};
use crate::error::InputError;

/// 标签筛选的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Free,
    Paid,
    Chinese,
    English,
    Mirror,
    Registration,
}

impl TagClass {
    pub const ALL: [TagClass; 6] = [
        TagClass::Free,
        TagClass::Paid,
        TagClass::Chinese,
        TagClass::English,
        TagClass::Mirror,
        TagClass::Registration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagClass::Free => "free",
            TagClass::Paid => "paid",
            TagClass::Chinese => "chinese",
            TagClass::English => "english",
            TagClass::Mirror => "mirror",
            TagClass::Registration => "registration",
        }
    }

    /// 筛选下拉框中的显示文字
    pub fn label(&self) -> &'static str {
        match self {
            TagClass::Free => "免费",
            TagClass::Paid => "付费",
            TagClass::Chinese => "中文",
            TagClass::English => "英文",
            TagClass::Mirror => "镜像站",
            TagClass::Registration => "需注册",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// 标签到类别的映射；未收录的标签以自身小写形式作为类别
pub fn tag_class(tag: &str) -> Cow<'static, str> {
    match tag {
        "免费" => Cow::Borrowed("free"),
        "付费" => Cow::Borrowed("paid"),
        "需注册" => Cow::Borrowed("registration"),
        "中文" => Cow::Borrowed("chinese"),
        "英文" => Cow::Borrowed("english"),
        "镜像站" => Cow::Borrowed("mirror"),
        other => Cow::Owned(other.to_lowercase()),
    }
}

/// 某一维度的取值: 全部或特定值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Tags,
    Difficulty,
    Status,
}

impl FilterDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDimension::Tags => "tags",
            FilterDimension::Difficulty => "difficulty",
            FilterDimension::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Result<Self, InputError> {
        match value {
            "tags" | "tag" => Ok(FilterDimension::Tags),
            "difficulty" => Ok(FilterDimension::Difficulty),
            "status" => Ok(FilterDimension::Status),
            other => Err(InputError::UnknownDimension(other.to_string())),
        }
    }
}

/// 单个筛选框的变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Tags(Choice<TagClass>),
    Difficulty(Choice<Difficulty>),
    Status(Choice<Status>),
}

impl FilterChange {
    /// 解析筛选框的值，"all" 表示不限
    pub fn parse(dimension: FilterDimension, value: &str) -> Result<Self, InputError> {
        let unknown = || InputError::UnknownFilterValue {
            dimension: dimension.as_str(),
            value: value.to_string(),
        };
        let all = value == "all";

        Ok(match dimension {
            FilterDimension::Tags if all => FilterChange::Tags(Choice::All),
            FilterDimension::Tags => {
                FilterChange::Tags(Choice::Only(TagClass::parse(value).ok_or_else(unknown)?))
            }
            FilterDimension::Difficulty if all => FilterChange::Difficulty(Choice::All),
            FilterDimension::Difficulty => FilterChange::Difficulty(Choice::Only(
                Difficulty::parse(value).ok_or_else(unknown)?,
            )),
            FilterDimension::Status if all => FilterChange::Status(Choice::All),
            FilterDimension::Status => {
                FilterChange::Status(Choice::Only(Status::parse(value).ok_or_else(unknown)?))
            }
        })
    }
}

/// 某个分类区块当前的筛选状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub tag: Choice<TagClass>,
    pub difficulty: Choice<Difficulty>,
    pub status: Choice<Status>,
}

impl FilterState {
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Tags(choice) => self.tag = choice,
            FilterChange::Difficulty(choice) => self.difficulty = choice,
            FilterChange::Status(choice) => self.status = choice,
        }
    }

    pub fn is_default(&self) -> bool {
        self.tag.is_all() && self.difficulty.is_all() && self.status.is_all()
    }

    pub fn matches(&self, tags: &[String], difficulty: Difficulty, status: Status) -> bool {
        let matches_tags = match self.tag {
            Choice::All => true,
            Choice::Only(class) => tags.iter().any(|t| tag_class(t) == class.as_str()),
        };
        matches_tags && self.difficulty.admits(&difficulty) && self.status.admits(&status)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.tag {
            Choice::All => "all",
            Choice::Only(c) => c.as_str(),
        };
        let difficulty = match self.difficulty {
            Choice::All => "all",
            Choice::Only(d) => d.label(),
        };
        let status = match self.status {
            Choice::All => "all",
            Choice::Only(s) => s.as_str(),
        };
        write!(f, "tags={} difficulty={} status={}", tag, difficulty, status)
    }
}

/// 搜索匹配：不区分大小写的子串包含
pub fn text_matches(text: &str, query: &str) -> bool {
    text.to_lowercase().contains(&query.trim().to_lowercase())
}
