use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::debug;

use crate::error::LoadError;

/// 资源难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "初级")]
    Beginner,
    #[serde(rename = "中级")]
    Intermediate,
    #[serde(rename = "高级")]
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "初级",
            Difficulty::Intermediate => "中级",
            Difficulty::Advanced => "高级",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == value)
    }
}

/// 资源访问状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Limited,
    Inactive,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Limited, Status::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Limited => "limited",
            Status::Inactive => "inactive",
        }
    }

    /// 状态指示灯的提示文字
    pub fn text(&self) -> &'static str {
        match self {
            Status::Active => "正常访问",
            Status::Limited => "访问受限",
            Status::Inactive => "暂不可用",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subcategory {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(deserialize_with = "ordered_entries")]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

/// 已加载的资源目录，分类按文档顺序排列
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(deserialize_with = "ordered_entries")]
    categories: Vec<Category>,
}

impl Catalog {
    /// 解析并校验数据集文档
    pub fn from_json(document: &str) -> Result<Self, LoadError> {
        let catalog: Catalog = serde_json::from_str(document)?;
        catalog.check_unique_names()?;
        Ok(catalog)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn find(&self, category: &str, subcategory: &str, name: &str) -> Option<&Resource> {
        self.category(category)?
            .subcategory(subcategory)?
            .resources
            .iter()
            .find(|r| r.name == name)
    }

    /// 遍历所有资源 (分类, 子分类, 资源)
    pub fn iter_resources(&self) -> impl Iterator<Item = (&Category, &Subcategory, &Resource)> {
        self.categories.iter().flat_map(|category| {
            category.subcategories.iter().flat_map(move |sub| {
                sub.resources.iter().map(move |resource| (category, sub, resource))
            })
        })
    }

    pub fn total_resource_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.subcategories.iter())
            .map(|s| s.resources.len())
            .sum()
    }

    fn check_unique_names(&self) -> Result<(), LoadError> {
        for category in &self.categories {
            for sub in &category.subcategories {
                let mut seen = HashSet::new();
                for resource in &sub.resources {
                    if !seen.insert(resource.name.as_str()) {
                        return Err(LoadError::DuplicateResource {
                            category: category.id.clone(),
                            subcategory: sub.id.clone(),
                            name: resource.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// 收藏与访问记录使用的复合键 `categoryId/resourceName`
pub fn composite_key(category_id: &str, resource_name: &str) -> String {
    format!("{}/{}", category_id, resource_name)
}

/// 以 JSON 对象的键作为 id 的条目
trait Keyed {
    fn set_id(&mut self, id: String);
    fn id(&self) -> &str;
}

impl Keyed for Category {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for Subcategory {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn id(&self) -> &str {
        &self.id
    }
}

/// 按文档顺序把 `{ id: value }` 对象解析为列表；重复键以后出现的为准
fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Keyed,
{
    struct EntriesVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for EntriesVisitor<T>
    where
        T: Deserialize<'de> + Keyed,
    {
        type Value = Vec<T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an object keyed by id")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries: Vec<T> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, mut value)) = map.next_entry::<String, T>()? {
                value.set_id(id);
                match entries.iter_mut().find(|e| e.id() == value.id()) {
                    Some(existing) => *existing = value,
                    None => entries.push(value),
                }
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// 数据集来源：本地文件或 http(s) 地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// 获取并解析数据集
pub async fn fetch(source: &DataSource) -> Result<Catalog, LoadError> {
    let body = match source {
        DataSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?,
        DataSource::Url(url) => {
            let response = reqwest::get(url)
                .await
                .map_err(|source| LoadError::Transport {
                    url: url.clone(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            response.text().await.map_err(|source| LoadError::Transport {
                url: url.clone(),
                source,
            })?
        }
    };

    debug!("Fetched {} bytes from {}", body.len(), source);
    Catalog::from_json(&body)
}
