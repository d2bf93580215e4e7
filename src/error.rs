//! 错误分类
//!
//! 所有错误对页面都是非致命的：数据集加载失败时目录保持为空，
//! 持久化读取失败时回退为空默认值，剪贴板失败时只记录日志。

use std::path::PathBuf;
use thiserror::Error;

/// 数据集获取或解析失败
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dataset request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate resource '{name}' in {category}/{subcategory}")]
    DuplicateResource {
        category: String,
        subcategory: String,
        name: String,
    },
}

/// 本地持久化存储的读写失败
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 复制链接失败
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// 命令行或交互输入无法解析
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown {dimension} filter value '{value}'")]
    UnknownFilterValue { dimension: &'static str, value: String },

    #[error("unknown filter dimension '{0}' (expected tags, difficulty or status)")]
    UnknownDimension(String),

    #[error("unknown command '{0}', type 'help' for the command list")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}
