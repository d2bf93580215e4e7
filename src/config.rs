use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::{error, warn, Level};

use crate::catalog::DataSource;
use crate::storage::{open_backend, BackendKind, KeyValueStore, MemoryStore};
use crate::store::CatalogStore;

/// 数据集默认位置
pub const DEFAULT_DATA: &str = "data/resources.json";

/// 运行配置
/// 由命令行参数与环境变量合成
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 数据集来源 (文件路径或 http(s) 地址)
    pub data: DataSource,

    /// 本地状态目录
    pub state_dir: PathBuf,

    /// 状态存储后端
    pub backend: BackendKind,

    /// 详细输出
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataSource::parse(DEFAULT_DATA),
            state_dir: default_state_dir(),
            backend: BackendKind::default(),
            verbose: false,
        }
    }
}

/// `$HOME/.resource-catalog`，没有 HOME 时使用当前目录
pub fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".resource-catalog")
}

impl AppConfig {
    pub fn new(data: &str, state_dir: Option<PathBuf>, backend: BackendKind, verbose: bool) -> Self {
        Self {
            data: DataSource::parse(data.trim()),
            state_dir: state_dir.unwrap_or_else(default_state_dir),
            backend,
            verbose,
        }
    }

    /// 验证配置
    /// 数据集文件缺失不算配置错误，加载时会给出可见的失败提示
    pub fn validate(&self) -> Result<()> {
        // 1. 数据集来源不能为空
        match &self.data {
            DataSource::File(path) if path.as_os_str().is_empty() => {
                return Err(anyhow!("❌ Error: --data must name a dataset file or URL"));
            }
            DataSource::File(path) if path.is_dir() => {
                return Err(anyhow!(
                    "❌ Error: dataset path {:?} is a directory, expected a JSON file",
                    path
                ));
            }
            DataSource::File(path) if !path.exists() => {
                warn!("⚠️  Dataset file {:?} does not exist", path);
            }
            _ => {}
        }

        // 2. 状态目录若已存在必须是目录
        if self.state_dir.exists() && !self.state_dir.is_dir() {
            return Err(anyhow!(
                "❌ Error: state dir {:?} exists and is not a directory",
                self.state_dir
            ));
        }

        Ok(())
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// 打开状态后端并读取已持久化的用户状态
    /// 后端无法打开时退回内存存储，本次运行的变更不会落盘
    pub fn open_store(&self) -> CatalogStore {
        let backend = open_backend(self.backend, &self.state_dir).unwrap_or_else(|e| -> Box<dyn KeyValueStore> {
            error!(
                "❌ Failed to open {:?} state store in {:?}: {}",
                self.backend, self.state_dir, e
            );
            warn!("⚠️  Falling back to in-memory state, changes will not be saved");
            Box::new(MemoryStore::default())
        });
        CatalogStore::open(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_points_at_bundled_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.data, DataSource::File(PathBuf::from(DEFAULT_DATA)));
        assert!(config.state_dir.ends_with(".resource-catalog"));
        assert_eq!(config.backend, BackendKind::Json);
        assert_eq!(config.log_level(), Level::INFO);
    }

    #[test]
    fn test_url_source_and_explicit_state_dir() {
        let config = AppConfig::new(
            " https://example.com/resources.json ",
            Some(PathBuf::from("/tmp/state")),
            BackendKind::Sqlite,
            true,
        );
        assert_eq!(
            config.data,
            DataSource::Url("https://example.com/resources.json".to_string())
        );
        assert_eq!(config.state_dir, PathBuf::from("/tmp/state"));
        assert_eq!(config.log_level(), Level::DEBUG);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_paths() {
        let dir = TempDir::new().unwrap();

        let empty = AppConfig::new("", Some(dir.path().to_path_buf()), BackendKind::Json, false);
        assert!(empty.validate().is_err());

        let directory = AppConfig::new(
            dir.path().to_str().unwrap(),
            Some(dir.path().to_path_buf()),
            BackendKind::Json,
            false,
        );
        assert!(directory.validate().is_err());

        let file = dir.path().join("state-file");
        std::fs::write(&file, "x").unwrap();
        let state_is_file = AppConfig::new("missing.json", Some(file), BackendKind::Json, false);
        assert!(state_is_file.validate().is_err());
    }

    #[test]
    fn test_missing_dataset_is_not_a_config_error() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::new(
            dir.path().join("nope.json").to_str().unwrap(),
            Some(dir.path().join("state")),
            BackendKind::Json,
            false,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_store_with_sqlite_backend() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::new(DEFAULT_DATA, Some(dir.path().join("state")), BackendKind::Sqlite, false);
        let mut store = config.open_store();
        store.toggle_favorite("domestic", "知网");
        drop(store);

        let reopened = config.open_store();
        assert!(reopened.is_favorite("domestic", "知网"));
        assert!(dir.path().join("state").join("state.sqlite").exists());
    }

    #[test]
    fn test_corrupt_sqlite_state_falls_back_to_memory() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state");
        std::fs::create_dir_all(&state).unwrap();
        std::fs::write(state.join("state.sqlite"), "this is not a database").unwrap();
        let config = AppConfig::new(DEFAULT_DATA, Some(state.clone()), BackendKind::Sqlite, false);

        let mut store = config.open_store();
        assert_eq!(store.favorites().count(), 0);
        assert!(store.toggle_favorite("domestic", "知网"));
        assert!(store.is_favorite("domestic", "知网"));

        // 损坏的文件保持原样
        let junk = std::fs::read_to_string(state.join("state.sqlite")).unwrap();
        assert_eq!(junk, "this is not a database");
    }
}
