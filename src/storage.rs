//! 本地键值持久化
//!
//! 目录状态 (收藏、搜索历史、访问记录、主题) 以 JSON 文本写入键值存储，
//! 每次变更整体覆盖对应键并立即落盘。

use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

use crate::error::PersistenceError;

pub trait KeyValueStore {
    fn backend_name(&self) -> &'static str;
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// 可选的存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    /// 每个键一个 JSON 文件
    #[default]
    Json,
    /// 单个 SQLite 数据库
    Sqlite,
    /// 仅当前进程内有效，不落盘
    Memory,
}

/// 在状态目录下打开指定后端
pub fn open_backend(
    kind: BackendKind,
    state_dir: &Path,
) -> Result<Box<dyn KeyValueStore>, PersistenceError> {
    match kind {
        BackendKind::Json => Ok(Box::new(JsonFileStore::new(state_dir))),
        BackendKind::Memory => Ok(Box::new(MemoryStore::default())),
        BackendKind::Sqlite => {
            fs::create_dir_all(state_dir).map_err(|source| PersistenceError::Io {
                path: state_dir.to_path_buf(),
                source,
            })?;
            Ok(Box::new(SqliteStore::open(&state_dir.join("state.sqlite"))?))
        }
    }
}

/// 每个键保存为 `<dir>/<key>.json`
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| PersistenceError::Io { path, source })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Persisted {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

/// `kv(key, value)` 表
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }
}

/// 进程内存储，克隆体共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
