//! 单元测试共享的数据集

use crate::catalog::Catalog;
use crate::storage::MemoryStore;
use crate::store::CatalogStore;

/// domestic 含 mirror (2 条) 与 vpn (1 条)；tools 仅一个子分类 api
pub const FIXTURE: &str = r#"{
  "categories": {
    "domestic": {
      "title": "国内资源",
      "icon": "fas fa-flag",
      "subcategories": {
        "mirror": {
          "title": "镜像站",
          "resources": [
            {
              "name": "清华镜像",
              "description": "开源软件镜像站",
              "url": "https://mirrors.tuna.tsinghua.edu.cn",
              "tags": ["免费", "中文", "镜像站"],
              "difficulty": "初级",
              "status": "active"
            },
            {
              "name": "知网",
              "description": "学术文献数据库",
              "url": "https://www.cnki.net",
              "tags": ["付费", "中文", "需注册"],
              "difficulty": "中级",
              "status": "limited"
            }
          ]
        },
        "vpn": {
          "title": "学术VPN",
          "resources": [
            {
              "name": "校园VPN",
              "description": "校外访问图书馆资源",
              "url": "https://vpn.example.edu",
              "tags": ["付费", "需注册"],
              "difficulty": "高级",
              "status": "active"
            }
          ]
        }
      }
    },
    "tools": {
      "title": "计算工具",
      "icon": "fas fa-flask",
      "subcategories": {
        "api": {
          "title": "数据接口",
          "resources": [
            {
              "name": "Materials Project",
              "description": "Open REST API for computed materials data",
              "url": "https://materialsproject.org",
              "tags": ["免费", "英文", "需注册"],
              "difficulty": "高级",
              "status": "active"
            },
            {
              "name": "PubChem",
              "description": "化合物数据库",
              "url": "https://pubchem.ncbi.nlm.nih.gov",
              "tags": ["免费", "英文"],
              "difficulty": "初级"
            }
          ]
        }
      }
    }
  }
}"#;

pub fn fixture_catalog() -> Catalog {
    Catalog::from_json(FIXTURE).expect("fixture parses")
}

/// 已加载数据集、使用内存存储的目录
pub fn loaded_store() -> CatalogStore {
    let mut store = CatalogStore::open(Box::new(MemoryStore::default()));
    store.install(fixture_catalog());
    store
}
