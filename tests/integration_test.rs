// Integration tests for resource-catalog
// Run with: cargo test --test integration_test

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const DATASET: &str = r#"{
  "categories": {
    "domestic": {
      "title": "国内资源",
      "icon": "fas fa-flag",
      "subcategories": {
        "mirror": {
          "title": "镜像站",
          "resources": [
            { "name": "清华镜像", "description": "开源软件镜像站", "url": "https://mirrors.tuna.tsinghua.edu.cn",
              "tags": ["免费", "中文", "镜像站"], "difficulty": "初级", "status": "active" },
            { "name": "知网", "description": "学术文献数据库", "url": "https://www.cnki.net",
              "tags": ["付费", "中文", "需注册"], "difficulty": "中级", "status": "limited" }
          ]
        },
        "vpn": {
          "title": "学术VPN",
          "resources": [
            { "name": "校园VPN", "description": "校外访问图书馆资源", "url": "https://vpn.example.edu",
              "tags": ["付费", "需注册"], "difficulty": "高级", "status": "active" }
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
            { "name": "Materials Project", "description": "Open REST API for computed materials data",
              "url": "https://materialsproject.org", "tags": ["免费", "英文", "需注册"],
              "difficulty": "高级", "status": "active" },
            { "name": "PubChem", "description": "化合物数据库", "url": "https://pubchem.ncbi.nlm.nih.gov",
              "tags": ["免费", "英文"], "difficulty": "初级" }
          ]
        }
      }
    }
  }
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("resources.json"), DATASET).expect("Failed to write dataset");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self, data: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_resource-catalog"));
        cmd.env_remove("RESOURCE_CATALOG_DATA")
            .env_remove("RESOURCE_CATALOG_STATE_DIR")
            .env_remove("RUST_LOG")
            .env("HOME", self.path())
            .arg("--data")
            .arg(data)
            .arg("--state-dir")
            .arg(self.path().join("state"))
            .args(args);
        cmd
    }

    fn run(&self, args: &[&str]) -> (bool, String, String) {
        self.run_with_data(&self.path().join("resources.json"), args)
    }

    fn run_with_data(&self, data: &Path, args: &[&str]) -> (bool, String, String) {
        let output = self
            .command(data, args)
            .output()
            .expect("Failed to execute command");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        (output.status.success(), stdout, stderr)
    }
}

#[test]
fn test_stats_command() {
    let ws = Workspace::new();
    let (success, stdout, stderr) = ws.run(&["stats", "--detailed"]);

    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Resource Catalog Report"));
    assert!(stdout.contains("国内资源 (domestic): 3 resources"));
    assert!(stdout.contains("📊 Summary: 5+ resources in 2 categories"));

    println!("✅ stats command works");
}

#[test]
fn test_render_to_file() {
    let ws = Workspace::new();
    let out = ws.path().join("index.html");
    let (success, _, stderr) = ws.run(&["render", "--output", out.to_str().unwrap()]);

    assert!(success, "render failed: {}", stderr);
    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("id=\"totalResources\">5+</span>"));
    assert!(html.contains("id=\"domestic-vpn\""));
    assert_eq!(html.matches("class=\"resource-card\"").count(), 5);

    println!("✅ render --output works");
}

#[test]
fn test_search_persists_history() {
    let ws = Workspace::new();
    let (success, stdout, _) = ws.run(&["search", "API"]);
    assert!(success);
    assert!(stdout.contains("找到 1 个相关资源"));
    assert!(stdout.contains("Materials Project"));
    assert!(!stdout.contains("  ▸ PubChem"));

    let (_, stdout, _) = ws.run(&["search", "zzz-nothing"]);
    assert!(stdout.contains("没有找到匹配的资源"));

    let (success, stdout, _) = ws.run(&["history"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["🔍 zzz-nothing", "🔍 api"]);

    println!("✅ search history persists across runs");
}

#[test]
fn test_empty_search_warns() {
    let ws = Workspace::new();
    let (success, stdout, _) = ws.run(&["search", "  "]);
    assert!(success);
    assert!(stdout.contains("请输入搜索关键词"));

    let (_, stdout, _) = ws.run(&["history"]);
    assert!(stdout.contains("(no searches yet)"));
}

#[test]
fn test_favorite_toggle_round_trip() {
    let ws = Workspace::new();

    let (success, stdout, stderr) = ws.run(&["favorite", "tools", "Materials Project"]);
    assert!(success, "favorite failed: {}", stderr);
    assert!(stdout.contains("已收藏 tools/api/Materials Project"));

    let (_, stdout, _) = ws.run(&["favorites"]);
    assert!(stdout.contains("❤️  tools/Materials Project"));
    assert!(ws.path().join("state").join("resource-favorites.json").exists());

    let (_, stdout, _) = ws.run(&["favorite", "tools", "Materials Project"]);
    assert!(stdout.contains("已取消收藏"));
    let (_, stdout, _) = ws.run(&["favorites"]);
    assert!(stdout.contains("(no favorites)"));

    let (success, _, _) = ws.run(&["favorite", "tools", "Nope"]);
    assert!(!success);

    println!("✅ favorite toggles alternate");
}

#[test]
fn test_filter_command() {
    let ws = Workspace::new();
    let (success, stdout, _) = ws.run(&["filter", "domestic", "--tags", "free"]);
    assert!(success);
    assert!(stdout.contains("(domestic) [tags=free difficulty=all status=all] 1/3 visible"));
    assert!(stdout.contains("(tools) [tags=all difficulty=all status=all] 2/2 visible"));

    let (success, _, stderr) = ws.run(&["filter", "domestic", "--status", "broken"]);
    assert!(!success);
    assert!(stderr.contains("unknown status filter value 'broken'"));

    let (success, _, _) = ws.run(&["filter", "domestic"]);
    assert!(!success);
}

#[test]
fn test_visit_prints_url() {
    let ws = Workspace::new();
    let (success, stdout, _) = ws.run(&["visit", "tools/api/PubChem"]);
    assert!(success);
    assert!(stdout.contains("🌐 https://pubchem.ncbi.nlm.nih.gov"));
    assert!(ws.path().join("state").join("resource-visits.json").exists());

    let (success, _, _) = ws.run(&["visit", "tools/PubChem"]);
    assert!(!success);
}

#[test]
fn test_theme_toggle_persists() {
    let ws = Workspace::new();
    let (_, stdout, _) = ws.run(&["theme"]);
    assert!(stdout.contains("已切换到深色模式"));
    let (_, stdout, _) = ws.run(&["stats"]);
    assert!(stdout.contains("🎨 Theme: 深色"));
}

#[test]
fn test_browse_with_piped_stdin() {
    let ws = Workspace::new();
    let mut child = ws
        .command(&ws.path().join("resources.json"), &["browse"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn browse");

    child
        .stdin
        .take()
        .unwrap()
        .write_all("filter tools difficulty 初级\nsearch api\nclear\nshow\ncopy tools/api/PubChem\nquit\n".as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("📊 5+ 个资源"));
    assert!(stdout.contains("找到 1 个相关资源"));
    assert!(stdout.contains("(tools) [tags=all difficulty=初级 status=all] 1/2 visible"));
    // 管道输出没有终端剪贴板
    assert!(!stdout.contains("已复制"));

    println!("✅ browse reads piped commands");
}

#[test]
fn test_missing_dataset_is_not_fatal() {
    let ws = Workspace::new();
    let missing = ws.path().join("missing.json");
    let (success, stdout, stderr) = ws.run_with_data(&missing, &["stats"]);

    assert!(success);
    assert!(stderr.contains("资源数据加载失败，请刷新页面重试。"));
    assert!(stdout.contains("Dataset not loaded"));
}

#[test]
fn test_malformed_dataset_is_not_fatal() {
    let ws = Workspace::new();
    let broken = ws.path().join("broken.json");
    std::fs::write(&broken, r#"{"categories": {"x": {"title": 1}}}"#).unwrap();
    let (success, stdout, stderr) = ws.run_with_data(&broken, &["render"]);

    assert!(success);
    assert!(stderr.contains("资源数据加载失败"));
    assert!(stdout.contains("<main id=\"dynamic-sections\">\n</main>"));
}

#[test]
fn test_sqlite_backend() {
    let ws = Workspace::new();
    let (success, _, stderr) = ws.run(&["--backend", "sqlite", "favorite", "domestic", "知网"]);
    assert!(success, "sqlite favorite failed: {}", stderr);
    assert!(ws.path().join("state").join("state.sqlite").exists());

    let (_, stdout, _) = ws.run(&["--backend", "sqlite", "favorites"]);
    assert!(stdout.contains("domestic/知网"));

    // JSON 后端看不到 SQLite 中的状态
    let (_, stdout, _) = ws.run(&["favorites"]);
    assert!(stdout.contains("(no favorites)"));
}

#[test]
fn test_corrupt_sqlite_state_is_not_fatal() {
    let ws = Workspace::new();
    let state = ws.path().join("state");
    std::fs::create_dir_all(&state).unwrap();
    std::fs::write(state.join("state.sqlite"), "this is not a database").unwrap();

    let (success, stdout, stderr) = ws.run(&["--backend", "sqlite", "stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stderr.contains("Falling back to in-memory state"));
    assert!(stdout.contains("📊 Summary: 5+ resources in 2 categories"));

    let (success, stdout, _) = ws.run(&["--backend", "sqlite", "search", "API"]);
    assert!(success);
    assert!(stdout.contains("找到 1 个相关资源"));
}

#[test]
fn test_help_commands() {
    let ws = Workspace::new();
    let (_, stdout, stderr) = ws.run(&["--help"]);
    let combined = format!("{}{}", stdout, stderr);
    assert!(combined.contains("browse") && combined.contains("search"),
        "Help should list available commands");

    let (_, stdout, _) = ws.run(&["filter", "--help"]);
    assert!(stdout.contains("--difficulty"));
}
