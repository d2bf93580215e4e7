use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod browse;
mod catalog;
mod clipboard;
mod config;
mod controller;
mod error;
mod filter;
mod progress;
mod render;
mod report;
mod storage;
mod store;
mod toast;
mod view;

#[cfg(test)]
mod test_support;

use clipboard::{Clipboard, Osc52Clipboard, UnavailableClipboard};
use config::{AppConfig, DEFAULT_DATA};
use controller::{PresentationController, UiEvent};
use filter::{FilterChange, FilterDimension};
use storage::BackendKind;
use store::CatalogStore;
use toast::Toast;

#[derive(Parser)]
#[command(name = "resource-catalog")]
#[command(about = "Browse, filter and search a curated catalog of external resources", long_about = None)]
#[command(version)]
struct Cli {
    /// Dataset JSON file or http(s) URL
    #[arg(long, global = true, env = "RESOURCE_CATALOG_DATA", default_value = DEFAULT_DATA)]
    data: String,

    /// Directory for favorites, search history, visits and theme
    /// (default: ~/.resource-catalog)
    #[arg(long, global = true, env = "RESOURCE_CATALOG_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// State storage backend
    #[arg(long, global = true, value_enum, default_value_t = BackendKind::Json)]
    backend: BackendKind,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the catalog as a static HTML page
    Render {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive browsing: tabs, filters, search, favorites
    Browse,

    /// Show catalog statistics and local state
    Stats {
        /// Show per-subcategory counts, favorites and history entries
        #[arg(short, long)]
        detailed: bool,
    },

    /// Full-text search across all sections
    Search {
        /// Search keywords
        query: Vec<String>,
    },

    /// Apply filters to one category section
    Filter {
        /// Category id
        category: String,

        /// Tag class: free, paid, chinese, english, mirror, registration or all
        #[arg(long)]
        tags: Option<String>,

        /// Difficulty: 初级, 中级, 高级 or all
        #[arg(long)]
        difficulty: Option<String>,

        /// Status: active, limited, inactive or all
        #[arg(long)]
        status: Option<String>,
    },

    /// Toggle a resource's favorite marker
    Favorite {
        /// Category id
        category: String,

        /// Resource name
        resource: String,
    },

    /// List favorites
    Favorites,

    /// List recent searches
    History,

    /// Record a visit and print the resource URL
    Visit {
        /// Card id: category/subcategory/name
        card: String,
    },

    /// Toggle between light and dark theme
    Theme,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new(&cli.data, cli.state_dir.clone(), cli.backend, cli.verbose);

    // Initialize logging, stdout 只留给命令输出
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    let mut store = config.open_store();
    load_dataset(&mut store, &config).await;

    let mut controller = PresentationController::mount(store, terminal_clipboard());

    match cli.command {
        Commands::Render { output } => {
            let html = render::render_page(controller.page());
            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write page to {:?}", path))?;
                    info!("📝 Page written to {:?}", path);
                }
                None => print!("{}", html),
            }
        }

        Commands::Browse => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            browse::run(&mut controller, stdin, &mut stdout).await?;
        }

        Commands::Stats { detailed } => {
            let report = report::StatsReport::collect(controller.store());
            println!("{}", report.format(detailed));
        }

        Commands::Search { query } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                println!("{}", Toast::warning("请输入搜索关键词"));
                return Ok(());
            }
            info!("🔍 Searching for: {}", query);
            let reaction = controller.handle(UiEvent::Search { query });
            print!("{}", browse::describe(controller.page(), &reaction));
            print!("{}", browse::summary(controller.page()));
        }

        Commands::Filter {
            category,
            tags,
            difficulty,
            status,
        } => {
            let requested = [
                (FilterDimension::Tags, tags),
                (FilterDimension::Difficulty, difficulty),
                (FilterDimension::Status, status),
            ];
            let mut changes = Vec::new();
            for (dimension, value) in requested {
                if let Some(value) = value {
                    changes.push(FilterChange::parse(dimension, value.trim())?);
                }
            }
            if changes.is_empty() {
                return Err(anyhow!(
                    "❌ Error: No filter given. Please specify at least one of: --tags, --difficulty, --status"
                ));
            }
            if controller.page().section(&category).is_none() {
                return Err(anyhow!("❌ Error: Unknown category '{}'", category));
            }

            for change in changes {
                controller.handle(UiEvent::ChangeFilter {
                    category: category.clone(),
                    change,
                });
            }
            print!("{}", browse::summary(controller.page()));
        }

        Commands::Favorite { category, resource } => {
            let reaction = controller.handle(UiEvent::ToggleFavorite {
                category: category.clone(),
                resource: resource.clone(),
            });
            if reaction.ops.is_empty() {
                return Err(anyhow!("❌ Error: No resource '{}' in category '{}'", resource, category));
            }
            print!("{}", browse::describe(controller.page(), &reaction));
        }

        Commands::Favorites => {
            let favorites: Vec<&str> = controller.store().favorites().collect();
            if favorites.is_empty() {
                println!("(no favorites)");
            }
            for key in favorites {
                println!("❤️  {}", key);
            }
        }

        Commands::History => {
            let history = controller.store().search_history();
            if history.is_empty() {
                println!("(no searches yet)");
            }
            for query in history {
                println!("🔍 {}", query);
            }
        }

        Commands::Visit { card } => {
            let card = browse::parse_card_id(&card)
                .ok_or_else(|| anyhow!("❌ Error: Card id must look like category/subcategory/name"))?;
            if controller.page().card(&card).is_none() {
                return Err(anyhow!("❌ Error: Unknown card '{}'", card));
            }
            let reaction = controller.handle(UiEvent::Visit { card });
            print!("{}", browse::describe(controller.page(), &reaction));
        }

        Commands::Theme => {
            let reaction = controller.handle(UiEvent::ToggleTheme);
            print!("{}", browse::describe(controller.page(), &reaction));
        }
    }

    Ok(())
}

/// 加载数据集；失败时给出提示，页面以空目录挂载
async fn load_dataset(store: &mut CatalogStore, config: &AppConfig) {
    let pb = if std::io::stderr().is_terminal() {
        progress::create_spinner(&format!("Loading {}", config.data))
    } else {
        progress::hidden_spinner()
    };
    pb.enable_steady_tick(Duration::from_millis(100));

    match store.load(&config.data).await {
        Ok(catalog) => progress::finish_with_success(
            &pb,
            &format!("Loaded {} resources", catalog.total_resource_count()),
        ),
        Err(_) => {
            progress::finish_with_error(&pb, "Dataset load failed");
            eprintln!("{}", Toast::load_failed());
        }
    }
}

/// 终端上使用 OSC 52，否则复制不可用
fn terminal_clipboard() -> Box<dyn Clipboard> {
    if std::io::stdout().is_terminal() {
        Box::new(Osc52Clipboard::new(std::io::stdout()))
    } else {
        Box::new(UnavailableClipboard::new("stdout is not a terminal"))
    }
}
