use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use spotlight_core::activity::UserActivity;
use spotlight_core::catalog::CatalogLoader;
use spotlight_core::config::{expand_path, Config};
use spotlight_core::traits::Router;
use spotlight_core::types::{Feature, NavigationTarget, Subfeature};
use spotlight_index::TantivyIndex;
use spotlight_manager::{BackgroundQueue, ManagerOptions, SpotlightManager};

const DEFAULT_INDEX_DIR: &str = ".spotlight/index";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

struct PrintRouter;

impl Router for PrintRouter {
    fn navigate(&self, target: &NavigationTarget) {
        let screen = match target.feature {
            Feature::Home => "Home",
            Feature::Settings => "Settings",
        };
        let sub = target.subfeature.map(|s| format!(" / {}", s)).unwrap_or_default();
        let item = target.item_id.as_deref().map(|id| format!(" (item {})", id)).unwrap_or_default();
        println!("→ {}{}{}", screen, sub, item);
    }
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} <command> [args...]\n\
         \n  index <catalog-dir>\
         \n  delete-all\
         \n  delete-feature <feature> [subfeature]\
         \n  delete-item <feature> <item-id> [subfeature]\
         \n  search <query> [limit]\
         \n  open <identifier>"
    )
}

fn parse_args() -> (String, String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = if args.is_empty() { "spotlight".to_string() } else { args.remove(0) };
    if args.is_empty() { eprintln!("{}", usage(&prog)); std::process::exit(1); }
    let cmd = args.remove(0);
    (prog, cmd, args)
}

fn arg<'a>(args: &'a [String], i: usize, prog: &str) -> &'a str {
    args.get(i).map(String::as_str).unwrap_or_else(|| { eprintln!("{}", usage(prog)); std::process::exit(1) })
}

fn subfeature_arg(args: &[String], i: usize) -> anyhow::Result<Option<Subfeature>> {
    Ok(args.get(i).map(|s| s.parse::<Subfeature>()).transpose()?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("spotlight=info,spotlight_manager=info,spotlight_core=info")),
        )
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let spotlight = config.spotlight()?;
    let (prog, cmd, args) = parse_args();

    let index_dir = expand_path(spotlight.index.dir.clone().unwrap_or_else(|| DEFAULT_INDEX_DIR.to_string()));
    let index = Arc::new(TantivyIndex::open_in_dir(&index_dir, spotlight.index.writer_heap_bytes)?);
    let queue = Arc::new(BackgroundQueue::new(&spotlight.queue)?);
    let options = ManagerOptions::from_config(&spotlight, &env::current_dir()?)?;
    let manager = SpotlightManager::new(index.clone(), queue.clone(), options).with_router(Box::new(PrintRouter));

    match cmd.as_str() {
        "index" => {
            let catalog_dir = PathBuf::from(arg(&args, 0, &prog));
            let items = CatalogLoader::new().load_directory(&catalog_dir)?;
            manager.index(&items);
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Indexing {} items ({} pending)", items.len(), queue.pending()));
            queue.wait_idle();
            pb.finish_with_message(format!("✅ Submitted {} items, {} records in index", items.len(), index.num_docs()));
        }
        "delete-all" => {
            manager.delete_all();
        }
        "delete-feature" => {
            let feature: Feature = arg(&args, 0, &prog).parse()?;
            manager.delete_items(feature, subfeature_arg(&args, 1)?);
        }
        "delete-item" => {
            let feature: Feature = arg(&args, 0, &prog).parse()?;
            let item_id = arg(&args, 1, &prog);
            manager.delete_item(feature, subfeature_arg(&args, 2)?, item_id);
        }
        "search" => {
            let query = arg(&args, 0, &prog);
            let limit = args.get(1).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(10);
            let hits = manager.search(query, limit)?;
            if hits.is_empty() { println!("No results for '{}'", query); }
            for (i, hit) in hits.iter().enumerate() {
                println!("{:>2}. {:.3}  {}  [{}]\n    {}", i + 1, hit.score, hit.title, hit.domain_identifier, hit.unique_identifier);
            }
        }
        "open" => {
            let identifier = arg(&args, 0, &prog);
            if manager.handle_activity(&UserActivity::searchable_item(identifier)).is_none() {
                println!("Nothing to open for '{}'", identifier);
            }
        }
        _ => { eprintln!("Unknown command: {}\n{}", cmd, usage(&prog)); std::process::exit(1); }
    }

    if !queue.shutdown(SHUTDOWN_TIMEOUT) {
        tracing::warn!("Some index operations did not finish before exit");
    }
    Ok(())
}
