//! ChatPro: conversation export, saved prompts and theming for AI chat sites.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use chatpro_core::ChatProConfig;
use chatpro_export::open_for_print;
use chatpro_server::cli::{self, ExportFormat};
use chatpro_server::state::{self, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("CHATPRO_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("ChatPro - export, prompts and themes for ChatGPT, Claude and Gemini");
    println!();
    println!("Usage: chatpro [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                   Start the companion service");
    println!("  export <page.html> <hostname> [pdf|docx] [out-dir]");
    println!("                                           Export a saved conversation page");
    println!("  prompts                                  List saved prompts");
    println!("  help                                     Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();

    if args.len() > 1 {
        match args[1].as_str() {
            "export" => {
                if args.len() < 4 {
                    eprintln!("Usage: chatpro export <page.html> <hostname> [pdf|docx] [out-dir]");
                    std::process::exit(1);
                }
                let format = match args.get(4) {
                    Some(name) => ExportFormat::from_name(name).ok_or_else(|| {
                        cli::usage_error(&format!("Unknown export format: {}", name))
                    })?,
                    None => ExportFormat::Pdf,
                };
                let config = ChatProConfig::from_env(&data_dir)?;
                let out_dir = args
                    .get(5)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| config.data_paths.exports.clone());

                let written = cli::write_export(
                    &PathBuf::from(&args[2]),
                    &args[3],
                    format,
                    &out_dir,
                    config.print_settle_delay,
                );
                let path = match written {
                    Ok(path) => path,
                    Err(e) if e.is_user_facing() => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                    Err(e) => return Err(e.into()),
                };
                if format == ExportFormat::Pdf {
                    if let Err(e) = open_for_print(&path) {
                        eprintln!("{}", e);
                        eprintln!("The printable page was saved to {}", path.display());
                        std::process::exit(1);
                    }
                }
                println!("{}", path.display());
                return Ok(());
            }
            "prompts" => {
                let config = ChatProConfig::from_env(&data_dir)?;
                let state = AppState::open(config)?;
                let lines = cli::prompt_listing(&state.prompts)?;
                if lines.is_empty() {
                    println!("No saved prompts");
                }
                for line in lines {
                    println!("{}", line);
                }
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'chatpro help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());

    let config = ChatProConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::open(config)?);
    state::start_theme_sync(state.clone());

    let app = chatpro_server::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ChatPro service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
