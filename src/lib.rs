// Core modules
// 核心模块
pub mod core;
pub mod platforms;
pub mod utils;
pub mod analysis;
pub mod cli;
pub mod commands;

// Re-export the scraping surface for easy access
// 重新导出抓取接口以便轻松访问
pub use crate::core::{Comment, CommentEvent, CommentSink, CreatedAt, PlatformType, ScrapeError};
pub use crate::platforms::{scrape_url, CommentScraper, ScraperFactory};

use std::process::ExitCode;
use clap::Parser;
use tracing_subscriber::EnvFilter;

// Initialize tracing for logging
// 初始化 tracing 用于日志输出（RUST_LOG 可覆盖，默认 info；日志写到 stderr，stdout 留给 JSON 输出）
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// Run the command line application
// 运行命令行应用
pub fn run() -> ExitCode {
    init_tracing();
    let cli = cli::Cli::parse();
    tracing::debug!("[App] 命令: {:?}", cli.command);

    match commands::execute(cli.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("[App] {}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
