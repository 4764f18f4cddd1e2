use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "comment-scraper", author, version, about = "Instagram / TikTok 评论抓取")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 抓取帖子评论并以 JSON 数组输出
    Scrape {
        /// 帖子链接
        url: String,
        /// 平台标签（instagram/ig/photo-platform, tiktok/tt/video-platform），缺省时按链接识别
        #[arg(long)]
        platform: Option<String>,
        /// 每页条数（1-100），覆盖 SCRAPER_PAGE_SIZE
        #[arg(long)]
        page_size: Option<u32>,
        /// 翻页间隔秒数，覆盖 SCRAPER_DELAY_SECS
        #[arg(long)]
        delay_secs: Option<u64>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
        /// 将 created_at 输出为 `YYYY-MM-DD HH:MM:SS`（UTC）
        #[arg(long, default_value_t = false)]
        readable_time: bool,
    },
    /// 只输出从链接中提取的帖子ID
    ExtractId {
        url: String,
        #[arg(long)]
        platform: Option<String>,
    },
    /// 列出支持的平台
    Platforms,
}
