// 主入口点 - 评论抓取命令行
// Main entry point for the comment scraper CLI

fn main() -> std::process::ExitCode {
    social_comment_scraper::run()
}
