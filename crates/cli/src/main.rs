//! # InTrades Signing CLI
//!
//! - `request`: Gatewayの `POST /sign` を呼び出して署名付きURLを取得する
//! - `cdn-url`: CDN署名付きURLをローカルで生成する（Gateway不要）

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "intrades-cli")]
#[command(about = "Issue signed URLs for InTrades object keys")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a running gateway to sign a URL
    Request(commands::request::RequestArgs),
    /// Sign a CDN URL locally with the CloudFront key pair
    CdnUrl(commands::cdn_url::CdnUrlArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let url = match cli.command {
        Command::Request(args) => commands::request::run(args).await?,
        Command::CdnUrl(args) => commands::cdn_url::run(args)?,
    };

    println!("{url}");
    Ok(())
}
