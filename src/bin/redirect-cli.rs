use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "redirect-cli")]
#[command(about = "Inspect a running redirect proxy through its admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status and rule counts
    Status,
    /// List loaded rules in evaluation order
    Rules,
    /// Dry-run the matcher without redirecting or logging
    Match {
        #[arg(long)]
        host: String,

        /// Path including any query string
        #[arg(long, default_value = "/")]
        path: String,

        /// Treat the request as HTTPS
        #[arg(long)]
        secure: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/admin/status")).send().await?,
        Commands::Rules => client.get(format!("{base}/admin/rules")).send().await?,
        Commands::Match { host, path, secure } => {
            client
                .get(format!("{base}/admin/match"))
                .query(&[
                    ("host", host),
                    ("path", path),
                    ("secure", secure.to_string()),
                ])
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
