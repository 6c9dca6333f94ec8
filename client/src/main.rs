//! Look up the langlinks of a page, or prefix-search page titles.
//!
//! Prints one JSON line per search event (`{"kind":"batch","data":[...]}`,
//! then `{"kind":"done"}`), or one JSON array of titles for `complete`.

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiki_client::{ClientConfig, WikiApi};

#[derive(Parser)]
#[command(name = "wikilinks")]
#[command(about = "Find a Wikipedia page's equivalents in other languages")]
struct Cli {
    /// Language edition to query, e.g. `en` or `de`
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Explicit api.php URL (a mirror or the mock server)
    #[arg(long)]
    endpoint: Option<String>,

    /// Maximum number of continuation pages per search
    #[arg(long)]
    max_pages: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cross-language equivalents of a page
    Links { title: String },

    /// Suggest page titles starting with a prefix
    Complete {
        prefix: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,wiki_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(&cli.lang)?;
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(max_pages) = cli.max_pages {
        config = config.with_max_pages(max_pages);
    }

    match cli.command {
        Commands::Links { title } => {
            let api = WikiApi::new(config)?;
            let events = api.fetch_langlinks(&title);
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                println!("{}", serde_json::to_string(&event?)?);
            }
        }
        Commands::Complete { prefix, limit } => {
            if let Some(limit) = limit {
                config = config.with_autocomplete_limit(limit);
            }
            let api = WikiApi::new(config)?;
            let titles = api.autocomplete(&prefix).await?;
            println!("{}", serde_json::to_string(&titles)?);
        }
    }

    Ok(())
}
