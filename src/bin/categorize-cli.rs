use categorizer_sdk::CategorizerClient;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "categorize-cli")]
#[command(about = "Command-line client for the categorizer service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more items
    Classify {
        /// Items to classify
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// List active categories and their patterns
    Categories,
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = CategorizerClient::new(&cli.url);

    match cli.command {
        Commands::Classify { items } => {
            for item in items {
                match client.classify(&item).await {
                    Ok(classification) => {
                        println!("{}", serde_json::to_string_pretty(&classification)?);
                    }
                    Err(e) => eprintln!("Error classifying {:?}: {}", item, e),
                }
            }
        }
        Commands::Categories => {
            let categories = client.categories().await?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }

    Ok(())
}
