use clap::{Parser, Subcommand};
use tracing::{error, info};

mod config;
mod constants;
mod error;
mod fetch;
mod flatten;
mod load;
mod logging;
mod normalize;
mod pipeline;
mod reconcile;
mod table;
mod types;
mod validate;

use crate::config::Config;
use crate::load::{JsonFileLoader, LoadStage};
use crate::pipeline::Pipeline;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "tcg_pipeline")]
#[command(about = "Trading-card catalog and pricing extraction pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory for output artifacts
    #[arg(long, default_value = "output")]
    output_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and reconcile card pricing per configured set
    Pricing {
        /// Specific set codes to run (comma-separated), e.g. sv01,sv02
        #[arg(long)]
        sets: Option<String>,
    },
    /// Extract the series index
    Series,
    /// Extract per-set summaries for the allowlisted series
    Sets,
    /// Collect and flatten card details for the configured sets
    Cards,
    /// Run every pipeline sequentially
    Run,
}

async fn run_and_persist(
    name: &str,
    table: error::Result<Table>,
    loader: &JsonFileLoader,
) -> Result<(), Box<dyn std::error::Error>> {
    match table {
        Ok(table) => {
            let artifact = loader.write_table(&table, name).await?;
            info!("Pipeline finished for {}", name);
            println!("\n📊 Pipeline results for {name}:");
            println!("   Rows: {}", table.row_count());
            println!("   Columns: {}", table.columns().len());
            println!("   Output file: {artifact}");
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed for {}: {}", name, e);
            println!("❌ Pipeline failed for {name}: {e}");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let pipeline = Pipeline::new(config)?;
    let loader = JsonFileLoader::new(&cli.output_dir);

    match cli.command {
        Commands::Pricing { sets } => {
            println!("🔄 Running pricing pipeline...");
            let requested: Option<Vec<String>> =
                sets.map(|list| list.split(',').map(|s| s.trim().to_string()).collect());
            run_and_persist(
                "pricing",
                pipeline.run_pricing(requested.as_deref()).await,
                &loader,
            )
            .await?;
        }
        Commands::Series => {
            println!("🔄 Running series pipeline...");
            run_and_persist("series", pipeline.run_series().await, &loader).await?;
        }
        Commands::Sets => {
            println!("🔄 Running set pipeline...");
            run_and_persist("sets", pipeline.run_sets().await, &loader).await?;
        }
        Commands::Cards => {
            println!("🔄 Running card pipeline...");
            run_and_persist("cards", pipeline.run_cards().await, &loader).await?;
        }
        Commands::Run => {
            println!("🚀 Running full extraction (pricing + series + sets + cards)...");
            run_and_persist("pricing", pipeline.run_pricing(None).await, &loader).await?;
            run_and_persist("series", pipeline.run_series().await, &loader).await?;
            run_and_persist("sets", pipeline.run_sets().await, &loader).await?;
            run_and_persist("cards", pipeline.run_cards().await, &loader).await?;
            println!("✅ Full extraction completed successfully!");
        }
    }
    Ok(())
}
