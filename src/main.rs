use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "scrycoach")]
#[command(about = "Coaches an LLM through generating, compiling, and testing Scrypto blueprints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate a blueprint from a description and coach it to a passing test run")]
    Generate {
        #[arg(help = "Natural-language description of the blueprint", required = true, trailing_var_arg = true)]
        request: Vec<String>,

        #[arg(long, help = "Maximum retries after a failed attempt (overrides config)")]
        max_retries: Option<u32>,
    },

    #[command(about = "Run the predefined batch of test requests")]
    Batch,

    #[command(about = "Harvest documentation pages into the local knowledge base")]
    Harvest,

    #[command(about = "Check the environment: toolchain, API key, knowledge base")]
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli::Config {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Generate {
            request,
            max_retries,
        } => {
            cli::generate(request.join(" "), max_retries, &config).await?;
        }
        Commands::Batch => {
            cli::batch(&config).await?;
        }
        Commands::Harvest => {
            cli::harvest(&config).await?;
        }
        Commands::Doctor => {
            cli::doctor(&config).await?;
        }
    }

    Ok(())
}
