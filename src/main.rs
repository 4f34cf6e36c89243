use clap::Parser;
use fm_fact_label::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Characterize(args) => cli::characterize::run(args).await,
    }
}
