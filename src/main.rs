use clap::Parser;
use tradetape::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use tradetape::adapter::inbound::cli::{config, latest, output, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Both ring and aws-lc may be linked; pick one before any TLS handshake.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Latest(args) => latest::execute(args).await,
        Commands::Config(ConfigCommand::Validate(arg)) => config::execute_validate(&arg.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
