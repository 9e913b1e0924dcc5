use clap::Parser;
use easel::cli::{
    build_http_client, generate, handle_completions, handle_config_init, health, load_config,
    providers, Cli, Commands, ConfigCommands, ProvidersCommands,
};
use easel::dispatch::FallbackManager;
use std::path::Path;
use std::sync::Arc;

/// Build a dispatch engine from the config file at `path`.
fn manager_from(path: &Path) -> Result<FallbackManager, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    let client = Arc::new(build_http_client()?);
    Ok(FallbackManager::from_config(&config, client)?)
}

fn print(output: Result<String, Box<dyn std::error::Error>>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", output?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => easel::cli::serve::run_serve(args).await,
        Commands::Generate(args) => match manager_from(&args.config) {
            Ok(manager) => print(generate::handle_generate(&args, &manager).await),
            Err(e) => Err(e),
        },
        Commands::Providers(cmd) => match cmd {
            ProvidersCommands::List(args) => match manager_from(&args.config) {
                Ok(manager) => print(providers::handle_providers_list(&args, &manager)),
                Err(e) => Err(e),
            },
        },
        Commands::Health(args) => match manager_from(&args.config) {
            Ok(manager) => print(health::handle_health(&args, &manager).await),
            Err(e) => Err(e),
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
