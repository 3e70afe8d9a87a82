use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use tutor_cli::handlers::{ask, chat, speak, voices};
use tutor_cli::{Cli, CliConfig, CliError, Commands, bootstrap};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so env fallbacks see .env
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to appropriate handler
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Voices) {
        voices::execute(cli.study.voice);
        return Ok(());
    }

    // Bootstrap the CLI context (composition root)
    let ctx = bootstrap(CliConfig::from_args(&cli.study));

    let result = match command {
        Commands::Ask { question, out } => ask::execute(&ctx, question, out).await,
        Commands::Speak {
            text,
            out,
            no_play,
        } => speak::execute(&ctx, text, out, no_play).await,
        Commands::Chat { save_dir } => chat::execute(&ctx, save_dir).await,
        Commands::Voices => Ok(()),
    };

    if let Err(e) = result {
        if let Some(cli_error) = e.downcast_ref::<CliError>() {
            eprintln!("Error: {cli_error}");
            std::process::exit(cli_error.exit_code());
        }
        return Err(e);
    }
    Ok(())
}
