use clap::Parser;
use resepi::cli::{Cli, Commands};
use resepi::services::slug::derive_slug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resepi=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            resepi::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            resepi::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate) => {
            resepi::cli::migrate::run(&cli.config).await?;
        }
        Some(Commands::Import { file, overwrite }) => {
            resepi::cli::import::run(&cli.config, &file, overwrite).await?;
        }
        Some(Commands::Slug { title }) => {
            println!("{}", derive_slug(&title));
        }
        Some(Commands::Random) => {
            resepi::cli::random::run(&cli.config).await?;
        }
        Some(Commands::Check) => {
            resepi::cli::check::run(&cli.config).await?;
        }
        None => {
            // No subcommand provided, print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
