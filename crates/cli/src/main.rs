use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Command-line entrypoint for the bookshelf service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the merged OpenAPI document
    Openapi,
    /// Print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                env = ?settings.environment,
                address = %settings.server.bind_address(),
                "bookshelf serve"
            );
            bookshelf_app::run(settings).await
        }
        Command::Openapi => {
            let registry = bookshelf_app::build_registry(&settings)?;
            let spec = bookshelf_http::openapi::merged_spec(&registry, &settings.server.api_prefix);
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["bookshelf"]);
        assert!(cli.command.is_none());
    }
}
