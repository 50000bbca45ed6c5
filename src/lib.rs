//! Bookshelf application library
//!
//! Hosts the `books` module and the bootstrap shared by the binaries.

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

pub use modules::books;

/// Registry with every application module registered
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings).context("failed to register modules")?;
    Ok(registry)
}

/// Run the module lifecycle around the HTTP server until a shutdown signal
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(
        &registry,
        &settings,
        bookshelf_http::shutdown_signal(),
    )
    .await;

    registry.stop_modules().await?;
    served
}
