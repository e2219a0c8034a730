use anyhow::Context;
use log::info;

use stellar::{config::SceneConfig, StellarApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(&path)
            .with_context(|| format!("failed to load scene configuration from {path}"))?,
        None => SceneConfig::default(),
    };
    info!(
        "Loading {} models from {}",
        config.models.len(),
        config.assets_root.display()
    );

    let app = StellarApp::new(config).context("failed to create the application")?;
    app.run().context("renderer stopped with an error")?;
    Ok(())
}
