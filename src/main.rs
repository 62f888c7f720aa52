use anyhow::Context;
use atrium_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Atrium settings")?;
    atrium_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.endpoint,
        "atrium-app starting"
    );

    atrium_app::run(settings).await
}
