use anyhow::Context;
use bookshare_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshare settings")?;
    bookshare_app::run(settings).await
}
