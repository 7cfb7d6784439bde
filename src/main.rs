#[tokio::main]
async fn main() -> deephat::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("deephat=info,serenity=warn"),
    )
    .init();
    log::info!("Starting deephat Discord bot");

    match deephat::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
