use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    storefront_verify::cli::app::run().await
}
