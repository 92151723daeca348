#[tokio::main]
async fn main() -> anyhow::Result<()> {
    recallbox_backend::run().await
}
