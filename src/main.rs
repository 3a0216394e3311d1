#[tokio::main]
async fn main() -> anyhow::Result<()> {
    groqsh::run().await
}
