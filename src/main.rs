#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gesture_pointer_lib::run().await
}
