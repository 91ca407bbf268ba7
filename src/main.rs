#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = coursework_submit::run().await {
        eprintln!("coursework: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
