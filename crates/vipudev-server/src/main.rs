// VipuDev.AI/crates/vipudev-server/src/main.rs

use dotenvy::dotenv;
use vipudev_server::{run_server, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = Config::from_env()?;

    run_server(cfg).await
}
