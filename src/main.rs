use anyhow::{Result, anyhow};
use streamkit_rs::{cli, config::Config, endpoints};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_args()?;
    let cfg = Config::load(&args.config_file)
        .await
        .map_err(|e| anyhow!("load {}: {}", args.config_file, e))?;
    let source = endpoints::from_value(&cfg.source)?;
    let target = endpoints::from_value(&cfg.target)?;

    if args.config_test {
        info!(
            "config OK: {} -> {}, limit {}",
            source.name(),
            target.name(),
            cfg.limit
        );
        return Ok(());
    }

    let (src, dst) = futures::future::try_join(
        source.open_stream(cfg.stream.clone()),
        target.open_stream(cfg.stream.clone()),
    )
    .await?;

    let ret = src.copy_to(&dst, cfg.limit).await;
    let closed = futures::future::join(src.close(), dst.close()).await;
    match ret {
        Ok(n) => info!("copied {} bytes from {} to {}", n, source.name(), target.name()),
        Err(e) => {
            error!("{} -> {}: {}", source.name(), target.name(), e);
            return Err(e.into());
        }
    }
    closed.0?;
    closed.1?;
    Ok(())
}
