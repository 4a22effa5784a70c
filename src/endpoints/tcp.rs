use super::{Endpoint, EndpointRef, default_name};
use crate::io::BoxedIO;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use tokio::net::TcpStream;
use tracing::trace;

/// Outbound TCP connection to `address` (`host:port`).
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TcpEndpoint {
    #[serde(default)]
    name: String,
    address: String,
    #[serde(default)]
    nodelay: bool,
}

pub fn from_value(value: &Value) -> Result<EndpointRef> {
    let mut ret: TcpEndpoint = serde_yaml_ng::from_value(value.clone()).context("parse config")?;
    if ret.name.is_empty() {
        ret.name = default_name(value);
    }
    Ok(Box::new(ret))
}

#[async_trait]
impl Endpoint for TcpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<BoxedIO> {
        trace!("{}: connecting to {}", self.name, self.address);
        let stream = TcpStream::connect(&self.address)
            .await
            .with_context(|| format!("connect {}", self.address))?;
        stream.set_nodelay(self.nodelay).context("set nodelay")?;
        Ok(Box::new(stream))
    }
}
