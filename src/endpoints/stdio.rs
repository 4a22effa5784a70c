use super::{Endpoint, EndpointRef, default_name};
use crate::io::BoxedIO;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf, Stdin, Stdout};

/// Process stdin for reads, stdout for writes.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StdioEndpoint {
    #[serde(default)]
    name: String,
}

pub fn from_value(value: &Value) -> Result<EndpointRef> {
    let mut ret: StdioEndpoint = serde_yaml_ng::from_value(value.clone()).context("parse config")?;
    if ret.name.is_empty() {
        ret.name = default_name(value);
    }
    Ok(Box::new(ret))
}

#[async_trait]
impl Endpoint for StdioEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<BoxedIO> {
        Ok(Box::new(StdioStream {
            stdin: tokio::io::stdin(),
            stdout: tokio::io::stdout(),
        }))
    }
}

struct StdioStream {
    stdin: Stdin,
    stdout: Stdout,
}

impl AsyncRead for StdioStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stdin).poll_read(cx, buf)
    }
}

impl AsyncWrite for StdioStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        Pin::new(&mut self.stdout).poll_write(cx, buf)
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.stdout).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.stdout).poll_shutdown(cx)
    }
}
