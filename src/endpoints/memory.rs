use super::{Endpoint, EndpointRef, default_name};
use crate::{
    codec,
    io::{BoxedIO, MemorySink, MemoryStream},
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

/// In-memory endpoint: every open yields a transport that reads `data` (or
/// the decoded `hex`) and records writes into a sink shared by all opens.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEndpoint {
    #[serde(default)]
    name: String,
    data: Option<String>,
    hex: Option<String>,
    #[serde(skip)]
    content: Bytes,
    #[serde(skip)]
    sink: MemorySink,
}

impl MemoryEndpoint {
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut ret: Self = serde_yaml_ng::from_value(value.clone()).context("parse config")?;
        if ret.name.is_empty() {
            ret.name = default_name(value);
        }
        ret.content = match (&ret.data, &ret.hex) {
            (Some(_), Some(_)) => bail!("memory endpoint takes either data or hex, not both"),
            (Some(data), None) => Bytes::copy_from_slice(data.as_bytes()),
            (None, Some(hex)) => codec::hex::decode(hex).context("decode hex")?.into(),
            (None, None) => Bytes::new(),
        };
        Ok(ret)
    }

    /// Bytes written into any transport opened from this endpoint.
    pub fn sink(&self) -> MemorySink {
        self.sink.clone()
    }
}

pub fn from_value(value: &Value) -> Result<EndpointRef> {
    Ok(Box::new(MemoryEndpoint::from_value(value)?))
}

#[async_trait]
impl Endpoint for MemoryEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<BoxedIO> {
        Ok(Box::new(MemoryStream::with_sink(
            self.content.clone(),
            self.sink.clone(),
        )))
    }
}
