use super::{Endpoint, EndpointRef, default_name};
use crate::io::BoxedIO;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tracing::trace;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FileMode {
    #[default]
    Read,
    Write,
    Append,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileEndpoint {
    #[serde(default)]
    name: String,
    path: PathBuf,
    #[serde(default)]
    mode: FileMode,
}

pub fn from_value(value: &Value) -> Result<EndpointRef> {
    let mut ret: FileEndpoint = serde_yaml_ng::from_value(value.clone()).context("parse config")?;
    if ret.name.is_empty() {
        ret.name = default_name(value);
    }
    Ok(Box::new(ret))
}

#[async_trait]
impl Endpoint for FileEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<BoxedIO> {
        let mut opts = OpenOptions::new();
        match self.mode {
            FileMode::Read => opts.read(true),
            FileMode::Write => opts.write(true).create(true).truncate(true),
            FileMode::Append => opts.append(true).create(true),
        };
        trace!("{}: opening {:?} for {:?}", self.name, self.path, self.mode);
        let file = opts
            .open(&self.path)
            .await
            .with_context(|| format!("open {}", self.path.display()))?;
        Ok(Box::new(file))
    }
}
