use easy_error::{Error, ResultExt, ensure};
use serde::{Deserialize, Serialize};

/// Default size of a single chunk for `read(-1)` and the copy engine.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub stream: StreamOptions,
    pub source: serde_yaml_ng::Value,
    pub target: serde_yaml_ng::Value,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    -1
}

impl Config {
    pub async fn load(path: &str) -> Result<Self, Error> {
        let s = tokio::fs::read(path).await.context("read file")?;
        let s = String::from_utf8(s).context("parse utf8")?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let cfg: Self = serde_yaml_ng::from_str(s).context("parse yaml")?;
        cfg.stream.validate()?;
        ensure!(cfg.limit >= -1, "invalid copy limit: {}", cfg.limit);
        Ok(cfg)
    }
}

/// Per-stream tunables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreamOptions {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub trace_chunks: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl StreamOptions {
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn trace_chunks(mut self, enabled: bool) -> Self {
        self.trace_chunks = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        ensure!(self.chunk_size > 0, "chunkSize must be positive");
        // read(n) takes an i32 count
        ensure!(
            self.chunk_size <= i32::MAX as usize,
            "chunkSize too large: {}",
            self.chunk_size
        );
        Ok(())
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            trace_chunks: false,
        }
    }
}
