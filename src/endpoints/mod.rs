use crate::{config::StreamOptions, io::BoxedIO, stream::Stream};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_yaml_ng::Value;
use tracing::debug;

pub mod file;
pub mod memory;
pub mod stdio;
pub mod tcp;

/// A source or destination of bytes that can be opened as a transport.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn name(&self) -> &str;
    async fn open(&self) -> Result<BoxedIO>;

    /// Open the endpoint and wrap the transport in a [`Stream`].
    async fn open_stream(&self, options: StreamOptions) -> Result<Stream> {
        let io = self.open().await?;
        let stream = Stream::from_boxed(io, options);
        debug!("{}: opened as stream {}", self.name(), stream.id());
        Ok(stream)
    }
}

pub type EndpointRef = Box<dyn Endpoint>;

pub fn from_value(value: &Value) -> Result<EndpointRef> {
    let tname = value
        .get("type")
        .ok_or_else(|| anyhow!("missing endpoint type"))?
        .as_str()
        .ok_or_else(|| anyhow!("endpoint type must be a string"))?;
    match tname {
        "memory" => memory::from_value(value),
        "file" => file::from_value(value),
        "tcp" => tcp::from_value(value),
        "stdio" => stdio::from_value(value),
        name => bail!("unknown endpoint type: {:?}", name),
    }
}

// Endpoint names default to their type.
fn default_name(value: &Value) -> String {
    value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("endpoint")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        serde_yaml_ng::from_str(s).unwrap()
    }

    #[test]
    fn test_from_value_selects_variant() {
        let ep = from_value(&parse("{type: memory, data: abc}")).unwrap();
        assert_eq!(ep.name(), "memory");
        let ep = from_value(&parse("{type: tcp, name: upstream, address: '127.0.0.1:1'}")).unwrap();
        assert_eq!(ep.name(), "upstream");
        let ep = from_value(&parse("{type: file, path: /tmp/x}")).unwrap();
        assert_eq!(ep.name(), "file");
        assert!(from_value(&parse("{type: stdio}")).is_ok());
    }

    #[test]
    fn test_from_value_errors() {
        let err = from_value(&parse("{type: carrier-pigeon}")).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
        assert!(from_value(&parse("{path: /tmp/x}")).is_err());
        assert!(from_value(&parse("{type: tcp}")).is_err());
    }
}
