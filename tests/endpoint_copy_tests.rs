use std::io::Write;
use streamkit_rs::{Config, endpoints};
use tempfile::NamedTempFile;
use test_log::test;

#[test(tokio::test)]
async fn test_config_driven_file_copy() {
    let mut input = NamedTempFile::new().unwrap();
    input.write_all(b"The quick brown fox").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.bin");

    let yaml = format!(
        r#"
stream:
  chunkSize: 4
  traceChunks: true
source:
  type: file
  path: {:?}
target:
  type: file
  name: sink
  path: {:?}
  mode: write
limit: 9
"#,
        input.path(),
        output
    );
    let cfg = Config::parse(&yaml).unwrap();
    let source = endpoints::from_value(&cfg.source).unwrap();
    let target = endpoints::from_value(&cfg.target).unwrap();
    assert_eq!(source.name(), "file");
    assert_eq!(target.name(), "sink");

    let src = source.open_stream(cfg.stream.clone()).await.unwrap();
    let dst = target.open_stream(cfg.stream.clone()).await.unwrap();
    assert_eq!(src.options().chunk_size, 4);

    assert_eq!(src.copy_to(&dst, cfg.limit).await.unwrap(), 9);
    src.close().await.unwrap();
    dst.close().await.unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), b"The quick");
}

#[test(tokio::test)]
async fn test_config_loaded_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
source: { type: memory, hex: "deadbeef" }
target: { type: memory }
"#,
    )
    .unwrap();

    let cfg = Config::load(file.path().to_str().unwrap()).await.unwrap();
    let source = endpoints::memory::MemoryEndpoint::from_value(&cfg.source).unwrap();
    let target = endpoints::memory::MemoryEndpoint::from_value(&cfg.target).unwrap();
    let sink = target.sink();

    use streamkit_rs::endpoints::Endpoint;
    let src = source.open_stream(cfg.stream.clone()).await.unwrap();
    let dst = target.open_stream(cfg.stream.clone()).await.unwrap();
    assert_eq!(src.copy_to(&dst, cfg.limit).await.unwrap(), 4);
    assert_eq!(sink.contents(), vec![0xde, 0xad, 0xbe, 0xef]);
}

#[test(tokio::test)]
async fn test_tcp_target_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg = Config::parse(&format!(
        "source: {{type: memory}}\ntarget: {{type: tcp, address: '{}'}}",
        addr
    ))
    .unwrap();
    let target = endpoints::from_value(&cfg.target).unwrap();
    let err = target.open().await.err().unwrap();
    assert!(err.to_string().contains(&addr.to_string()));
}
