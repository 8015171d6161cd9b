#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Integration tests for the level loader
//! Bulk loading from each source kind, cache behaviour and failure handling

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use level_vault::config::SourceConfig;
use level_vault::error::LevelError;
use level_vault::schema::dto::{CellDto, GoalDto, LevelCollectionDto, LevelConfigDto};
use level_vault::schema::types::{ColorId, GoalType};
use level_vault::{export, LevelCrypto, LevelDatabase, LevelSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn level_five() -> LevelConfigDto {
    let cell = |colors: &[i32]| {
        Some(CellDto {
            colors: colors.iter().copied().map(ColorId).collect(),
            ..CellDto::default()
        })
    };
    LevelConfigDto {
        level: 5,
        rows: 2,
        columns: 2,
        total_slot: 7,
        goals: vec![GoalDto {
            goal_type: GoalType(1),
            target_count: 10,
            target_color: ColorId(3),
        }],
        containers: vec![ColorId(1), ColorId(2)],
        grid: vec![vec![cell(&[1]), cell(&[2, 2])], vec![cell(&[3]), None]],
    }
}

fn collection() -> LevelCollectionDto {
    LevelCollectionDto {
        levels: vec![
            LevelConfigDto {
                level: 1,
                rows: 1,
                columns: 1,
                total_slot: 4,
                ..LevelConfigDto::default()
            },
            level_five(),
        ],
    }
}

fn write_levels(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("levels.dat");
    export::write_container(&collection(), &LevelCrypto::new(), &path).unwrap();
    path
}

fn memory_source(collection: &LevelCollectionDto) -> LevelSource {
    let plaintext = collection.to_json_vec().unwrap();
    LevelSource::Memory(Bytes::from(LevelCrypto::new().encrypt(&plaintext).unwrap()))
}

fn sealed_bytes() -> Vec<u8> {
    let plaintext = collection().to_json_vec().unwrap();
    LevelCrypto::new().encrypt(&plaintext).unwrap()
}

/// Answer every HTTP request with `response`; `hold_open` keeps sockets alive afterwards
async fn serve(response: Vec<u8>, hold_open: bool) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request_head(&mut socket).await;
            let _ = socket.write_all(&response).await;
            if hold_open {
                held.push(socket);
            }
        }
    });
    (addr, server)
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

fn http_ok(body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

fn http_chunked(chunks: &[&[u8]], finished: bool) -> Vec<u8> {
    let mut response =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_vec();
    for chunk in chunks {
        response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        response.extend_from_slice(chunk);
        response.extend_from_slice(b"\r\n");
    }
    if finished {
        response.extend_from_slice(b"0\r\n\r\n");
    }
    response
}

fn remote(addr: SocketAddr) -> LevelSource {
    LevelSource::parse(&format!("http://{addr}/levels.dat")).unwrap()
}

// ============================================================================
// SUCCESSFUL LOADS
// ============================================================================

#[tokio::test]
async fn test_file_source_loads_every_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_levels(dir.path());

    let db = LevelDatabase::new(LevelSource::File(path));
    assert_eq!(db.preload().await, 2);
    assert_eq!(db.level_numbers(), vec![1, 5]);

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.bulk_loads_failed, 0);
    assert_eq!(metrics.levels_cached, 2);
    assert!(metrics.bytes_read > 0);
}

#[tokio::test]
async fn test_level_five_reconstructed_column_major() {
    let db = LevelDatabase::new(memory_source(&collection()));
    let level = db.get(5).await.expect("level 5");

    assert_eq!(level.level, 5);
    assert_eq!(level.total_slot, 7);
    assert_eq!((level.columns(), level.rows()), (2, 2));
    assert_eq!(level.goals.len(), 1);
    assert_eq!(level.goals[0].target_color, ColorId(3));
    assert_eq!(level.containers, vec![ColorId(1), ColorId(2)]);

    let colors = |column, row| level.grid.get(column, row).unwrap().colors.clone();
    assert_eq!(colors(0, 0), vec![ColorId(1)]);
    assert_eq!(colors(0, 1), vec![ColorId(2), ColorId(2)]);
    assert_eq!(colors(1, 0), vec![ColorId(3)]);

    let null_cell = level.grid.get(1, 1).unwrap();
    assert!(!null_cell.is_empty);
    assert!(null_cell.colors.is_empty());
    assert!(null_cell.gate_waves.is_empty());
}

#[tokio::test]
async fn test_repeated_lookups_return_equal_levels() {
    let db = LevelDatabase::new(memory_source(&collection()));
    let first = db.get(5).await.unwrap();
    let second = db.get(5).await.unwrap();

    assert_eq!(*first, *second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(db.metrics().snapshot().bulk_loads_total, 1);
}

#[tokio::test]
async fn test_unknown_level_is_not_found() {
    let db = LevelDatabase::new(memory_source(&collection()));
    assert!(db.get(2).await.is_none());
    assert!(db.get(5).await.is_some());
    assert!(db.get(999).await.is_none());

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.lookups_total, 3);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.not_found, 2);
}

#[tokio::test]
async fn test_from_config_uses_configured_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_levels(dir.path());

    let config = SourceConfig {
        location: path.display().to_string(),
        ..SourceConfig::default()
    };
    let db = LevelDatabase::from_config(&config).unwrap();
    assert!(db.get(1).await.is_some());
}

#[tokio::test]
async fn test_remote_source_loads_every_level() {
    let (addr, server) = serve(http_ok(&sealed_bytes()), false).await;

    let db = LevelDatabase::new(remote(addr));
    let level = db.get(5).await.expect("level 5 over http");
    assert_eq!((level.columns(), level.rows()), (2, 2));
    assert!(db.get(1).await.is_some());

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.bulk_loads_failed, 0);
    assert_eq!(metrics.bytes_read, sealed_bytes().len() as u64);

    server.abort();
}

#[tokio::test]
async fn test_remote_chunked_body_loads() {
    let sealed = sealed_bytes();
    let (first, rest) = sealed.split_at(10);
    let (addr, server) = serve(http_chunked(&[first, rest], true), false).await;

    let db = LevelDatabase::new(remote(addr));
    assert_eq!(db.preload().await, 2);

    server.abort();
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_share_one_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(LevelDatabase::new(LevelSource::File(write_levels(dir.path()))));

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let db = Arc::clone(&db);
        let number = if i % 2 == 0 { 1 } else { 5 };
        handles.push(tokio::spawn(async move { db.get(number).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.lookups_total, 32);
}

#[tokio::test]
async fn test_load_delivers_result_to_continuation() {
    let db = Arc::new(LevelDatabase::new(memory_source(&collection())));

    let (tx, rx) = oneshot::channel();
    db.load(5, move |level| {
        let _ = tx.send(level.map(|l| l.total_slot));
    })
    .await
    .unwrap();
    assert_eq!(rx.await.unwrap(), Some(7));

    let (tx, rx) = oneshot::channel();
    db.load(42, move |level| {
        let _ = tx.send(level.is_none());
    });
    assert!(rx.await.unwrap());
}

// ============================================================================
// FAILURES
// ============================================================================

#[tokio::test]
async fn test_missing_file_is_never_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levels.dat");
    let db = LevelDatabase::new(LevelSource::File(path.clone()));

    assert!(db.get(1).await.is_none());
    assert!(db.is_loaded());

    // Appearing later does not help: the failed load is final
    export::write_container(&collection(), &LevelCrypto::new(), &path).unwrap();
    assert!(db.get(1).await.is_none());

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.bulk_loads_failed, 1);
    assert_eq!(metrics.integrity_failures, 0);
}

#[tokio::test]
async fn test_tampered_container_yields_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_levels(dir.path());
    let mut data = std::fs::read(&path).unwrap();
    let middle = data.len() / 2;
    data[middle] ^= 0x01;
    std::fs::write(&path, &data).unwrap();

    let db = LevelDatabase::new(LevelSource::File(path));
    assert!(db.get(1).await.is_none());
    assert!(db.get(5).await.is_none());

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.integrity_failures, 1);
}

#[tokio::test]
async fn test_trailing_bytes_after_container_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_levels(dir.path());
    let mut data = std::fs::read(&path).unwrap();
    data.extend_from_slice(b"junk");
    std::fs::write(&path, &data).unwrap();

    let db = LevelDatabase::new(LevelSource::File(path));
    assert_eq!(db.preload().await, 0);
    assert_eq!(db.metrics().snapshot().bulk_loads_failed, 1);
}

#[tokio::test]
async fn test_foreign_keys_cannot_open_container() {
    let db = LevelDatabase::new(memory_source(&collection()))
        .with_crypto(LevelCrypto::with_keys([7; 32], [9; 32]));
    assert!(db.get(5).await.is_none());
    assert_eq!(db.metrics().snapshot().integrity_failures, 1);
}

#[tokio::test]
async fn test_plaintext_that_is_not_json_yields_not_found() {
    let sealed = LevelCrypto::new().encrypt(b"definitely not json").unwrap();
    let db = LevelDatabase::new(LevelSource::Memory(Bytes::from(sealed)));
    assert!(db.get(1).await.is_none());
    assert_eq!(db.metrics().snapshot().bulk_loads_failed, 1);
}

#[tokio::test]
async fn test_oversized_container_rejected() {
    let db = LevelDatabase::new(memory_source(&collection())).with_max_container_size(16);
    assert_eq!(db.preload().await, 0);
}

#[tokio::test]
async fn test_stalled_remote_fetch_times_out() {
    let (addr, server) = serve(Vec::new(), true).await;
    let db = LevelDatabase::new(remote(addr)).with_fetch_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    assert!(db.get(1).await.is_none());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(db.metrics().snapshot().bulk_loads_failed, 1);

    server.abort();
}

#[tokio::test]
async fn test_remote_http_error_yields_not_found() {
    let response = b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    let (addr, server) = serve(response.to_vec(), false).await;

    let db = LevelDatabase::new(remote(addr));
    assert!(db.get(1).await.is_none());
    assert_eq!(db.metrics().snapshot().bulk_loads_failed, 1);

    server.abort();
}

#[tokio::test]
async fn test_oversized_chunked_body_rejected_from_length_prefix() {
    // Only the first chunk is ever sent; the connection then stalls
    let sealed = sealed_bytes();
    let (addr, server) = serve(http_chunked(&[&sealed[..64]], false), true).await;

    let fetched = tokio::time::timeout(Duration::from_secs(5), remote(addr).fetch(64))
        .await
        .expect("rejected without waiting for the rest of the body");
    assert!(matches!(fetched, Err(LevelError::OversizedContainer(_))));

    server.abort();
}

#[tokio::test]
async fn test_abandoned_lookup_does_not_restart_the_load() {
    let (addr, server) = serve(Vec::new(), true).await;
    let db = LevelDatabase::new(remote(addr)).with_fetch_timeout(Duration::from_millis(300));

    let abandoned = tokio::time::timeout(Duration::from_millis(50), db.get(1)).await;
    assert!(abandoned.is_err());
    assert!(!db.is_loaded());

    assert!(db.get(1).await.is_none());
    assert!(db.is_loaded());

    let metrics = db.metrics().snapshot();
    assert_eq!(metrics.bulk_loads_total, 1);
    assert_eq!(metrics.bulk_loads_failed, 1);

    server.abort();
}
