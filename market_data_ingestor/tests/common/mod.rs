#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One canned HTTP answer.
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: String) -> Self {
        Self { status: 200, body }
    }
}

/// Serves `replies` in order, one per connection, and records each request line.
///
/// Returns the base URL and the shared request log.
pub async fn serve(replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        for reply in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let request = String::from_utf8_lossy(&buf);
            if let Some(line) = request.lines().next() {
                log.lock().expect("log").push(line.to_string());
            }

            let reason = if reply.status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.status,
                reply.body.len(),
                reply.body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), seen)
}

/// A newest-first page of `len` daily candles ending on `newest`, the way Upbit orders them.
pub fn candle_page(market: &str, newest: NaiveDate, len: usize) -> String {
    let candles: Vec<String> = (0..len)
        .map(|i| {
            let date = newest - Duration::days(i as i64);
            let close = 100.0 + i as f64;
            format!(
                r#"{{"market":"{market}","candle_date_time_utc":"{date}T00:00:00","candle_date_time_kst":"{date}T09:00:00","opening_price":{open},"high_price":{high},"low_price":{low},"trade_price":{close},"timestamp":0,"candle_acc_trade_price":1.0,"candle_acc_trade_volume":{volume}}}"#,
                open = close - 1.0,
                high = close + 2.0,
                low = close - 3.0,
                volume = 10.0 + i as f64,
            )
        })
        .collect();
    format!("[{}]", candles.join(","))
}
