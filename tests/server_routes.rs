use automobile_dashboard::config::Columns;
use automobile_dashboard::dashboard::Dashboard;
use automobile_dashboard::data::{Record, RecordTable};
use automobile_dashboard::server::{route, serve_listener, MAX_REQUEST_BYTES};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dashboard() -> Dashboard {
    let table = RecordTable::from_records(vec![
        Record::new("Toyota", "gasoline", d(2020, 1, 1), 100.0),
        Record::new("Suzuki", "diesel", d(2021, 6, 1), 50.0),
        Record::new("Tata Motors", "bio-diesel", d(2022, 2, 2), 20.0),
    ]);
    Dashboard::new(table, Columns::default(), None)
}

fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[test]
fn index_serves_the_page() {
    let resp = route(&dashboard(), "GET / HTTP/1.1");
    assert_eq!(resp.status, 200);
    assert!(resp.content_type.starts_with("text/html"));
    assert!(resp.body.contains("brand-dropdown"));
}

#[test]
fn update_returns_seven_outputs() {
    let resp = route(
        &dashboard(),
        "GET /api/update?brand=Toyota&start=2020-01-01&end=2020-12-31 HTTP/1.1",
    );
    assert_eq!(resp.status, 200);
    let v = json(&resp.body);
    for key in [
        "line_chart",
        "bar_chart",
        "pie_chart",
        "scatter_plot",
        "box_plot",
        "histogram",
        "summary_table",
    ] {
        assert!(v.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(v.as_object().unwrap().len(), 7);
    assert_eq!(v["bar_chart"]["data"][0]["x"][0], "Toyota");
    assert!(v["summary_table"].as_str().unwrap().contains("<td>100</td>"));
}

#[test]
fn update_without_dates_uses_full_span() {
    let resp = route(&dashboard(), "GET /api/update?fuel=bio-diesel&brand=Tata+Motors HTTP/1.1");
    assert_eq!(resp.status, 200);
    let v = json(&resp.body);
    assert_eq!(v["pie_chart"]["data"][0]["labels"][0], "bio-diesel");
}

#[test]
fn reversed_dates_give_empty_charts_not_errors() {
    let resp = route(&dashboard(), "GET /api/update?start=2023-01-01&end=2019-01-01 HTTP/1.1");
    assert_eq!(resp.status, 200);
    let v = json(&resp.body);
    assert_eq!(v["line_chart"]["data"].as_array().unwrap().len(), 0);
    assert_eq!(v["histogram"]["data"][0]["x"].as_array().unwrap().len(), 0);
}

#[test]
fn unparseable_date_is_bad_request() {
    let resp = route(&dashboard(), "GET /api/update?start=yesterday HTTP/1.1");
    assert_eq!(resp.status, 400);
}

#[test]
fn insights_and_options_reflect_full_table() {
    let dash = dashboard();
    let insights = json(&route(&dash, "GET /api/insights HTTP/1.1").body);
    assert_eq!(insights["total_sales"], 170.0);
    assert_eq!(insights["earliest_date"], "2020-01-01");

    let options = json(&route(&dash, "GET /api/options HTTP/1.1").body);
    assert_eq!(options["brands"].as_array().unwrap().len(), 3);
    assert_eq!(options["end"], "2022-02-02");
}

#[test]
fn manifest_absent_without_file() {
    assert_eq!(route(&dashboard(), "GET /api/manifest HTTP/1.1").status, 404);
}

#[test]
fn unknown_routes_and_methods() {
    let dash = dashboard();
    assert_eq!(route(&dash, "GET /api/health HTTP/1.1").status, 200);
    assert_eq!(route(&dash, "GET /missing HTTP/1.1").status, 404);
    assert_eq!(route(&dash, "POST /api/update HTTP/1.1").status, 405);
    assert_eq!(route(&dash, "").status, 400);
}

async fn start_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_listener(Arc::new(dashboard()), listener));
    addr
}

async fn send(addr: std::net::SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(3), stream.read_to_end(&mut out))
        .await
        .expect("no response within 3s")
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn idle_connection_does_not_block_other_clients() {
    let addr = start_server().await;
    let _idle = TcpStream::connect(addr).await.unwrap();
    let resp = send(addr, b"GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"), "{}", resp);
    assert!(resp.ends_with("{\"status\":\"ok\"}"));
}

#[tokio::test]
async fn oversized_request_line_is_rejected() {
    let addr = start_server().await;
    let mut request = b"GET /".to_vec();
    request.resize(MAX_REQUEST_BYTES as usize, b'a');
    let resp = send(addr, &request).await;
    assert!(resp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", resp);
}
