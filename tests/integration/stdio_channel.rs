//! The dispatch loop over an in-memory duplex channel

use crate::integration::mock_providers::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

/// Write `frames`, close the input, and collect every response keyed by id.
async fn exchange(fx: &MockProviders, frames: &[Value]) -> HashMap<String, Value> {
    let server = Arc::new(fx.server());
    let (mut client_in, server_in) = duplex(64 * 1024);
    let (server_out, mut client_out) = duplex(64 * 1024);

    let serving = tokio::spawn(server.serve(server_in, server_out));

    for frame in frames {
        client_in.write_all(frame.to_string().as_bytes()).await.unwrap();
        client_in.write_all(b"\n").await.unwrap();
    }
    client_in.shutdown().await.unwrap();
    drop(client_in);

    let mut raw = String::new();
    client_out.read_to_string(&mut raw).await.unwrap();
    serving.await.unwrap().unwrap();

    raw.lines()
        .map(|line| {
            let v: Value = serde_json::from_str(line).unwrap();
            (v["id"].to_string(), v)
        })
        .collect()
}

#[tokio::test]
async fn test_session_over_duplex_channel() {
    let mut fx = MockProviders::new().await;
    let _forecast = fx
        .mock_json(Provider::Weather, WEATHER_PATH, vec![("location", "杭州")], 200, HANGZHOU_FORECAST)
        .await;
    let _geocode = fx
        .mock_json(Provider::Amap, GEOCODE_PATH, vec![("address", "杭州")], 200, HANGZHOU_GEOCODE)
        .await;

    let responses = exchange(
        &fx,
        &[
            json!({"jsonrpc":"2.0","id":1,"method":"initialize",
                   "params":{"protocolVersion":"2025-03-26","capabilities":{},
                             "clientInfo":{"name":"it","version":"0"}}}),
            json!({"jsonrpc":"2.0","method":"notifications/initialized"}),
            json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}),
            json!({"jsonrpc":"2.0","id":3,"method":"tools/call",
                   "params":{"name":"get-forecast","arguments":{"location":"杭州"}}}),
            json!({"jsonrpc":"2.0","id":4,"method":"tools/call",
                   "params":{"name":"get-lating-and-longitude","arguments":{"address":"杭州"}}}),
        ],
    )
    .await;

    // the notification gets no reply
    assert_eq!(responses.len(), 4);

    assert_eq!(responses["1"]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(responses["1"]["result"]["serverInfo"]["name"], "geoweather");

    let names: Vec<&str> = responses["2"]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["get-forecast", "get-lating-and-longitude", "route-planning", "draw-route"]
    );

    assert_eq!(
        responses["3"]["result"]["content"],
        json!([{"type":"text","text":"杭州2024-05-01天气：多云 17°C ~ 26°C"}])
    );
    assert_eq!(responses["3"]["result"]["isError"], false);
    assert_eq!(
        responses["4"]["result"]["content"][0]["text"],
        "杭州 lating and longitude is 120.155070,30.274084"
    );
}

#[tokio::test]
async fn test_bad_frames_do_not_stop_the_loop() {
    let mut fx = MockProviders::new().await;
    let amap = fx.forbid_any(Provider::Amap).await;

    let responses = exchange(
        &fx,
        &[
            json!("not a request"),
            json!({"jsonrpc":"2.0","id":"v","method":"tools/call",
                   "params":{"name":"draw-route","arguments":{}}}),
            json!({"jsonrpc":"2.0","id":"u","method":"tools/call",
                   "params":{"name":"get-weather","arguments":{"location":"杭州"}}}),
            json!({"jsonrpc":"2.0","id":"p","method":"ping"}),
        ],
    )
    .await;

    assert_eq!(responses["null"]["error"]["code"], -32600);
    assert_eq!(responses["\"v\""]["result"]["isError"], true);
    assert!(responses["\"v\""]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("missing required argument 'paths'"));
    assert_eq!(responses["\"u\""]["error"]["code"], -32602);
    assert_eq!(responses["\"p\""]["result"], json!({}));

    amap.assert_async().await;
}
