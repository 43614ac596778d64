//! End-to-end tool calls against stub providers

use crate::integration::mock_providers::*;
use geoweather_mcp::tools::DispatchError;
use mockito::Matcher;
use geoweather_mcp::{ContentEnvelope, RenderPolicy, ToolInvocation, ToolRegistry};
use serde_json::{json, Value};

async fn call(registry: &ToolRegistry, name: &str, args: Value) -> ContentEnvelope {
    registry
        .call(&ToolInvocation::new(name, args))
        .await
        .expect("dispatch")
}

#[tokio::test]
async fn test_forecast_success_one_text_block() {
    let mut fx = MockProviders::new().await;
    let mock = fx
        .mock_json(
            Provider::Weather,
            WEATHER_PATH,
            vec![
                ("key", "test-weather-key"),
                ("location", "杭州"),
                ("language", "zh-Hans"),
                ("unit", "c"),
                ("start", "0"),
                ("days", "1"),
            ],
            200,
            HANGZHOU_FORECAST,
        )
        .await;

    let env = call(&fx.registry(), "get-forecast", json!({"location": "杭州"})).await;

    mock.assert_async().await;
    assert_eq!(env.len(), 1);
    assert!(!env.is_error());
    assert_eq!(env.texts(), vec!["杭州2024-05-01天气：多云 17°C ~ 26°C"]);
}

#[tokio::test]
async fn test_forecast_without_results_is_empty_result_text() {
    let mut fx = MockProviders::new().await;
    let mock = fx
        .mock_json(Provider::Weather, WEATHER_PATH, vec![], 200, r#"{"results":[]}"#)
        .await;

    let env = call(&fx.registry(), "get-forecast", json!({"location": "杭州"})).await;

    mock.assert_async().await;
    assert_eq!(env.texts(), vec!["Retrieved 杭州 weather data error"]);
}

#[tokio::test]
async fn test_geocode_success_one_text_block() {
    let mut fx = MockProviders::new().await;
    let mock = fx
        .mock_json(
            Provider::Amap,
            GEOCODE_PATH,
            vec![("key", "test-amap-key"), ("address", "杭州")],
            200,
            HANGZHOU_GEOCODE,
        )
        .await;

    let env = call(
        &fx.registry(),
        "get-lating-and-longitude",
        json!({"address": "杭州"}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(
        env.texts(),
        vec!["杭州 lating and longitude is 120.155070,30.274084"]
    );
}

#[tokio::test]
async fn test_route_success_two_text_blocks() {
    let mut fx = MockProviders::new().await;
    let mock = fx
        .mock_json(
            Provider::Amap,
            DRIVING_PATH,
            vec![
                ("origin", "116.481028,39.989643"),
                ("destination", "116.434446,39.90816"),
                ("key", "test-amap-key"),
                ("show_fields", "polyline"),
            ],
            200,
            DRIVING_ROUTE,
        )
        .await;

    let env = call(
        &fx.registry(),
        "route-planning",
        json!({"source": "116.481028,39.989643", "destination": "116.434446,39.90816"}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(env.len(), 2);
    assert!(env.blocks().iter().all(|b| b.is_text()));
    let texts = env.texts();
    assert_eq!(
        texts[0],
        "路径规划描述: \n向西北行驶117米右转\n沿阜通东大街向东行驶1.2公里左转\n到达目的地"
    );
    assert_eq!(
        texts[1],
        "路径规划的经纬度坐标集合: \n116.481,39.989;116.480,39.990\n116.480,39.990;116.492,39.985\n116.434,39.908;116.434,39.909"
    );
}

#[tokio::test]
async fn test_static_map_bytes_become_base64_image() {
    let mut fx = MockProviders::new().await;
    let mock = fx.mock_image(&PNG_MAGIC, "image/png").await;

    let env = call(
        &fx.registry(),
        "draw-route",
        json!({"paths": "10,0x0000ff,1,,:116.31604,39.96491;116.320816,39.966606"}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(env.len(), 1);
    let block = env.first();
    assert!(block.is_image());
    assert_eq!(block.value(), "iVBORw==");
    let wire = serde_json::to_value(&env).unwrap();
    assert_eq!(wire["content"][0]["mimeType"], "image/png");
}

#[tokio::test]
async fn test_http_error_status_is_failure_text_without_retry() {
    let mut fx = MockProviders::new().await;
    let weather = fx
        .mock_json(Provider::Weather, WEATHER_PATH, vec![], 500, r#"{"status":"boom"}"#)
        .await;
    let geo = fx
        .mock_json(Provider::Amap, GEOCODE_PATH, vec![], 503, "")
        .await;
    let route = fx
        .mock_json(Provider::Amap, DRIVING_PATH, vec![], 502, "")
        .await;
    let map = fx
        .amap
        .mock("GET", STATIC_MAP_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let registry = fx.registry();

    let cases = [
        ("get-forecast", json!({"location": "杭州"}), "Failed to retrieve 杭州 weather data"),
        ("get-lating-and-longitude", json!({"address": "杭州"}), "Failed to retrieve 杭州 lating and longitude"),
        ("route-planning", json!({"source": "1,1", "destination": "2,2"}), "Failed to retrieve 1,1 and 2,2 route plan"),
        ("draw-route", json!({"paths": "p"}), "Failed to retrieve p route plan"),
    ];
    for (tool, args, expected) in cases {
        let env = call(&registry, tool, args).await;
        assert_eq!(env.len(), 1, "{tool}");
        assert!(env.is_error(), "{tool}");
        assert_eq!(env.texts(), vec![expected]);
    }

    // expect(1) on each stub: exactly one attempt, no retry
    weather.assert_async().await;
    geo.assert_async().await;
    route.assert_async().await;
    map.assert_async().await;
}

#[tokio::test]
async fn test_network_error_is_failure_text() {
    let registry = registry_for(unreachable_config());

    let env = call(&registry, "get-forecast", json!({"location": "杭州"})).await;
    assert_eq!(env.texts(), vec!["Failed to retrieve 杭州 weather data"]);

    let env = call(&registry, "draw-route", json!({"paths": "p"})).await;
    assert_eq!(env.texts(), vec!["Failed to retrieve p route plan"]);
    assert!(env.first().is_text());
}

#[tokio::test]
async fn test_rejection_renders_like_transport_failure() {
    let mut fx = MockProviders::new().await;
    let _geo = fx
        .mock_json(Provider::Amap, GEOCODE_PATH, vec![], 200, REJECTED)
        .await;
    let _route = fx
        .mock_json(Provider::Amap, DRIVING_PATH, vec![], 200, REJECTED)
        .await;
    let rejected_registry = fx.registry();
    let unreachable = registry_for(unreachable_config());

    let geo_args = json!({"address": "杭州"});
    let route_args = json!({"source": "1,1", "destination": "2,2"});

    let rejected = call(&rejected_registry, "get-lating-and-longitude", geo_args.clone()).await;
    let failed = call(&unreachable, "get-lating-and-longitude", geo_args).await;
    assert_eq!(rejected, failed);

    let rejected = call(&rejected_registry, "route-planning", route_args.clone()).await;
    let failed = call(&unreachable, "route-planning", route_args).await;
    assert_eq!(rejected, failed);
}

#[tokio::test]
async fn test_distinguish_policy_names_provider_status() {
    let mut fx = MockProviders::new().await;
    let _geo = fx
        .mock_json(Provider::Amap, GEOCODE_PATH, vec![], 200, REJECTED)
        .await;
    let mut cfg = fx.config();
    cfg.render_policy = RenderPolicy::Distinguish;

    let env = call(&registry_for(cfg), "get-lating-and-longitude", json!({"address": "杭州"})).await;
    assert_eq!(
        env.texts(),
        vec!["Failed to retrieve 杭州 lating and longitude (provider status 0: INVALID_USER_KEY)"]
    );
}

#[tokio::test]
async fn test_missing_argument_issues_no_request() {
    let mut fx = MockProviders::new().await;
    let amap = fx.forbid_any(Provider::Amap).await;
    let weather = fx.forbid_any(Provider::Weather).await;
    let registry = fx.registry();

    let err = registry
        .call(&ToolInvocation::new(
            "route-planning",
            json!({"source": "116.397,39.909"}),
        ))
        .await
        .unwrap_err();
    match err {
        DispatchError::InvalidArguments(failure) => {
            assert!(failure.is_missing("destination"));
            assert_eq!(failure.violations.len(), 1);
        }
        other => panic!("unexpected {other}"),
    }

    let err = registry
        .call(&ToolInvocation::new("get-forecast", json!({"location": 310000})))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArguments(_)));

    amap.assert_async().await;
    weather.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_calls_do_not_cross_talk() {
    let mut fx = MockProviders::new().await;
    let weather = fx
        .mock_json(
            Provider::Weather,
            WEATHER_PATH,
            vec![("location", "杭州")],
            200,
            HANGZHOU_FORECAST,
        )
        .await;
    let geo = fx
        .mock_json(
            Provider::Amap,
            GEOCODE_PATH,
            vec![("address", "北京市朝阳区阜通东大街6号")],
            200,
            r#"{"status":"1","info":"OK","geocodes":[{"location":"116.482086,39.990496"}]}"#,
        )
        .await;
    let registry = fx.registry();

    let forecast = ToolInvocation::new("get-forecast", json!({"location": "杭州"}));
    let geocode = ToolInvocation::new(
        "get-lating-and-longitude",
        json!({"address": "北京市朝阳区阜通东大街6号"}),
    );
    let (a, b) = tokio::join!(registry.call(&forecast), registry.call(&geocode));

    assert_eq!(a.unwrap().texts(), vec!["杭州2024-05-01天气：多云 17°C ~ 26°C"]);
    assert_eq!(
        b.unwrap().texts(),
        vec!["北京市朝阳区阜通东大街6号 lating and longitude is 116.482086,39.990496"]
    );
    weather.assert_async().await;
    geo.assert_async().await;
}

#[tokio::test]
async fn test_forecast_ignores_fields_it_does_not_render() {
    let mut fx = MockProviders::new().await;
    let mock = fx
        .mock_json(
            Provider::Weather,
            WEATHER_PATH,
            vec![("location", "杭州")],
            200,
            r#"{"results":[{"location":{"id":"WTMKQ069CCJ7"},
                "daily":[{"date":"2024-05-01","text_day":"多云","high":"26","low":"17"}]}]}"#,
        )
        .await;

    let env = call(&fx.registry(), "get-forecast", json!({"location": "杭州"})).await;

    mock.assert_async().await;
    assert!(!env.is_error());
    assert_eq!(env.texts(), vec!["杭州2024-05-01天气：多云 17°C ~ 26°C"]);
}

#[tokio::test]
async fn test_incomplete_bodies_are_empty_results() {
    let mut fx = MockProviders::new().await;
    let _weather = fx
        .mock_json(
            Provider::Weather,
            WEATHER_PATH,
            vec![],
            200,
            r#"{"results":[{"daily":[{"date":"2024-05-01"}]}]}"#,
        )
        .await;
    let _geo = fx
        .mock_json(
            Provider::Amap,
            GEOCODE_PATH,
            vec![],
            200,
            r#"{"status":"1","info":"OK","geocodes":[{"formatted_address":"x","location":[]}]}"#,
        )
        .await;
    let registry = fx.registry();

    let env = call(&registry, "get-forecast", json!({"location": "杭州"})).await;
    assert!(env.is_error());
    assert_eq!(env.texts(), vec!["Retrieved 杭州 weather data error"]);

    let env = call(&registry, "get-lating-and-longitude", json!({"address": "杭州"})).await;
    assert_eq!(env.texts(), vec!["Retrieved 杭州 lating and longitude error"]);
}

#[tokio::test]
async fn test_static_map_empty_body_is_an_image() {
    let mut fx = MockProviders::new().await;
    let mock = fx.mock_image(&[], "image/png").await;

    let env = call(&fx.registry(), "draw-route", json!({"paths": "p"})).await;

    mock.assert_async().await;
    assert!(!env.is_error());
    assert!(env.first().is_image());
    assert_eq!(env.first().value(), "");
}
