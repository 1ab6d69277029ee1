//! Integration tests for the reqwest collaborators against a mock HTTP server.

use std::time::Duration;

use httpmock::prelude::*;
use nearby_services::{
    DirectoryClient, DirectoryError, GeocodeError, GeocodeResolver, HttpDirectoryClient,
    NearbyQuery, NewUser, NominatimResolver, ServicesConfig, User,
};
use serde_json::json;

fn config_for(server: &MockServer) -> ServicesConfig {
    ServicesConfig::builder()
        .geocoder_url(server.url("/search"))
        .directory_url(server.base_url())
        .request_timeout(Duration::from_secs(1))
        .build()
        .expect("Mock server config should be valid")
}

#[tokio::test]
async fn test_resolve_returns_ranked_candidates() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "1 Main St")
                .query_param("format", "json");
            then.status(200).json_body(json!([
                {"display_name": "1 Main St, Bothell, WA", "lat": "47.75", "lon": "-122.20"},
                {"display_name": "1 Main St, Kenmore, WA", "lat": "47.76", "lon": "-122.24"}
            ]));
        })
        .await;

    let resolver = NominatimResolver::new(&config_for(&server)).unwrap();
    let candidates = resolver.resolve("  1 Main St ").await.unwrap();

    mock.assert_async().await;
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].display_name, "1 Main St, Bothell, WA");
    assert_eq!((candidates[0].latitude, candidates[0].longitude), (47.75, -122.20));
}

#[tokio::test]
async fn test_resolve_empty_array_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search").query_param("q", "asdkjasdasd");
            then.status(200).json_body(json!([]));
        })
        .await;

    let resolver = NominatimResolver::new(&config_for(&server)).unwrap();
    let result = resolver.resolve("asdkjasdasd").await;
    assert_eq!(result, Err(GeocodeError::not_found("asdkjasdasd")));
}

#[tokio::test]
async fn test_resolve_rejects_blank_query_without_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!([]));
        })
        .await;

    let resolver = NominatimResolver::new(&config_for(&server)).unwrap();
    assert_eq!(resolver.resolve("   ").await, Err(GeocodeError::EmptyQuery));
    assert_eq!(mock.calls_async().await, 0);
}

#[tokio::test]
async fn test_resolve_server_error_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        })
        .await;

    let resolver = NominatimResolver::new(&config_for(&server)).unwrap();
    assert!(matches!(
        resolver.resolve("Seattle").await,
        Err(GeocodeError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_resolve_timeout_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!([]));
        })
        .await;

    let resolver = NominatimResolver::new(&config_for(&server)).unwrap();
    assert!(matches!(
        resolver.resolve("Seattle").await,
        Err(GeocodeError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_suggest_sends_limit_and_country_filter() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "Sea")
                .query_param("limit", "5")
                .query_param("countrycodes", "us")
                .query_param("addressdetails", "1");
            then.status(200).json_body(json!([
                {"display_name": "Seattle, WA", "lat": "47.6062", "lon": "-122.3321"}
            ]));
        })
        .await;

    let config = ServicesConfig::builder()
        .geocoder_url(server.url("/search"))
        .country_codes("us")
        .build()
        .unwrap();
    let resolver = NominatimResolver::new(&config).unwrap();
    let suggestions = resolver.suggest("Sea", 5).await.unwrap();

    mock.assert_async().await;
    assert_eq!(suggestions[0].display_name, "Seattle, WA");
}

#[tokio::test]
async fn test_list_users() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/");
            then.status(200).json_body(json!([
                {"id": 1, "username": "DogLover123", "latitude": 47.7511, "longitude": -122.1983},
                {"id": 2, "username": "PuppyParent", "latitude": 47.7749, "longitude": -122.2034}
            ]));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let users = directory.list_users().await.unwrap();
    assert_eq!(
        users,
        vec![
            User::new(1, "DogLover123", 47.7511, -122.1983),
            User::new(2, "PuppyParent", 47.7749, -122.2034),
        ]
    );
}

#[tokio::test]
async fn test_register_user_posts_coordinates() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/signup").json_body(json!({
                "username": "PuppyParent",
                "latitude": 47.75,
                "longitude": -122.2
            }));
            then.status(201)
                .json_body(json!({"user": {"id": 42, "name": "PuppyParent"}}));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let user = directory
        .register_user(&NewUser {
            username: "PuppyParent".to_string(),
            latitude: 47.75,
            longitude: -122.2,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(user, User::new(42, "PuppyParent", 47.75, -122.2));
}

#[tokio::test]
async fn test_register_user_without_id_reads_back_listing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(201).json_body(json!({"user": {"name": "PuppyParent"}}));
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/");
            then.status(200).json_body(json!([
                {"id": 7, "username": "PuppyParent", "latitude": 47.75, "longitude": -122.2}
            ]));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let user = directory
        .register_user(&NewUser {
            username: "PuppyParent".to_string(),
            latitude: 47.75,
            longitude: -122.2,
        })
        .await
        .unwrap();

    assert_eq!(listing.calls_async().await, 1);
    assert_eq!(user.id, 7);
}

#[tokio::test]
async fn test_register_user_rejection_is_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(400)
                .json_body(json!({"detail": "Username already registered"}));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let result = directory
        .register_user(&NewUser {
            username: "PuppyParent".to_string(),
            latitude: 47.75,
            longitude: -122.2,
        })
        .await;
    assert_eq!(
        result,
        Err(DirectoryError::rejected("Username already registered"))
    );
}

#[tokio::test]
async fn test_search_nearby_posts_radius_in_miles() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/nearby").json_body(json!({
                "latitude": 47.75,
                "longitude": -122.2,
                "radius": 5.0
            }));
            then.status(200).json_body(json!([
                {"id": 1, "username": "DogLover123", "latitude": 47.7511, "longitude": -122.1983},
                {"id": 3, "username": "GoldenRetrieverFan", "latitude": 47.7558, "longitude": -122.2156}
            ]));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let users = directory
        .search_nearby(&NearbyQuery {
            latitude: 47.75,
            longitude: -122.2,
            radius_miles: 5.0,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].username, "GoldenRetrieverFan");
}

#[tokio::test]
async fn test_directory_server_error_is_unreachable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/nearby");
            then.status(500).body("boom");
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let result = directory
        .search_nearby(&NearbyQuery {
            latitude: 47.75,
            longitude: -122.2,
            radius_miles: 5.0,
        })
        .await;
    assert!(result.is_err_and(|e| e.is_unreachable()));
}

#[tokio::test]
async fn test_directory_down_is_unreachable() {
    // Nothing listens on the discard port.
    let config = ServicesConfig::builder()
        .directory_url("http://127.0.0.1:9")
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let directory = HttpDirectoryClient::new(&config).unwrap();
    assert!(directory.list_users().await.is_err_and(|e| e.is_unreachable()));
}

#[tokio::test]
async fn test_listing_refused_is_unreachable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/");
            then.status(404).json_body(json!({"detail": "Not Found"}));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    assert_eq!(
        directory.list_users().await,
        Err(DirectoryError::unreachable("Not Found"))
    );
}

#[tokio::test]
async fn test_nearby_search_refused_is_unreachable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/nearby");
            then.status(404);
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let result = directory
        .search_nearby(&NearbyQuery {
            latitude: 47.75,
            longitude: -122.2,
            radius_miles: 5.0,
        })
        .await;
    assert!(result.is_err_and(|e| e.is_unreachable()));
}

#[tokio::test]
async fn test_acknowledged_signup_is_never_unreachable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(201).json_body(json!({"user": {"name": "Rex"}}));
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/");
            then.status(503);
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let result = directory
        .register_user(&NewUser {
            username: "Rex".to_string(),
            latitude: 47.75,
            longitude: -122.2,
        })
        .await;

    assert_eq!(listing.calls_async().await, 1);
    assert_eq!(result, Err(DirectoryError::unconfirmed("Rex")));
}

#[tokio::test]
async fn test_acknowledged_signup_missing_from_listing_is_unconfirmed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signup");
            then.status(201).json_body(json!({"username": "Rex"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/");
            then.status(200).json_body(json!([]));
        })
        .await;

    let directory = HttpDirectoryClient::new(&config_for(&server)).unwrap();
    let result = directory
        .register_user(&NewUser {
            username: "Rex".to_string(),
            latitude: 47.75,
            longitude: -122.2,
        })
        .await;
    assert_eq!(result, Err(DirectoryError::unconfirmed("Rex")));
}
