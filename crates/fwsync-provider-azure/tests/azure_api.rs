//! ARM request/response contract tests against a mock server.

use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwsync_core::{Address, Target};
use fwsync_provider::CloudProvider;
use fwsync_provider_azure::{AzureCredentials, AzureProvider};

fn credentials() -> AzureCredentials {
    AzureCredentials {
        tenant_id: "tenant".into(),
        subscription_id: "sub".into(),
        client_id: "client".into(),
        client_secret: "secret".into(),
    }
}

fn provider_for(server: &MockServer) -> AzureProvider {
    AzureProvider::with_endpoints(credentials(), &server.uri(), &server.uri())
}

async fn mock_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "test-token"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_endpoints_parses_outbound_addresses() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Web/sites",
        ))
        .and(query_param("api-version", "2023-12-01"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"name": "web-1", "properties": {"outboundIpAddresses": "1.2.3.4,5.6.7.8"}},
                {"name": "web-2", "properties": {}}
            ]
        })))
        .mount(&server)
        .await;

    let endpoints = provider_for(&server).list_endpoints("rg").await.unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].name, "web-1");
    assert_eq!(endpoints[0].outbound_addresses, "1.2.3.4,5.6.7.8");
    assert_eq!(endpoints[1].outbound_addresses, "");
}

#[tokio::test]
async fn list_targets_follows_next_link() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers",
        ))
        .and(query_param("api-version", "2021-11-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a", "name": "sql-a"}
            ],
            "nextLink": format!("{}/page-two", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page-two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-b", "name": "sql-b"}
            ]
        })))
        .mount(&server)
        .await;

    let targets = provider_for(&server).list_targets("rg").await.unwrap();
    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["sql-a", "sql-b"]);
}

#[tokio::test]
async fn list_rules_reads_start_addresses() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    let target = Target::new(
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a",
        "sql-a",
    );

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a/firewallRules",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"name": "webapp-1-2-3-4", "properties": {"startIpAddress": "1.2.3.4", "endIpAddress": "1.2.3.4"}},
                {"name": "AllowOfficeVpn", "properties": {"startIpAddress": "203.0.113.7", "endIpAddress": "203.0.113.7"}}
            ]
        })))
        .mount(&server)
        .await;

    let rules = provider_for(&server).list_rules(&target).await.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].name, "webapp-1-2-3-4");
    assert_eq!(rules[1].address, "203.0.113.7");
}

#[tokio::test]
async fn create_rule_puts_single_address_range() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    let target = Target::new(
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a",
        "sql-a",
    );

    Mock::given(method("PUT"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a/firewallRules/webapp-1-2-3-4",
        ))
        .and(query_param("api-version", "2021-11-01"))
        .and(body_partial_json(serde_json::json!({
            "properties": {"startIpAddress": "1.2.3.4", "endIpAddress": "1.2.3.4"}
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let address = Address::parse("1.2.3.4").unwrap();
    provider_for(&server)
        .create_rule(&target, "webapp-1-2-3-4", &address)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_rule_issues_delete_by_name() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    let target = Target::new(
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a",
        "sql-a",
    );

    Mock::given(method("DELETE"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/sql-a/firewallRules/stale",
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    provider_for(&server)
        .delete_rule(&target, "stale")
        .await
        .unwrap();
}

#[tokio::test]
async fn token_is_cached_across_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "test-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.list_targets("rg").await.unwrap();
    provider.list_targets("rg").await.unwrap();
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers",
        ))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("authorization failed"),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server).list_targets("rg").await.unwrap_err();
    assert!(err.is_status());
    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("list_targets"));
}

#[tokio::test]
async fn token_failure_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid client secret"))
        .mount(&server)
        .await;

    let err = provider_for(&server).list_targets("rg").await.unwrap_err();
    assert!(err.to_string().starts_with("Authentication error"));
}
