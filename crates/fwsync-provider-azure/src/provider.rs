//! The ARM REST client implementing `CloudProvider`.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use fwsync_core::{Address, FirewallRule, Target};
use fwsync_provider::{CloudProvider, ComputeEndpoint, ProviderError};

use crate::auth::{AzureCredentials, TokenProvider};

const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

const WEB_API_VERSION: &str = "2023-12-01";
const SQL_API_VERSION: &str = "2021-11-01";

/// Authenticated ARM session scoped to one subscription.
pub struct AzureProvider {
    http: reqwest::Client,
    auth: TokenProvider,
    subscription_id: String,
    management_endpoint: String,
}

impl AzureProvider {
    /// Creates a provider against the public Azure cloud.
    pub fn new(credentials: AzureCredentials) -> Self {
        Self::with_endpoints(credentials, LOGIN_ENDPOINT, MANAGEMENT_ENDPOINT)
    }

    /// Creates a provider against explicit endpoint roots (sovereign clouds,
    /// tests).
    pub fn with_endpoints(
        credentials: AzureCredentials,
        login_endpoint: &str,
        management_endpoint: &str,
    ) -> Self {
        let http = reqwest::Client::new();
        let auth = TokenProvider::new(
            http.clone(),
            credentials.clone(),
            login_endpoint,
            management_endpoint,
        );
        Self {
            http,
            auth,
            subscription_id: credentials.subscription_id,
            management_endpoint: management_endpoint.to_string(),
        }
    }

    fn scope_url(&self, scope: &str, provider_path: &str, api_version: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{scope}/providers/{provider_path}?api-version={api_version}",
            self.management_endpoint, self.subscription_id
        )
    }

    fn rule_url(&self, target: &Target, name: &str) -> String {
        format!(
            "{}{}/firewallRules/{name}?api-version={SQL_API_VERSION}",
            self.management_endpoint, target.id
        )
    }

    /// GETs a list resource, following `nextLink` pagination to exhaustion.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        first_url: String,
        operation: &'static str,
    ) -> Result<Vec<T>, ProviderError> {
        let token = self.auth.token().await?;
        let mut items = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| ProviderError::transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::status(
                    status.as_u16(),
                    operation,
                    excerpt(&body),
                ));
            }

            let page: ListResponse<T> = response
                .json()
                .await
                .map_err(|e| ProviderError::invalid_response(e.to_string()))?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ListResponse<T> {
    #[serde(default)]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct SiteResource {
    name: String,
    #[serde(default)]
    properties: SiteProperties,
}

#[derive(Deserialize, Default)]
struct SiteProperties {
    #[serde(rename = "outboundIpAddresses", default)]
    outbound_ip_addresses: String,
}

#[derive(Deserialize)]
struct ServerResource {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct RuleResource {
    name: String,
    #[serde(default)]
    properties: RuleProperties,
}

#[derive(Deserialize, Default)]
struct RuleProperties {
    #[serde(rename = "startIpAddress", default)]
    start_ip_address: String,
}

#[async_trait]
impl CloudProvider for AzureProvider {
    async fn list_endpoints(&self, scope: &str) -> Result<Vec<ComputeEndpoint>, ProviderError> {
        let url = self.scope_url(scope, "Microsoft.Web/sites", WEB_API_VERSION);
        let sites: Vec<SiteResource> = self.get_paged(url, "list_endpoints").await?;
        Ok(sites
            .into_iter()
            .map(|site| ComputeEndpoint::new(site.name, site.properties.outbound_ip_addresses))
            .collect())
    }

    async fn list_targets(&self, scope: &str) -> Result<Vec<Target>, ProviderError> {
        let url = self.scope_url(scope, "Microsoft.Sql/servers", SQL_API_VERSION);
        let servers: Vec<ServerResource> = self.get_paged(url, "list_targets").await?;
        Ok(servers
            .into_iter()
            .map(|server| Target::new(server.id, server.name))
            .collect())
    }

    async fn list_rules(&self, target: &Target) -> Result<Vec<FirewallRule>, ProviderError> {
        let url = format!(
            "{}{}/firewallRules?api-version={SQL_API_VERSION}",
            self.management_endpoint, target.id
        );
        let rules: Vec<RuleResource> = self.get_paged(url, "list_rules").await?;
        Ok(rules
            .into_iter()
            .map(|rule| FirewallRule::new(rule.name, rule.properties.start_ip_address))
            .collect())
    }

    async fn create_rule(
        &self,
        target: &Target,
        name: &str,
        address: &Address,
    ) -> Result<(), ProviderError> {
        let token = self.auth.token().await?;
        // Single-address range; PUT upserts, so a name collision with a
        // pre-existing manual rule is last-write-wins.
        let body = json!({
            "properties": {
                "startIpAddress": address.as_str(),
                "endIpAddress": address.as_str(),
            }
        });
        let response = self
            .http
            .put(self.rule_url(target, name))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        expect_success(response, "create_rule").await
    }

    async fn delete_rule(&self, target: &Target, name: &str) -> Result<(), ProviderError> {
        let token = self.auth.token().await?;
        let response = self
            .http
            .delete(self.rule_url(target, name))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        expect_success(response, "delete_rule").await
    }

    fn provider_name(&self) -> &'static str {
        "azure"
    }
}

async fn expect_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<(), ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::status(
            status.as_u16(),
            operation,
            excerpt(&body),
        ))
    }
}

/// Error-report excerpt of a response body.
pub(crate) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert!(short.chars().count() <= 201);
        assert!(short.ends_with('…'));

        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_scope_url_shape() {
        let provider = AzureProvider::with_endpoints(
            AzureCredentials {
                tenant_id: "tenant".into(),
                subscription_id: "sub".into(),
                client_id: "client".into(),
                client_secret: "secret".into(),
            },
            "https://login.example",
            "https://management.example",
        );
        assert_eq!(
            provider.scope_url("my-rg", "Microsoft.Sql/servers", SQL_API_VERSION),
            "https://management.example/subscriptions/sub/resourceGroups/my-rg/providers/Microsoft.Sql/servers?api-version=2021-11-01"
        );
    }
}
