use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fwsync_core::{Address, FirewallRule, Target};
use fwsync_provider::{CloudProvider, ComputeEndpoint, ProviderError};

/// In-memory provider state, shared across clones.
#[derive(Debug, Default)]
struct State {
    endpoints: Vec<ComputeEndpoint>,
    targets: Vec<Target>,
    /// target id -> (rule name -> address); BTreeMap so listings are stable
    rules: HashMap<String, BTreeMap<String, String>>,
    /// (target id, rule name) pairs whose delete calls fail
    failing_deletes: HashSet<(String, String)>,
    /// (target id, rule name) pairs whose create calls fail
    failing_creates: HashSet<(String, String)>,
    fail_list_endpoints: bool,
    fail_list_targets: bool,
    /// target ids whose rule listings fail
    failing_rule_lists: HashSet<String>,
}

/// In-memory `CloudProvider` implementation.
///
/// Scope-agnostic: the configured endpoints and targets are returned for any
/// scope. Mutations go through the same state the listings read, so a
/// reconcile-then-reconcile sequence observes its own writes.
///
/// The `with_*` builder methods must run before the provider is cloned or
/// shared; after that, state changes only through the trait methods (and
/// [`InMemoryProvider::heal_delete`]).
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    state: Arc<RwLock<State>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut State {
        Arc::get_mut(&mut self.state)
            .expect("with_* builders must run before the provider is shared")
            .get_mut()
    }

    /// Adds a compute endpoint with a raw comma-joined address list.
    pub fn with_endpoint(mut self, name: &str, outbound_addresses: &str) -> Self {
        self.state_mut()
            .endpoints
            .push(ComputeEndpoint::new(name, outbound_addresses));
        self
    }

    /// Adds a target (id and name are the same for in-memory targets).
    pub fn with_target(mut self, name: &str) -> Self {
        let state = self.state_mut();
        state.targets.push(Target::new(name, name));
        state.rules.entry(name.to_string()).or_default();
        self
    }

    /// Seeds an existing rule on a target.
    pub fn with_rule(mut self, target: &str, name: &str, address: &str) -> Self {
        self.state_mut()
            .rules
            .entry(target.to_string())
            .or_default()
            .insert(name.to_string(), address.to_string());
        self
    }

    /// Makes `delete_rule` fail for one (target, rule name) pair.
    pub fn with_failing_delete(mut self, target: &str, name: &str) -> Self {
        self.state_mut()
            .failing_deletes
            .insert((target.to_string(), name.to_string()));
        self
    }

    /// Makes `create_rule` fail for one (target, rule name) pair.
    pub fn with_failing_create(mut self, target: &str, name: &str) -> Self {
        self.state_mut()
            .failing_creates
            .insert((target.to_string(), name.to_string()));
        self
    }

    /// Makes `list_endpoints` fail.
    pub fn with_failing_endpoint_list(mut self) -> Self {
        self.state_mut().fail_list_endpoints = true;
        self
    }

    /// Makes `list_targets` fail.
    pub fn with_failing_target_list(mut self) -> Self {
        self.state_mut().fail_list_targets = true;
        self
    }

    /// Makes `list_rules` fail for one target.
    pub fn with_failing_rule_list(mut self, target: &str) -> Self {
        self.state_mut()
            .failing_rule_lists
            .insert(target.to_string());
        self
    }

    /// Clears an earlier delete failure injection.
    pub async fn heal_delete(&self, target: &str, name: &str) {
        self.state
            .write()
            .await
            .failing_deletes
            .remove(&(target.to_string(), name.to_string()));
    }

    /// Snapshot of a target's rules, for assertions.
    pub async fn rules_of(&self, target: &str) -> BTreeMap<String, String> {
        self.state
            .read()
            .await
            .rules
            .get(target)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CloudProvider for InMemoryProvider {
    async fn list_endpoints(&self, _scope: &str) -> Result<Vec<ComputeEndpoint>, ProviderError> {
        let state = self.state.read().await;
        if state.fail_list_endpoints {
            return Err(ProviderError::transport("injected endpoint list failure"));
        }
        Ok(state.endpoints.clone())
    }

    async fn list_targets(&self, _scope: &str) -> Result<Vec<Target>, ProviderError> {
        let state = self.state.read().await;
        if state.fail_list_targets {
            return Err(ProviderError::transport("injected target list failure"));
        }
        Ok(state.targets.clone())
    }

    async fn list_rules(&self, target: &Target) -> Result<Vec<FirewallRule>, ProviderError> {
        let state = self.state.read().await;
        if state.failing_rule_lists.contains(&target.id) {
            return Err(ProviderError::transport("injected rule list failure"));
        }
        let rules = state.rules.get(&target.id).ok_or_else(|| {
            ProviderError::status(404, "list_rules", format!("no such target {}", target.id))
        })?;
        Ok(rules
            .iter()
            .map(|(name, address)| FirewallRule::new(name.clone(), address.clone()))
            .collect())
    }

    async fn create_rule(
        &self,
        target: &Target,
        name: &str,
        address: &Address,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.write().await;
        if state
            .failing_creates
            .contains(&(target.id.clone(), name.to_string()))
        {
            return Err(ProviderError::status(
                500,
                "create_rule",
                "injected create failure",
            ));
        }
        // Upsert, matching Azure's PUT semantics
        state
            .rules
            .entry(target.id.clone())
            .or_default()
            .insert(name.to_string(), address.as_str().to_string());
        Ok(())
    }

    async fn delete_rule(&self, target: &Target, name: &str) -> Result<(), ProviderError> {
        let mut state = self.state.write().await;
        if state
            .failing_deletes
            .contains(&(target.id.clone(), name.to_string()))
        {
            return Err(ProviderError::status(
                500,
                "delete_rule",
                "injected delete failure",
            ));
        }
        state
            .rules
            .get_mut(&target.id)
            .and_then(|rules| rules.remove(name))
            .ok_or_else(|| {
                ProviderError::status(
                    404,
                    "delete_rule",
                    format!("no rule {name} on {}", target.id),
                )
            })?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
