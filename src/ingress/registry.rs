//! Named set of ingress clients.

use super::client::{ClientConfig, IngressClient};
use super::endpoint::Endpoint;
use super::error::{IngressError, Result};

/// Ingress clients keyed by selector name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct IngressRegistry {
    clients: Vec<IngressClient>,
}

impl IngressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one client per endpoint.
    pub fn from_endpoints<I>(endpoints: I, config: &ClientConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let mut registry = Self::new();
        for endpoint in endpoints {
            registry.insert(IngressClient::new(endpoint, config)?)?;
        }
        Ok(registry)
    }

    /// Add a client. Selector names must be unique.
    pub fn insert(&mut self, client: IngressClient) -> Result<()> {
        if self.get(client.name()).is_some() {
            return Err(IngressError::invalid_endpoint(
                client.name(),
                "an ingress with this name is already registered",
            ));
        }
        self.clients.push(client);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&IngressClient> {
        self.clients.iter().find(|c| c.name() == name)
    }

    /// Clients in declaration order.
    pub fn clients(&self) -> impl Iterator<Item = &IngressClient> {
        self.clients.iter()
    }

    /// Selector names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
