// src/address/mod.rs

pub mod decompose;
pub mod geocode;
pub mod states;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Unresolved;

pub use decompose::decompose;
pub use geocode::GeocoderClient;
pub use states::state_name;

/// Postal components of one physical address. Missing parts are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressComponents {
    pub street: String,
    pub unit: String,
    pub city: String,
    /// Full state name, or the source code verbatim when it is not a US state.
    pub state: String,
    pub postal_code: String,
}

impl AddressComponents {
    /// True when only the street line is populated, i.e. the line was not decomposed.
    pub fn is_undecomposed(&self) -> bool {
        self.city.is_empty() && self.state.is_empty() && self.postal_code.is_empty()
    }
}

/// Turns a raw address line into components.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, raw: &str) -> Result<AddressComponents, Unresolved>;
}

/// Pattern-based local decomposition; never leaves the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalResolver;

#[async_trait]
impl AddressResolver for LocalResolver {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn resolve(&self, raw: &str) -> Result<AddressComponents, Unresolved> {
        Ok(decompose(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_resolver_never_fails() {
        let r = LocalResolver;
        let a = r.resolve("").await.unwrap();
        assert_eq!(a, AddressComponents::default());

        let a = r.resolve("NOWHERE IN PARTICULAR").await.unwrap();
        assert!(a.is_undecomposed());
        assert_eq!(a.street, "NOWHERE IN PARTICULAR");
    }
}
