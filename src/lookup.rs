// src/lookup.rs

use std::sync::Arc;
use std::time::Instant;

use scraper::Html;
use tracing::{info, instrument, warn};

use crate::address::{AddressComponents, AddressResolver};
use crate::error::LookupError;
use crate::fetch::{identifier_digits, DocumentSource};
use crate::record::{assemble, AddressStatus, CarrierRecord, ExtractedFields};

/// One carrier lookup: fetch, extract, resolve the address, assemble.
#[derive(Clone)]
pub struct Lookup {
    source: Arc<dyn DocumentSource>,
    resolver: Arc<dyn AddressResolver>,
}

impl Lookup {
    pub fn new(source: Arc<dyn DocumentSource>, resolver: Arc<dyn AddressResolver>) -> Self {
        Self { source, resolver }
    }

    pub fn strategy(&self) -> &'static str {
        self.resolver.name()
    }

    #[instrument(level = "info", skip(self), fields(strategy = self.resolver.name()))]
    pub async fn run(&self, identifier: &str) -> Result<CarrierRecord, LookupError> {
        let start = Instant::now();
        let digits = identifier_digits(identifier)?;
        let html = self.source.fetch(&digits).await?;

        // `Html` is not `Send`; keep it out of scope across the resolver await.
        let fields = {
            let doc = Html::parse_document(&html);
            ExtractedFields::from_document(&doc)
        };
        if !fields.has_carrier() {
            warn!(%digits, "page carried no carrier snapshot");
            return Err(LookupError::NotFound {
                identifier: identifier.trim().to_string(),
            });
        }

        let (address, status) = self.resolve_address(&fields.physical_address).await;
        let record = assemble(identifier, fields, address, status);
        info!(
            usdot = %record.usdot,
            address_status = ?record.address_status,
            elapsed = ?start.elapsed(),
            "lookup complete"
        );
        Ok(record)
    }

    async fn resolve_address(&self, raw: &str) -> (AddressComponents, AddressStatus) {
        match self.resolver.resolve(raw).await {
            Ok(address) if address.is_undecomposed() => (address, AddressStatus::Unparsed),
            Ok(address) => (address, AddressStatus::Parsed),
            Err(e) => {
                warn!(stage = %e.stage(), error = %e, "address unresolved");
                (AddressComponents::default(), AddressStatus::Unresolved(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::LocalResolver;
    use crate::error::Unresolved;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PAGE: &str = r#"<html><body><table>
        <tr><th>Operating Authority Status:</th><td>ACTIVE For Licensing purposes only</td></tr>
        <tr><th>Legal Name:</th><td>ACME TRUCKING LLC USDOT 123456</td></tr>
        <tr><th>DBA Name:</th><td></td></tr>
        <tr><th>Physical Address:</th><td>2251 S FORT APACHE RD APT 1120<br>LAS VEGAS, NV&nbsp; 89117</td></tr>
        <tr><th>Phone:</th><td>(702) 555-0100</td></tr>
        <tr><th>USDOT Number:</th><td>123456</td><th>MC/MX/FF Number(s):</th><td></td></tr>
        <tr><th>Power Units:</th><td>3</td><th>Drivers:</th><td>4</td></tr>
    </table></body></html>"#;

    struct StubSource {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn fetch(&self, _digits: &str) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.to_string())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl AddressResolver for FailingGeocoder {
        fn name(&self) -> &'static str {
            "geocoder"
        }

        async fn resolve(&self, _raw: &str) -> Result<AddressComponents, Unresolved> {
            Err(Unresolved::NoMatch)
        }
    }

    #[tokio::test]
    async fn assembles_full_record() {
        let source = StubSource::new(PAGE);
        let lookup = Lookup::new(source.clone(), Arc::new(LocalResolver));
        let r = lookup.run("MC-765432").await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(r.legal_name, "ACME TRUCKING LLC");
        assert_eq!(r.authority_status, "ACTIVE");
        assert_eq!(r.usdot, "123456");
        assert_eq!(r.mc_number, "MC-765432");
        assert_eq!(r.office_phone, "(702) 555-0100");
        assert_eq!((r.power_units.as_str(), r.drivers.as_str()), ("3", "4"));
        assert_eq!(
            r.physical_address,
            "2251 S FORT APACHE RD APT 1120 LAS VEGAS, NV 89117"
        );
        assert_eq!(r.address_status, AddressStatus::Parsed);
        assert_eq!(r.address.street, "2251 S FORT APACHE RD");
        assert_eq!(r.address.unit, "APT 1120");
        assert_eq!(r.address.city, "LAS VEGAS");
        assert_eq!(r.address.state, "Nevada");
        assert_eq!(r.address.postal_code, "89117");
    }

    #[tokio::test]
    async fn missing_identifier_never_fetches() {
        let source = StubSource::new(PAGE);
        let lookup = Lookup::new(source.clone(), Arc::new(LocalResolver));

        for id in ["", "   "] {
            let err = lookup.run(id).await.unwrap_err();
            assert!(matches!(err, LookupError::MissingIdentifier));
        }
        let err = lookup.run("MC-").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidIdentifier(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn page_without_snapshot_is_not_found() {
        let source = StubSource::new("<html><body>Record Not Found</body></html>");
        let lookup = Lookup::new(source, Arc::new(LocalResolver));
        let err = lookup.run("1").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound { identifier } if identifier == "1"));
    }

    #[tokio::test]
    async fn undecomposable_address_is_soft_failure() {
        let source = StubSource::new(
            "<table><tr><th>USDOT Number:</th><td>9</td></tr>\
             <tr><th>Physical Address:</th><td>SOMEWHERE NEAR THE RIVER</td></tr></table>",
        );
        let lookup = Lookup::new(source, Arc::new(LocalResolver));
        let r = lookup.run("9").await.unwrap();
        assert_eq!(r.address_status, AddressStatus::Unparsed);
        assert_eq!(r.address.street, "SOMEWHERE NEAR THE RIVER");
        assert_eq!(r.physical_address, "SOMEWHERE NEAR THE RIVER");
    }

    #[tokio::test]
    async fn geocoder_failure_is_flagged_unresolved() {
        let lookup = Lookup::new(StubSource::new(PAGE), Arc::new(FailingGeocoder));
        assert_eq!(lookup.strategy(), "geocoder");
        let r = lookup.run("765432").await.unwrap();
        assert_eq!(
            r.address_status,
            AddressStatus::Unresolved("geocoder returned no matches".into())
        );
        assert_eq!(r.address, AddressComponents::default());
        assert_eq!(r.legal_name, "ACME TRUCKING LLC");
        assert_eq!(r.mc_number, "765432");
    }
}
