// src/lib.rs

pub mod address;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod lookup;
pub mod output;
pub mod record;

pub use config::Config;
pub use error::{LookupError, Stage, Unresolved};
pub use lookup::Lookup;
pub use record::{AddressStatus, CarrierRecord};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the fmt subscriber; `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}
