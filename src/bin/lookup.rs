use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mc_autofill::{
    config::AddressStrategy,
    output::{form_params, KeyScheme},
    AddressStatus, Config, LookupError,
};
use std::process::exit;
use tracing::error;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Local,
    Geocoder,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Flat,
    Bracketed,
}

/// Look up one motor carrier and print its form-ready record.
#[derive(Parser, Debug)]
struct Args {
    /// MC/MX/FF identifier, bare digits or prefixed (`MC-123456`)
    identifier: String,

    /// Address strategy; defaults to ADDRESS_STRATEGY or `local`
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

fn exit_code(err: &LookupError) -> i32 {
    match err {
        LookupError::MissingIdentifier | LookupError::InvalidIdentifier(_) => 2,
        LookupError::Fetch { .. } => 3,
        LookupError::NotFound { .. } => 4,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env().context("loading configuration")?;
    mc_autofill::init_tracing(&config.log_level);

    if let Some(s) = args.strategy {
        config.strategy = match s {
            Strategy::Local => AddressStrategy::Local,
            Strategy::Geocoder => AddressStrategy::Geocoder,
        };
    }

    let lookup = config.build_lookup()?;
    let record = match lookup.run(&args.identifier).await {
        Ok(r) => r,
        Err(e) => {
            error!(stage = %e.stage(), error = ?e, "lookup failed");
            eprintln!("Error ({} stage): {}", e.stage(), e);
            exit(exit_code(&e));
        }
    };

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        Format::Flat | Format::Bracketed => {
            let scheme = match args.format {
                Format::Flat => KeyScheme::Flat,
                _ => KeyScheme::Bracketed,
            };
            for (k, v) in form_params(&record, scheme) {
                println!("{k}\t{v}");
            }
        }
    }

    if let AddressStatus::Unresolved(reason) = &record.address_status {
        eprintln!("Error (resolve stage): address unresolved: {reason}");
        exit(5);
    }
    Ok(())
}
