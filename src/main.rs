use anyhow::{Context, Result};
use mc_autofill::{
    output::{redirect_url, KeyScheme, OutputMode},
    AddressStatus, CarrierRecord, Config, Lookup, LookupError, Stage,
};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    reply::{Reply, Response},
    Filter, Rejection,
};

#[derive(Debug, Default, Deserialize)]
struct LookupRequest {
    #[serde(default, alias = "mc")]
    mc_number: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    stage: String,
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a CarrierRecord>,
}

struct App {
    lookup: Lookup,
    output: OutputMode,
    scheme: KeyScheme,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "mc-autofill"
    })))
}

fn error_status(err: &LookupError) -> StatusCode {
    match err {
        LookupError::MissingIdentifier | LookupError::InvalidIdentifier(_) => {
            StatusCode::BAD_REQUEST
        }
        LookupError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
    }
}

fn error_reply(err: &LookupError) -> Response {
    let details = std::error::Error::source(err).map(|s| s.to_string());
    let body = ErrorResponse {
        error: err.to_string(),
        stage: err.stage().to_string(),
        details,
        record: None,
    };
    warp::reply::with_status(warp::reply::json(&body), error_status(err)).into_response()
}

fn record_reply(record: &CarrierRecord, output: &OutputMode, scheme: KeyScheme) -> Response {
    if let AddressStatus::Unresolved(reason) = &record.address_status {
        let body = ErrorResponse {
            error: "address unresolved".to_string(),
            stage: Stage::Resolve.to_string(),
            details: Some(reason.clone()),
            record: Some(record),
        };
        return warp::reply::with_status(warp::reply::json(&body), StatusCode::UNPROCESSABLE_ENTITY)
            .into_response();
    }

    match output {
        OutputMode::Json => warp::reply::json(record).into_response(),
        OutputMode::Redirect(base) => {
            let location = redirect_url(base, record, scheme);
            warp::reply::with_header(
                warp::reply::with_status(warp::reply(), StatusCode::SEE_OTHER),
                "location",
                location.as_str(),
            )
            .into_response()
        }
    }
}

async fn handle_lookup(req: LookupRequest, app: Arc<App>) -> Result<Response, Infallible> {
    let start = Instant::now();
    let identifier = req.mc_number.unwrap_or_default();
    info!(identifier = %identifier, strategy = app.lookup.strategy(), "lookup request");

    match app.lookup.run(&identifier).await {
        Ok(record) => {
            info!(elapsed = ?start.elapsed(), "lookup served");
            Ok(record_reply(&record, &app.output, app.scheme))
        }
        Err(e @ (LookupError::MissingIdentifier | LookupError::InvalidIdentifier(_))) => {
            warn!(error = %e, "rejected lookup request");
            Ok(error_reply(&e))
        }
        Err(e) => {
            error!(error = ?e, elapsed = ?start.elapsed(), "lookup failed");
            Ok(error_reply(&e))
        }
    }
}

fn routes(app: Arc<App>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let state = warp::any().map(move || app.clone());

    let root = warp::path::end()
        .and(warp::get())
        .map(|| "MC Autofill API is running");
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);
    let post_lookup = warp::path!("jotform" / "mc-lookup")
        .and(warp::post())
        .and(warp::body::json())
        .and(state.clone())
        .and_then(handle_lookup);
    let get_lookup = warp::path("lookup")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<LookupRequest>())
        .and(state)
        .and_then(handle_lookup);

    root.or(health)
        .or(post_lookup)
        .or(get_lookup)
        .with(warp::trace::request())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    mc_autofill::init_tracing(&config.log_level);

    let lookup = config.build_lookup()?;
    info!(
        strategy = lookup.strategy(),
        output = ?config.output_mode,
        scheme = ?config.key_scheme,
        "Starting MC autofill service"
    );

    let app = Arc::new(App {
        lookup,
        output: config.output_mode.clone(),
        scheme: config.key_scheme,
    });

    info!("Server starting on port {}", config.port);
    info!("Health check: http://localhost:{}/health", config.port);
    info!(
        "Lookup endpoint: POST http://localhost:{}/jotform/mc-lookup",
        config.port
    );

    warp::serve(routes(app)).run(([0, 0, 0, 0], config.port)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mc_autofill::{address::LocalResolver, fetch::DocumentSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const PAGE: &str = r#"<table>
        <tr><th>Legal Name:</th><td>ACME TRUCKING LLC</td></tr>
        <tr><th>USDOT Number:</th><td>123456</td></tr>
        <tr><th>Physical Address:</th><td>100 MAIN ST LAS VEGAS, NV 89101</td></tr>
    </table>"#;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentSource for CountingSource {
        async fn fetch(&self, _digits: &str) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PAGE.to_string())
        }
    }

    fn app(source: Arc<CountingSource>, output: OutputMode) -> Arc<App> {
        Arc::new(App {
            lookup: Lookup::new(source, Arc::new(LocalResolver)),
            output,
            scheme: KeyScheme::Bracketed,
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_mc_number_is_rejected_without_fetch() {
        let source = Arc::new(CountingSource::default());
        let filter = routes(app(source.clone(), OutputMode::Json));

        let res = warp::test::request()
            .method("POST")
            .path("/jotform/mc-lookup")
            .json(&serde_json::json!({}))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["stage"], "input");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn json_mode_returns_record() {
        let source = Arc::new(CountingSource::default());
        let filter = routes(app(source.clone(), OutputMode::Json));

        let res = warp::test::request()
            .method("POST")
            .path("/jotform/mc-lookup")
            .json(&serde_json::json!({ "mc_number": "MC-765432" }))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["legal_name"], "ACME TRUCKING LLC");
        assert_eq!(body["mc_number"], "MC-765432");
        assert_eq!(body["address"]["city"], "LAS VEGAS");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn redirect_mode_sends_location() {
        let source = Arc::new(CountingSource::default());
        let base = Url::parse("https://form.example/submit/1").unwrap();
        let filter = routes(app(source, OutputMode::Redirect(base)));

        let res = warp::test::request()
            .method("GET")
            .path("/lookup?mc_number=765432")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let location = res.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("https://form.example/submit/1?usdot=123456"));
        assert!(location.contains("physical_address%5Baddr_line1%5D=100+MAIN+ST"));
    }

    #[test]
    fn fetch_and_parse_failures_map_to_distinct_statuses() {
        assert_eq!(
            error_status(&LookupError::NotFound {
                identifier: "1".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&LookupError::MissingIdentifier),
            StatusCode::BAD_REQUEST
        );
    }
}
