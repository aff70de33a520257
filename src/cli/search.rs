//! Pull request search for a configured repository.

use std::io::{self, Write};
use std::sync::Arc;

use prowl::github::{
    Clock, SystemClock, Transport, filter_by_search_term, sort_pull_requests,
};
use prowl::telemetry::{
    NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetryEvent, TelemetrySink,
};
use prowl::{
    CancellationSignal, OctocrabTransport, PersonalAccessToken, ProwlConfig, ResultSet,
    SearchError, SearchPipeline,
};
use url::Url;

use super::output::{io_error, write_json, write_listing_summary};

/// Searches pull requests and writes the results to stdout.
///
/// # Errors
///
/// Returns an error if the filters, token, or API base are invalid, or if
/// the search itself fails.
pub async fn run(config: &ProwlConfig, cancel: &CancellationSignal) -> Result<(), SearchError> {
    let sink: Box<dyn TelemetrySink> = if config.telemetry {
        Box::new(StderrJsonlTelemetrySink)
    } else {
        Box::new(NoopTelemetrySink)
    };
    let mut buffer = Vec::new();
    run_with_transport_builder(
        config,
        OctocrabTransport::for_token,
        Arc::new(SystemClock),
        sink.as_ref(),
        cancel,
        &mut buffer,
    )
    .await?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&buffer)
        .map_err(|error| io_error(&error))
}

/// Searches pull requests using a caller-supplied transport builder.
///
/// Filters are validated before the token is resolved or the transport is
/// built.
///
/// # Errors
///
/// Returns the first configuration, search, or output error.
pub async fn run_with_transport_builder<T, F, W>(
    config: &ProwlConfig,
    build_transport: F,
    clock: Arc<dyn Clock>,
    sink: &dyn TelemetrySink,
    cancel: &CancellationSignal,
    writer: &mut W,
) -> Result<(), SearchError>
where
    T: Transport + 'static,
    F: FnOnce(&PersonalAccessToken, &Url) -> Result<T, SearchError>,
    W: Write,
{
    let criteria = config.filter_criteria(clock.now().date_naive())?;
    let repository = criteria.repository_slug()?.to_string();
    criteria.date_range.validate()?;
    let sort_key = config.sort_key()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let api_base = config.api_base_url()?;
    let transport = build_transport(&token, &api_base)?;

    let pipeline = SearchPipeline::new(Arc::new(transport), clock, config.pipeline_settings());
    let result = pipeline.search(&criteria, cancel).await?;

    sink.record(TelemetryEvent::SearchCompleted {
        repository: repository.clone(),
        returned: result.items.len(),
        total_count: result.total_count,
    });

    let mut items = match config.search.as_deref() {
        Some(term) => filter_by_search_term(&result.items, term),
        None => result.items,
    };
    sort_pull_requests(&mut items, sort_key, config.sort_direction());

    if config.json {
        let shown = ResultSet {
            items,
            total_count: result.total_count,
        };
        write_json(writer, &shown)
    } else {
        write_listing_summary(writer, &repository, &items, result.total_count)
    }
}
