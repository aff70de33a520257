//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use prowl::{PullRequest, ResultSet, SearchError};

/// Marker appended to pull requests that have been open too long.
const AT_RISK_MARKER: &str = "[at risk]";

/// Writes a table of pull requests followed by a count line.
///
/// `heading` names what was searched; `total_count` is the capped remote
/// match count, which may exceed the rows shown.
///
/// # Errors
///
/// Returns [`SearchError::Io`] when the writer fails.
pub fn write_listing_summary<W: Write>(
    writer: &mut W,
    heading: &str,
    pull_requests: &[PullRequest],
    total_count: u64,
) -> Result<(), SearchError> {
    writeln!(writer, "Pull requests for {heading}:").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;

    if pull_requests.is_empty() {
        writeln!(writer, "  No pull requests found.").map_err(|e| io_error(&e))?;
    }

    for pr in pull_requests {
        writeln!(writer, "{}", format_row(pr)).map_err(|e| io_error(&e))?;
    }

    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "Showing {} of {total_count} pull requests.",
        pull_requests.len()
    )
    .map_err(|e| io_error(&e))?;

    let at_risk = pull_requests.iter().filter(|pr| pr.is_at_risk()).count();
    if at_risk > 0 {
        writeln!(writer, "{at_risk} open for more than a week.").map_err(|e| io_error(&e))?;
    }

    Ok(())
}

fn format_row(pr: &PullRequest) -> String {
    let marker = if pr.is_at_risk() {
        format!(" {AT_RISK_MARKER}")
    } else {
        String::new()
    };
    format!(
        "  #{} [{}] {} (@{}) {}{marker}",
        pr.number(),
        pr.status(),
        pr.title(),
        pr.author().login,
        pr.stats_summary()
    )
}

/// Writes the result set as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`SearchError::Io`] when serialisation or the writer fails.
pub fn write_json<W: Write>(writer: &mut W, result: &ResultSet) -> Result<(), SearchError> {
    serde_json::to_writer_pretty(&mut *writer, result).map_err(|error| SearchError::Io {
        message: error.to_string(),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Converts an I/O error into a search error.
pub fn io_error(error: &io::Error) -> SearchError {
    SearchError::Io {
        message: error.to_string(),
    }
}
