//! Cooking driver: open, issue every request, close.

use std::path::Path;

use tracing::{info, warn};

use crate::request::CookRequest;
use crate::session::{CloseSummary, CookBackend, CookError, CookSession};

/// A request whose cook call failed.
#[derive(Debug, Clone)]
pub struct CookFailure {
    pub request: CookRequest,
    pub reason: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct CookReport {
    /// Cook calls issued, failed ones included
    pub issued: usize,
    pub failures: Vec<CookFailure>,
    pub summary: CloseSummary,
}

impl CookReport {
    pub fn succeeded(&self) -> usize {
        self.issued - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dispatch one request to the matching session call.
pub fn issue<S: CookSession>(session: &mut S, request: &CookRequest) -> Result<(), CookError> {
    match request {
        CookRequest::Mesh { id, file, node } => session.cook_mesh(*id, file, node),
        CookRequest::Texture { id, file, format } => session.cook_texture(*id, file, *format),
        CookRequest::Skeleton { id, file, node } => session.cook_skeleton(*id, file, node),
        CookRequest::Animation {
            id,
            file,
            animation,
        } => session.cook_animation(*id, file, animation),
        CookRequest::Audio { id, file } => session.cook_audio(*id, file),
        CookRequest::Font { id, file } => session.cook_font(*id, file),
    }
}

/// Run every request through one session bound to `output`.
///
/// Failing to open is fatal and happens before any cook call. Item failures
/// are logged and collected into the report. The session is closed exactly
/// once, and a close failure is returned as the error.
pub fn cook_all<B: CookBackend>(
    backend: &B,
    output: &Path,
    requests: &[CookRequest],
) -> Result<CookReport, CookError> {
    let mut session = backend.open(output)?;

    let mut report = CookReport::default();
    for request in requests {
        report.issued += 1;
        if let Err(e) = issue(&mut session, request) {
            warn!("{}", e);
            report.failures.push(CookFailure {
                request: request.clone(),
                reason: e.to_string(),
            });
        }
    }

    report.summary = session.close()?;

    info!(
        "Cooked {}/{} assets into {}",
        report.succeeded(),
        report.issued,
        output.display()
    );
    Ok(report)
}
