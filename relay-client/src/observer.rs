//! Boundary diagnostics for every request.
//!
//! Observers only watch; nothing they do feeds back into control flow.

use std::{fmt, time::Duration};

use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::error::ErrorKind;

/// One completed request, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub method: Method,
    pub path: String,
    /// `None` when the server was never reached.
    pub status: Option<StatusCode>,
    /// `None` on success.
    pub failure: Option<ErrorKind>,
    pub elapsed: Duration,
}

impl RequestEvent {
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Sink for request diagnostics.
pub trait RequestObserver: Send + Sync + fmt::Debug {
    fn on_request(&self, event: &RequestEvent);
}

/// Default observer: one `tracing` event per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent) {
        let status = event.status.map_or(0, |status| status.as_u16());
        match event.failure {
            None => debug!(
                method = %event.method,
                path = %event.path,
                status,
                elapsed_ms = event.elapsed_ms(),
                "request succeeded"
            ),
            Some(kind) => warn!(
                method = %event.method,
                path = %event.path,
                status,
                kind = %kind,
                elapsed_ms = event.elapsed_ms(),
                "request failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing::Level;
    use tracing_subscriber::{fmt::MakeWriter, util::SubscriberInitExt};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn event(failure: Option<ErrorKind>) -> RequestEvent {
        RequestEvent {
            method: Method::GET,
            path: "posts/timeline".into(),
            status: Some(StatusCode::OK),
            failure,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn succeeded_tracks_failure_kind() {
        assert!(event(None).succeeded());
        assert!(!event(Some(ErrorKind::NotFound)).succeeded());
        assert_eq!(event(None).elapsed_ms(), 12);
    }

    #[test]
    fn tracing_observer_logs_both_outcomes() {
        let captured = Captured::default();
        let _guard = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(captured.clone())
            .set_default();

        TracingObserver.on_request(&event(None));
        TracingObserver.on_request(&RequestEvent {
            status: None,
            ..event(Some(ErrorKind::NetworkUnavailable))
        });

        let output = captured.text();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DEBUG"));
        assert!(lines[0].contains("request succeeded"));
        assert!(lines[0].contains("path=posts/timeline"));
        assert!(lines[0].contains("status=200"));
        assert!(lines[1].contains("WARN"));
        assert!(lines[1].contains("request failed"));
        assert!(lines[1].contains("status=0"));
    }
}
