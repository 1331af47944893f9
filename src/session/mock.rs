//! Scripted session collaborators for tests
//!
//! Probe counters live behind an `Arc` so assertions remain possible
//! after the session has been boxed and handed to the executor.

use crate::errors::{Result, SessionError};
use crate::session::{DiagnosticCapture, SessionBox, SessionFactory, SessionHandle};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared call counters for one mock session
#[derive(Debug, Default)]
pub struct MockProbes {
    pub reload_calls: AtomicUsize,
    pub navigate_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub ready_calls: AtomicUsize,
    pub navigated_to: Mutex<Vec<String>>,
}

impl MockProbes {
    pub fn reloads(&self) -> usize {
        self.reload_calls.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigate_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

/// Configurable fake session handle
pub struct MockSession {
    probes: Arc<MockProbes>,
    locator: String,
    log: Vec<String>,
    ready: bool,
    reload_fails: bool,
    navigate_fails: bool,
    introspection_fails: bool,
    introspection_delay: Option<Duration>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            probes: Arc::new(MockProbes::default()),
            locator: "https://example.com/".to_string(),
            log: Vec::new(),
            ready: true,
            reload_fails: false,
            navigate_fails: false,
            introspection_fails: false,
            introspection_delay: None,
        }
    }

    pub fn probes(&self) -> Arc<MockProbes> {
        Arc::clone(&self.probes)
    }

    pub fn with_locator(mut self, locator: &str) -> Self {
        self.locator = locator.to_string();
        self
    }

    pub fn with_log(mut self, log: Vec<String>) -> Self {
        self.log = log;
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn fail_reload(mut self) -> Self {
        self.reload_fails = true;
        self
    }

    pub fn fail_navigation(mut self) -> Self {
        self.navigate_fails = true;
        self
    }

    pub fn fail_introspection(mut self) -> Self {
        self.introspection_fails = true;
        self
    }

    pub fn with_introspection_delay(mut self, delay: Duration) -> Self {
        self.introspection_delay = Some(delay);
        self
    }
}

#[async_trait]
impl SessionHandle for MockSession {
    async fn reload(&mut self) -> Result<()> {
        self.probes.reload_calls.fetch_add(1, Ordering::SeqCst);
        if self.reload_fails {
            return Err(SessionError::Connection("reload refused".to_string()));
        }
        Ok(())
    }

    async fn navigate_to(&mut self, locator: &str) -> Result<()> {
        self.probes.navigate_calls.fetch_add(1, Ordering::SeqCst);
        if self.navigate_fails {
            return Err(SessionError::Navigation {
                locator: locator.to_string(),
                reason: "net::ERR_ABORTED".to_string(),
            });
        }
        self.probes
            .navigated_to
            .lock()
            .unwrap()
            .push(locator.to_string());
        self.locator = locator.to_string();
        Ok(())
    }

    async fn current_locator(&self) -> Result<String> {
        if let Some(delay) = self.introspection_delay {
            tokio::time::sleep(delay).await;
        }
        if self.introspection_fails {
            return Err(SessionError::SessionFailure(
                "target window already closed".to_string(),
            ));
        }
        Ok(self.locator.clone())
    }

    async fn is_ready(&self, _timeout: Duration) -> Result<bool> {
        self.probes.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ready)
    }

    async fn session_log(&self) -> Result<Vec<String>> {
        if let Some(delay) = self.introspection_delay {
            tokio::time::sleep(delay).await;
        }
        if self.introspection_fails {
            return Err(SessionError::SessionFailure(
                "log endpoint unreachable".to_string(),
            ));
        }
        Ok(self.log.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.probes.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out fresh ready sessions, counting creations
#[derive(Default)]
pub struct MockFactory {
    pub created: AtomicUsize,
}

#[async_trait]
impl SessionFactory for MockFactory {
    async fn create(&self) -> Result<SessionBox> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession::new()))
    }
}

/// Capture stub returning a canned artifact path
pub struct MockCapture {
    pub should_fail: bool,
    pub calls: AtomicUsize,
}

impl MockCapture {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DiagnosticCapture for MockCapture {
    async fn capture(
        &self,
        _session: &dyn SessionHandle,
        operation_name: &str,
    ) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "screenshot target gone",
            )));
        }
        Ok(PathBuf::from(format!("/tmp/captures/{operation_name}.png")))
    }
}
