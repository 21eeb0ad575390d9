//! Session handling action
//!
//! Per-request hook: check the rule, fetch an OTP, rewrite the request.
//! Any failure forwards the original request unchanged.

use crate::models::HttpRequest;
use crate::services::fetcher::OtpFetcher;
use crate::services::rewriter;
use crate::services::rules::RuleStore;
use crate::utils::error::{OtpError, SessionError};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Name under which the action is registered with the host tool
pub const SESSION_ACTION_NAME: &str = "Twilio OTP Authenticate";

/// Dedicated thread driving the runtime that OTP fetches run on
///
/// The thread keeps polling until the worker is dropped, whatever runtime
/// (if any) the caller of the action lives on.
struct FetchWorker {
    handle: Handle,
    _shutdown: oneshot::Sender<()>,
}

impl FetchWorker {
    fn start() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build OTP fetch runtime")?;
        let handle = runtime.handle().clone();
        let (shutdown, stopped) = oneshot::channel::<()>();

        std::thread::Builder::new()
            .name("otp-fetch".to_string())
            .spawn(move || {
                // Returns once the sender is dropped
                let _ = runtime.block_on(stopped);
                debug!("OTP fetch worker stopped");
            })
            .context("Failed to start OTP fetch worker")?;

        Ok(Self {
            handle,
            _shutdown: shutdown,
        })
    }
}

pub struct SessionAction {
    rules: Arc<RuleStore>,
    fetcher: OtpFetcher,
    worker: FetchWorker,
}

impl SessionAction {
    /// Starts the fetch worker thread
    pub fn new(rules: Arc<RuleStore>, fetcher: OtpFetcher) -> Result<Self> {
        Ok(Self {
            rules,
            fetcher,
            worker: FetchWorker::start()?,
        })
    }

    pub fn name(&self) -> &'static str {
        SESSION_ACTION_NAME
    }

    /// Rewrite `request`, or return it unchanged if any step fails
    ///
    /// Blocks the calling thread until the fetch completes. Safe to call from
    /// plain threads and from inside async tasks of any runtime flavor.
    pub fn perform(&self, request: &HttpRequest) -> HttpRequest {
        match self.run(request) {
            Ok(rewritten) => rewritten,
            Err(SessionError::Fetch(e)) => {
                // The fetcher already reported the failure
                warn!("Forwarding original request, no OTP available: {}", e);
                request.clone()
            }
            Err(e) => {
                error!("{}", e);
                request.clone()
            }
        }
    }

    /// Same as [`perform`](Self::perform) but reports why the request was left alone
    pub fn run(&self, request: &HttpRequest) -> Result<HttpRequest, SessionError> {
        let rule = self.rules.current().ok_or(SessionError::MissingRule)?;

        let otp = self.fetch_blocking()?;
        info!("Generated OTP: {}", otp);

        let rewritten = rewriter::apply(request, &rule, &otp)?;
        info!("Injected OTP into {} '{}'", rule.kind(), rule.field_name());
        Ok(rewritten)
    }

    /// The single blocking wait on the async fetch
    fn fetch_blocking(&self) -> Result<String, OtpError> {
        let fetcher = self.fetcher.clone();
        let task = self
            .worker
            .handle
            .spawn(async move { fetcher.fetch_latest_otp().await });

        futures::executor::block_on(task).map_err(|e| {
            OtpError::Transport(anyhow::Error::new(e).context("OTP fetch task failed"))
        })?
    }
}
