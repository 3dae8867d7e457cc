//! Runtime bridge - connects the sync TUI thread with the async Tokio runtime
//!
//! The TUI sends session requests; the worker runs each one as its own task
//! and reports the response back. Responses may arrive out of order; the
//! session sorts that out with tickets.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;

use crate::domain::session::{Request, Response};
use crate::domain::table::ChainService;
use crate::infrastructure::chain::{build_client, HttpChainService};
use crate::infrastructure::runtime::worker::{run_async_worker, ServiceFactory};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Run a session request
    Execute(Request),
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A request finished (successfully or not)
    Completed(Response),
    /// Worker-level failure
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Bridge talking HTTP to whatever endpoint each request names
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = build_client(timeout)?;
        Self::with_factory(Box::new(move |endpoint: &str| {
            Arc::new(HttpChainService::new(http.clone(), endpoint)) as Arc<dyn ChainService>
        }))
    }

    /// Bridge answering every request from one service, whatever the endpoint
    pub fn with_service(service: Arc<dyn ChainService>) -> anyhow::Result<Self> {
        Self::with_factory(Box::new(move |_: &str| service.clone()))
    }

    fn with_factory(factory: ServiceFactory) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime")?;

        // Spawn the worker thread that owns the runtime
        thread::Builder::new()
            .name("tablescope-worker".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(factory, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })
            .context("Failed to spawn worker thread")?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Queue requests produced by a session transition
    pub fn execute_all(&self, requests: Vec<Request>) -> anyhow::Result<()> {
        for request in requests {
            self.send(RuntimeCommand::Execute(request))?;
        }
        Ok(())
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Wait up to `timeout` for one event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        self.evt_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
