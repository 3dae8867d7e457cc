//! Async worker - runs in the Tokio runtime and executes chain requests

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::domain::table::ChainService;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

/// Builds the service for an endpoint
pub type ServiceFactory = Box<dyn Fn(&str) -> Arc<dyn ChainService> + Send>;

/// Run the async worker loop
pub async fn run_async_worker(
    factory: ServiceFactory,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    // One client per endpoint, reused across requests
    let mut services: HashMap<String, Arc<dyn ChainService>> = HashMap::new();

    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::Execute(request) => {
                    let service = services
                        .entry(request.endpoint.clone())
                        .or_insert_with(|| factory(&request.endpoint))
                        .clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        log::debug!("{} <- {}", request.endpoint, request.describe());
                        let response = request.execute(service.as_ref()).await;
                        let _ = evt_tx.send(RuntimeEvent::Completed(response));
                    });
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
