//! The bridge runs session requests on its own runtime and hands the
//! responses back to the calling thread.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use tablescope::domain::abi::AbiDocument;
use tablescope::domain::session::{Phase, Request, Session, SessionSettings};
use tablescope::domain::table::ChainService;
use tablescope::infrastructure::chain::MemoryChainService;
use tablescope::infrastructure::runtime::{RuntimeBridge, RuntimeEvent};

fn chain() -> Arc<dyn ChainService> {
    let abi: AbiDocument = serde_json::from_value(json!({
        "tables": [{"name": "accounts", "type": "account"}]
    }))
    .unwrap();
    Arc::new(
        MemoryChainService::new()
            .with_abi("eosio.token", abi)
            .with_row("eosio.token", "accounts", "alice", 1, json!({"balance": "1.0000 EOS"})),
    )
}

/// Pump the bridge until the session has nothing left in flight
fn drive(bridge: &RuntimeBridge, session: &mut Session, requests: Vec<Request>) {
    let mut outstanding = requests.len();
    bridge.execute_all(requests).unwrap();
    while outstanding > 0 {
        match bridge.recv_timeout(Duration::from_secs(5)) {
            Some(RuntimeEvent::Completed(response)) => {
                outstanding -= 1;
                let follow_up = session.apply(response);
                outstanding += follow_up.len();
                bridge.execute_all(follow_up).unwrap();
            }
            Some(RuntimeEvent::Error { message }) => panic!("worker failed: {message}"),
            None => panic!("timed out waiting for the worker"),
        }
    }
}

#[test]
fn test_requests_round_trip_through_worker() {
    let bridge = RuntimeBridge::with_service(chain()).unwrap();
    let mut session = Session::new(SessionSettings::default());

    let requests = session.set_contract("eosio.token").unwrap();
    drive(&bridge, &mut session, requests);
    assert_eq!(session.phase(), Phase::InterfaceLoaded);
    assert_eq!(
        session.chain_info().map(|info| info.chain_id.as_str()),
        Some("memory")
    );

    let requests = session.set_table("accounts").unwrap();
    drive(&bridge, &mut session, requests);
    assert_eq!(session.phase(), Phase::RowsLoaded);
    assert_eq!(session.selection().scope.as_deref(), Some("alice"));
    assert_eq!(session.rows().len(), 1);
}

#[test]
fn test_superseded_response_is_ignored() {
    let bridge = RuntimeBridge::with_service(chain()).unwrap();
    let mut session = Session::new(SessionSettings::default());

    let first = session.set_contract("eosio.token").unwrap();
    let second = session.set_contract("eosio.token").unwrap();
    let current = second[0].ticket;
    bridge.execute_all(first).unwrap();
    bridge.execute_all(second).unwrap();

    // completion order is up to the worker
    for _ in 0..2 {
        match bridge.recv_timeout(Duration::from_secs(5)) {
            Some(RuntimeEvent::Completed(response)) => {
                let fresh = response.ticket == current;
                session.apply(response);
                if !fresh {
                    assert_ne!(session.phase(), Phase::Error);
                }
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(session.phase(), Phase::InterfaceLoaded);
    assert_eq!(session.ticket(), current);
}
