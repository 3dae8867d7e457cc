//! Requests issued by the session and the responses that come back

use crate::domain::abi::ContractInterface;
use crate::domain::error::ExplorerResult;
use crate::domain::table::{
    BrowseLimits, ChainInfo, ChainService, PageRequest, RowPage, ScopeDescriptor, TableBrowser,
    TableTarget,
};

use super::state::Session;

/// Generation stamp; only the newest ticket's response is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    LoadInterface { contract: String },
    LoadScopes { contract: String, table: String },
    LoadRows { target: TableTarget, page: PageRequest },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub ticket: Ticket,
    pub endpoint: String,
    pub limits: BrowseLimits,
    pub kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Interface {
        interface: ExplorerResult<ContractInterface>,
        info: Option<ChainInfo>,
    },
    Scopes(ExplorerResult<Vec<ScopeDescriptor>>),
    Rows {
        page: PageRequest,
        result: ExplorerResult<RowPage>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

impl Request {
    pub fn describe(&self) -> String {
        match &self.kind {
            RequestKind::LoadInterface { contract } => format!("interface of {}", contract),
            RequestKind::LoadScopes { contract, table } => format!("scopes of {}/{}", contract, table),
            RequestKind::LoadRows { target, page } => format!(
                "rows of {}/{}/{} ({:?})",
                target.contract, target.table, target.scope, page.direction
            ),
        }
    }

    /// Run against `service`, which must be bound to `self.endpoint`.
    ///
    /// The interface and the chain info are independent and fetched together.
    pub async fn execute<S: ChainService + ?Sized>(&self, service: &S) -> Response {
        let browser = TableBrowser::new(service, self.limits);
        let outcome = match &self.kind {
            RequestKind::LoadInterface { contract } => {
                let (interface, info) =
                    futures::join!(browser.load_interface(contract), service.get_info());
                if let Err(e) = &info {
                    log::debug!("get_info on {} failed: {}", self.endpoint, e);
                }
                Outcome::Interface {
                    interface,
                    info: info.ok(),
                }
            }
            RequestKind::LoadScopes { contract, table } => {
                Outcome::Scopes(browser.list_scopes(contract, table).await)
            }
            RequestKind::LoadRows { target, page } => Outcome::Rows {
                page: page.clone(),
                result: browser.fetch_rows(target, page).await,
            },
        };
        Response {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// Execute requests in order, feeding each response back, until none remain
pub async fn settle<S: ChainService + ?Sized>(
    session: &mut Session,
    service: &S,
    requests: Vec<Request>,
) {
    let mut queue = std::collections::VecDeque::from(requests);
    while let Some(request) = queue.pop_front() {
        let response = request.execute(service).await;
        queue.extend(session.apply(response));
    }
}
