use super::pager::{Direction, PageRequest, Pager};
use super::scopes::{collect_scopes, ScopeDescriptor};
use super::service::{ChainService, RowPage, RowQuery};
use crate::domain::abi::{ContractInterface, TableDecl};
use crate::domain::error::{ExplorerError, ExplorerResult};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_SCOPE_LIMIT: u32 = 500;

/// Request sizes for rows and the scope index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseLimits {
    pub page_limit: u32,
    pub scope_limit: u32,
}

impl Default for BrowseLimits {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            scope_limit: DEFAULT_SCOPE_LIMIT,
        }
    }
}

/// The (contract, table, scope) a page is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub contract: String,
    pub table: String,
    pub scope: String,
}

impl TableTarget {
    pub fn new(contract: impl Into<String>, table: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            table: table.into(),
            scope: scope.into(),
        }
    }
}

/// Table browsing over any [`ChainService`]
pub struct TableBrowser<'a, S: ChainService + ?Sized> {
    service: &'a S,
    limits: BrowseLimits,
}

impl<'a, S: ChainService + ?Sized> TableBrowser<'a, S> {
    pub fn new(service: &'a S, limits: BrowseLimits) -> Self {
        Self { service, limits }
    }

    pub async fn load_interface(&self, contract: &str) -> ExplorerResult<ContractInterface> {
        match self.service.get_abi(contract).await? {
            Some(abi) => Ok(ContractInterface::from_abi(contract, abi)),
            None => Err(ExplorerError::InterfaceUnavailable {
                account: contract.to_string(),
            }),
        }
    }

    pub async fn list_tables(&self, contract: &str) -> ExplorerResult<Vec<TableDecl>> {
        Ok(self.load_interface(contract).await?.tables)
    }

    pub async fn list_scopes(&self, contract: &str, table: &str) -> ExplorerResult<Vec<ScopeDescriptor>> {
        let index = self
            .service
            .get_table_by_scope(contract, table, self.limits.scope_limit)
            .await?;
        log::debug!(
            "scope index for {}/{}: {} rows",
            contract,
            table,
            index.rows.len()
        );
        Ok(collect_scopes(contract, table, index.rows))
    }

    pub fn row_query(&self, target: &TableTarget, request: &PageRequest) -> RowQuery {
        RowQuery {
            code: target.contract.clone(),
            scope: target.scope.clone(),
            table: target.table.clone(),
            limit: self.limits.page_limit,
            json: true,
            reverse: request.reverse,
            lower_bound: request.lower_bound.clone(),
            upper_bound: request.upper_bound.clone(),
        }
    }

    pub async fn fetch_rows(&self, target: &TableTarget, request: &PageRequest) -> ExplorerResult<RowPage> {
        self.service
            .get_table_rows(&self.row_query(target, request))
            .await
    }

    /// Plan, fetch and commit one move of `pager`.
    ///
    /// `Ok(None)` when the move is not possible from the current position;
    /// the pager is only touched when the fetch succeeds.
    pub async fn fetch_page(
        &self,
        target: &TableTarget,
        direction: Direction,
        pager: &mut Pager,
    ) -> ExplorerResult<Option<RowPage>> {
        let Some(request) = pager.plan(direction) else {
            return Ok(None);
        };
        let page = self.fetch_rows(target, &request).await?;
        pager.commit(&request, &page.next_key, page.has_more());
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::AbiDocument;
    use crate::infrastructure::chain::MemoryChainService;
    use serde_json::json;

    fn service() -> MemoryChainService {
        let abi: AbiDocument = serde_json::from_value(json!({
            "tables": [{"name": "orders", "type": "order"}]
        }))
        .unwrap();
        let mut chain = MemoryChainService::new().with_abi("dex", abi);
        for id in 1..=45u64 {
            chain = chain.with_row("dex", "orders", "alice", id, json!({"id": id, "owner": "alice"}));
        }
        chain
    }

    fn ids(page: &RowPage) -> Vec<u64> {
        page.rows.iter().map(|r| r["id"].as_u64().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_missing_abi_is_interface_unavailable() {
        let chain = service();
        let browser = TableBrowser::new(&chain, BrowseLimits::default());
        let err = browser.list_tables("nobody").await.unwrap_err();
        assert_eq!(
            err,
            ExplorerError::InterfaceUnavailable {
                account: "nobody".to_string()
            }
        );
        assert_eq!(browser.list_tables("dex").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pages_newest_first_and_round_trip() {
        let chain = service();
        let browser = TableBrowser::new(&chain, BrowseLimits::default());
        let target = TableTarget::new("dex", "orders", "alice");
        let mut pager = Pager::new();

        let first = browser
            .fetch_page(&target, Direction::Initial, &mut pager)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&first), (26..=45).rev().collect::<Vec<_>>());
        assert!(pager.has_more());

        let second = browser
            .fetch_page(&target, Direction::Forward, &mut pager)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&second), (6..=25).rev().collect::<Vec<_>>());
        assert_eq!(pager.page_index(), 1);

        let back = browser
            .fetch_page(&target, Direction::Backward, &mut pager)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(back.rows, first.rows);
        assert_eq!(pager.page_index(), 0);
    }

    #[tokio::test]
    async fn test_last_page_stops() {
        let chain = service();
        let browser = TableBrowser::new(&chain, BrowseLimits::default());
        let target = TableTarget::new("dex", "orders", "alice");
        let mut pager = Pager::new();
        for direction in [Direction::Initial, Direction::Forward] {
            browser.fetch_page(&target, direction, &mut pager).await.unwrap();
        }
        let last = browser
            .fetch_page(&target, Direction::Forward, &mut pager)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&last), vec![5, 4, 3, 2, 1]);
        assert!(!pager.has_more());
        assert!(browser
            .fetch_page(&target, Direction::Forward, &mut pager)
            .await
            .unwrap()
            .is_none());
        assert_eq!(pager.page_index(), 2);
    }

    #[tokio::test]
    async fn test_lookup_returns_exact_row() {
        let chain = service();
        let browser = TableBrowser::new(&chain, BrowseLimits::default());
        let target = TableTarget::new("dex", "orders", "alice");
        let mut pager = Pager::new();
        pager.begin_lookup("7");
        let page = browser
            .fetch_page(&target, Direction::Initial, &mut pager)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&page), vec![7]);
        assert!(!pager.has_more());
    }

    #[tokio::test]
    async fn test_scopes_include_contract_fallback() {
        let chain = service();
        let browser = TableBrowser::new(&chain, BrowseLimits::default());
        let scopes = browser.list_scopes("dex", "orders").await.unwrap();
        let listed: Vec<_> = scopes.iter().map(|s| (s.scope.as_str(), s.row_count)).collect();
        assert_eq!(listed, vec![("alice", 45), ("dex", 0)]);
    }
}
