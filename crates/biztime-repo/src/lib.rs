#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use biztime_types::domain::company::{Company, CompanyChanges, CompanySummary, NewCompany};
use biztime_types::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceDetail, InvoiceSummary, NewInvoice,
};
use biztime_types::ports::company_repository::CompanyRepository;
use biztime_types::ports::invoice_repository::InvoiceRepository;
use biztime_types::ports::RepoError;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://biztime.db";

/// Adapter picked at start-up. A database URL selects SQLite; no URL selects
/// the in-memory store when it is compiled in.
#[derive(Clone)]
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            #[cfg(feature = "sqlite")]
            Some(url) => {
                tracing::info!(url, "using sqlite repository");
                Ok(Self::Sqlite(sqlite::SqliteRepo::new(url).await?))
            }
            #[cfg(not(feature = "sqlite"))]
            Some(url) => {
                tracing::warn!(url, "sqlite support not compiled in, ignoring database url");
                Ok(Self::Memory(memory::InMemoryRepo::new()))
            }
            #[cfg(feature = "memory")]
            None => {
                tracing::info!("using in-memory repository");
                Ok(Self::Memory(memory::InMemoryRepo::new()))
            }
            #[cfg(not(feature = "memory"))]
            None => {
                tracing::info!(url = DEFAULT_DATABASE_URL, "using sqlite repository");
                Ok(Self::Sqlite(
                    sqlite::SqliteRepo::new(DEFAULT_DATABASE_URL).await?,
                ))
            }
        }
    }
}

// Forwards a call to whichever adapter is active.
macro_rules! dispatch {
    ($self:ident, $repo:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Repo::Memory($repo) => $call,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($repo) => $call,
        }
    };
}

#[async_trait::async_trait]
impl CompanyRepository for Repo {
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, RepoError> {
        dispatch!(self, r => r.list_companies().await)
    }

    async fn get_company(&self, code: &str) -> Result<Option<Company>, RepoError> {
        dispatch!(self, r => r.get_company(code).await)
    }

    async fn company_invoice_ids(&self, code: &str) -> Result<Vec<i64>, RepoError> {
        dispatch!(self, r => r.company_invoice_ids(code).await)
    }

    async fn create_company(&self, company: NewCompany) -> Result<Company, RepoError> {
        dispatch!(self, r => r.create_company(company).await)
    }

    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> Result<Option<Company>, RepoError> {
        dispatch!(self, r => r.update_company(code, changes).await)
    }

    async fn delete_company(&self, code: &str) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_company(code).await)
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for Repo {
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, RepoError> {
        dispatch!(self, r => r.list_invoices().await)
    }

    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceDetail>, RepoError> {
        dispatch!(self, r => r.get_invoice(id).await)
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RepoError> {
        dispatch!(self, r => r.create_invoice(invoice).await)
    }

    async fn update_invoice(
        &self,
        id: i64,
        changes: InvoiceChanges,
    ) -> Result<Option<Invoice>, RepoError> {
        dispatch!(self, r => r.update_invoice(id, changes).await)
    }

    async fn delete_invoice(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_invoice(id).await)
    }
}
