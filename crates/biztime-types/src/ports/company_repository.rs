use async_trait::async_trait;

use super::RepoError;
use crate::domain::company::{Company, CompanyChanges, CompanySummary, NewCompany};

#[async_trait]
pub trait CompanyRepository: Send + Sync + 'static {
    /// All companies, ordered by name.
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, RepoError>;
    async fn get_company(&self, code: &str) -> Result<Option<Company>, RepoError>;
    /// Ids of the invoices billed to `code`, ascending.
    async fn company_invoice_ids(&self, code: &str) -> Result<Vec<i64>, RepoError>;
    async fn create_company(&self, company: NewCompany) -> Result<Company, RepoError>;
    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> Result<Option<Company>, RepoError>;
    async fn delete_company(&self, code: &str) -> Result<bool, RepoError>;
}
