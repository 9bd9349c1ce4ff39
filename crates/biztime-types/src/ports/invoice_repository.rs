use async_trait::async_trait;

use super::RepoError;
use crate::domain::invoice::{Invoice, InvoiceChanges, InvoiceDetail, InvoiceSummary, NewInvoice};

#[async_trait]
pub trait InvoiceRepository: Send + Sync + 'static {
    /// All invoices, ordered by id.
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, RepoError>;
    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceDetail>, RepoError>;
    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RepoError>;
    async fn update_invoice(
        &self,
        id: i64,
        changes: InvoiceChanges,
    ) -> Result<Option<Invoice>, RepoError>;
    async fn delete_invoice(&self, id: i64) -> Result<bool, RepoError>;
}
