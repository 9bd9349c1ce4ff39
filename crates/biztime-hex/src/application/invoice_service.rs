use crate::errors::AppError;
use biztime_types::domain::invoice::{
    parse_amount, Invoice, InvoiceChanges, InvoiceDetail, InvoiceSummary, NewInvoice,
};
use biztime_types::ports::invoice_repository::InvoiceRepository;
use serde_json::Value;

pub struct InvoiceService<R: InvoiceRepository> {
    repo: R,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Invoice \"{id}\" not found"))
}

// A missing amount passes through as None so the store rejects it.
fn amount(value: Option<&Value>) -> Result<Option<f64>, AppError> {
    value
        .map(parse_amount)
        .transpose()
        .map_err(|e| AppError::Internal(e.into()))
}

impl<R: InvoiceRepository> InvoiceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        Ok(self.repo.list_invoices().await?)
    }

    pub async fn get_invoice(&self, id: i64) -> Result<InvoiceDetail, AppError> {
        match self.repo.get_invoice(id).await? {
            Some(inv) => Ok(inv),
            None => Err(not_found(id)),
        }
    }

    pub async fn create_invoice(
        &self,
        comp_code: Option<String>,
        amt: Option<Value>,
    ) -> Result<Invoice, AppError> {
        let invoice = NewInvoice {
            comp_code,
            amt: amount(amt.as_ref())?,
        };
        let created = self.repo.create_invoice(invoice).await?;
        tracing::info!(id = created.id, comp_code = %created.comp_code, "invoice created");
        Ok(created)
    }

    pub async fn update_invoice(
        &self,
        id: i64,
        amt: Option<Value>,
        paid: Option<bool>,
    ) -> Result<Invoice, AppError> {
        let changes = InvoiceChanges {
            amt: amount(amt.as_ref())?,
            paid,
        };
        match self.repo.update_invoice(id, changes).await? {
            Some(inv) => Ok(inv),
            None => Err(not_found(id)),
        }
    }

    pub async fn delete_invoice(&self, id: i64) -> Result<(), AppError> {
        if self.repo.delete_invoice(id).await? {
            tracing::info!(id, "invoice deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
