use async_trait::async_trait;
use biztime_types::domain::company::{Company, CompanyChanges, CompanySummary, NewCompany};
use biztime_types::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceDetail, InvoiceSummary, NewInvoice,
};
use biztime_types::ports::company_repository::CompanyRepository;
use biztime_types::ports::invoice_repository::InvoiceRepository;
use biztime_types::ports::RepoError;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// DashMap-backed store that enforces the same constraints as the SQL
/// schema: unique code and name, NOT NULL columns, positive amounts, the
/// invoice → company foreign key and delete cascade.
#[derive(Clone)]
pub struct InMemoryRepo {
    pub companies: Arc<DashMap<String, Company>>,
    pub invoices: Arc<DashMap<i64, Invoice>>,
    next_id: Arc<AtomicI64>,
    // Held across the name check and the write so UNIQUE(name) holds
    // under concurrent creates and renames.
    company_writes: Arc<Mutex<()>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            companies: Arc::new(DashMap::new()),
            invoices: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            company_writes: Arc::new(Mutex::new(())),
        }
    }

    fn lock_company_writes(&self) -> MutexGuard<'_, ()> {
        self.company_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a fully-formed invoice, keeping the id sequence ahead of it.
    pub fn seed_invoice(&self, invoice: Invoice) {
        self.next_id.fetch_max(invoice.id + 1, Ordering::SeqCst);
        self.invoices.insert(invoice.id, invoice);
    }

    fn name_taken(&self, name: &str, except_code: Option<&str>) -> bool {
        self.companies
            .iter()
            .any(|kv| kv.value().name == name && Some(kv.key().as_str()) != except_code)
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn not_null(column: &str) -> RepoError {
    RepoError::Constraint(format!("NOT NULL constraint failed: {column}"))
}

#[async_trait]
impl CompanyRepository for InMemoryRepo {
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, RepoError> {
        let mut list: Vec<CompanySummary> = self
            .companies
            .iter()
            .map(|kv| CompanySummary {
                code: kv.code.clone(),
                name: kv.name.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn get_company(&self, code: &str) -> Result<Option<Company>, RepoError> {
        Ok(self.companies.get(code).map(|r| r.clone()))
    }

    async fn company_invoice_ids(&self, code: &str) -> Result<Vec<i64>, RepoError> {
        let mut ids: Vec<i64> = self
            .invoices
            .iter()
            .filter(|kv| kv.comp_code == code)
            .map(|kv| *kv.key())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn create_company(&self, company: NewCompany) -> Result<Company, RepoError> {
        let code = company.code.ok_or_else(|| not_null("companies.code"))?;
        let name = company.name.ok_or_else(|| not_null("companies.name"))?;
        let _guard = self.lock_company_writes();
        if self.name_taken(&name, None) {
            return Err(RepoError::Constraint(
                "UNIQUE constraint failed: companies.name".into(),
            ));
        }
        match self.companies.entry(code.clone()) {
            Entry::Occupied(_) => Err(RepoError::Constraint(
                "UNIQUE constraint failed: companies.code".into(),
            )),
            Entry::Vacant(slot) => {
                let created = Company {
                    code,
                    name,
                    description: company.description,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> Result<Option<Company>, RepoError> {
        if !self.companies.contains_key(code) {
            return Ok(None);
        }
        let name = changes.name.ok_or_else(|| not_null("companies.name"))?;
        let _guard = self.lock_company_writes();
        if self.name_taken(&name, Some(code)) {
            return Err(RepoError::Constraint(
                "UNIQUE constraint failed: companies.name".into(),
            ));
        }
        Ok(self.companies.get_mut(code).map(|mut c| {
            c.name = name;
            c.description = changes.description;
            c.clone()
        }))
    }

    async fn delete_company(&self, code: &str) -> Result<bool, RepoError> {
        if self.companies.remove(code).is_none() {
            return Ok(false);
        }
        self.invoices.retain(|_, inv| inv.comp_code != code);
        Ok(true)
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryRepo {
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, RepoError> {
        let mut list: Vec<InvoiceSummary> = self
            .invoices
            .iter()
            .map(|kv| InvoiceSummary {
                id: kv.id,
                comp_code: kv.comp_code.clone(),
            })
            .collect();
        list.sort_by_key(|i| i.id);
        Ok(list)
    }

    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceDetail>, RepoError> {
        let Some(inv) = self.invoices.get(&id).map(|r| r.clone()) else {
            return Ok(None);
        };
        Ok(self.companies.get(&inv.comp_code).map(|company| InvoiceDetail {
            id: inv.id,
            amt: inv.amt,
            paid: inv.paid,
            add_date: inv.add_date,
            paid_date: inv.paid_date,
            company: company.clone(),
        }))
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RepoError> {
        let comp_code = invoice.comp_code.ok_or_else(|| not_null("invoices.comp_code"))?;
        let amt = invoice.amt.ok_or_else(|| not_null("invoices.amt"))?;
        if !self.companies.contains_key(&comp_code) {
            return Err(RepoError::Constraint("FOREIGN KEY constraint failed".into()));
        }
        if amt <= 0.0 {
            return Err(RepoError::Constraint(
                "CHECK constraint failed: amt > 0".into(),
            ));
        }
        let created = Invoice {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            comp_code,
            amt,
            paid: false,
            add_date: Utc::now(),
            paid_date: None,
        };
        self.invoices.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_invoice(
        &self,
        id: i64,
        changes: InvoiceChanges,
    ) -> Result<Option<Invoice>, RepoError> {
        let Some(mut inv) = self.invoices.get_mut(&id) else {
            return Ok(None);
        };
        let amt = changes.amt.ok_or_else(|| not_null("invoices.amt"))?;
        if amt <= 0.0 {
            return Err(RepoError::Constraint(
                "CHECK constraint failed: amt > 0".into(),
            ));
        }
        inv.amt = amt;
        match changes.paid {
            Some(true) => {
                inv.paid = true;
                inv.paid_date.get_or_insert_with(Utc::now);
            }
            Some(false) => {
                inv.paid = false;
                inv.paid_date = None;
            }
            None => {}
        }
        Ok(Some(inv.clone()))
    }

    async fn delete_invoice(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.invoices.remove(&id).is_some())
    }
}
