use crate::errors::AppError;
use biztime_types::domain::company::{
    Company, CompanyChanges, CompanyDetail, CompanySummary, NewCompany,
};
use biztime_types::ports::company_repository::CompanyRepository;

pub struct CompanyService<R: CompanyRepository> {
    repo: R,
}

fn not_found(code: &str) -> AppError {
    AppError::NotFound(format!("Company \"{code}\" not found"))
}

impl<R: CompanyRepository> CompanyService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError> {
        Ok(self.repo.list_companies().await?)
    }

    /// The company plus the ids of its invoices. Two independent reads.
    pub async fn get_company(&self, code: &str) -> Result<CompanyDetail, AppError> {
        let company = self.repo.get_company(code).await?;
        let invoices = self.repo.company_invoice_ids(code).await?;
        match company {
            Some(c) => Ok(CompanyDetail::new(c, invoices)),
            None => Err(not_found(code)),
        }
    }

    pub async fn create_company(&self, company: NewCompany) -> Result<Company, AppError> {
        let company = company.with_derived_code();
        let created = self.repo.create_company(company).await?;
        tracing::info!(code = %created.code, "company created");
        Ok(created)
    }

    pub async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> Result<Company, AppError> {
        match self.repo.update_company(code, changes).await? {
            Some(c) => Ok(c),
            None => Err(not_found(code)),
        }
    }

    pub async fn delete_company(&self, code: &str) -> Result<(), AppError> {
        if self.repo.delete_company(code).await? {
            tracing::info!(code, "company deleted");
            Ok(())
        } else {
            Err(not_found(code))
        }
    }
}
