use std::time::Duration;

use anyhow::Context;
use biztime_types::api::{
    CompanyBody, CompanyList, CreateCompanyRequest, CreateInvoiceRequest, InvoiceBody,
    InvoiceList, UpdateCompanyRequest, UpdateInvoiceRequest,
};
use biztime_types::domain::company::{Company, CompanyDetail, CompanySummary};
use biztime_types::domain::invoice::{Invoice, InvoiceDetail, InvoiceSummary};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

#[derive(Clone)]
pub struct BizTimeClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct BizTimeClient {
    base: Url,
    client: reqwest::Client,
}

impl BizTimeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<BizTimeClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(BizTimeClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn list_companies(&self) -> anyhow::Result<Vec<CompanySummary>> {
        let res = self
            .client
            .get(self.url("companies")?)
            .send()
            .await?
            .error_for_status()?;
        let body: CompanyList = res.json().await?;
        Ok(body.companies)
    }

    pub async fn get_company(&self, code: &str) -> anyhow::Result<CompanyDetail> {
        let res = self
            .client
            .get(self.url(&format!("companies/{code}"))?)
            .send()
            .await?
            .error_for_status()?;
        let body: CompanyBody<CompanyDetail> = res.json().await?;
        Ok(body.company)
    }

    pub async fn create_company(&self, req: CreateCompanyRequest) -> anyhow::Result<Company> {
        let res = self
            .client
            .post(self.url("companies")?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let body: CompanyBody<Company> = res.json().await?;
        Ok(body.company)
    }

    pub async fn update_company(
        &self,
        code: &str,
        req: UpdateCompanyRequest,
    ) -> anyhow::Result<Company> {
        let res = self
            .client
            .put(self.url(&format!("companies/{code}"))?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let body: CompanyBody<Company> = res.json().await?;
        Ok(body.company)
    }

    pub async fn delete_company(&self, code: &str) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("companies/{code}"))?)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!(code, "company deleted");
        Ok(())
    }

    pub async fn list_invoices(&self) -> anyhow::Result<Vec<InvoiceSummary>> {
        let res = self
            .client
            .get(self.url("invoices")?)
            .send()
            .await?
            .error_for_status()?;
        let body: InvoiceList = res.json().await?;
        Ok(body.invoices)
    }

    pub async fn get_invoice(&self, id: i64) -> anyhow::Result<InvoiceDetail> {
        let res = self
            .client
            .get(self.url(&format!("invoices/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        let body: InvoiceBody<InvoiceDetail> = res.json().await?;
        Ok(body.invoice)
    }

    pub async fn create_invoice(&self, comp_code: &str, amt: f64) -> anyhow::Result<Invoice> {
        let req = CreateInvoiceRequest {
            comp_code: Some(comp_code.into()),
            amt: Some(amt.into()),
        };
        let res = self
            .client
            .post(self.url("invoices")?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let body: InvoiceBody<Invoice> = res.json().await?;
        Ok(body.invoice)
    }

    /// Changes the amount; `paid` toggles payment when given.
    pub async fn update_invoice(
        &self,
        id: i64,
        amt: f64,
        paid: Option<bool>,
    ) -> anyhow::Result<Invoice> {
        let req = UpdateInvoiceRequest {
            amt: Some(amt.into()),
            paid,
        };
        let res = self
            .client
            .put(self.url(&format!("invoices/{id}"))?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let body: InvoiceBody<Invoice> = res.json().await?;
        Ok(body.invoice)
    }

    pub async fn delete_invoice(&self, id: i64) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("invoices/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!(id, "invoice deleted");
        Ok(())
    }
}

impl BizTimeClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<BizTimeClient> {
        if let Some(client) = self.client {
            return Ok(BizTimeClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(BizTimeClient {
            base: self.base,
            client,
        })
    }
}
