use async_trait::async_trait;
use biztime_types::domain::company::{Company, CompanyChanges, CompanySummary, NewCompany};
use biztime_types::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceDetail, InvoiceSummary, NewInvoice,
};
use biztime_types::domain::timestamp;
use biztime_types::ports::company_repository::CompanyRepository;
use biztime_types::ports::invoice_repository::InvoiceRepository;
use biztime_types::ports::RepoError;
use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

const MIGRATIONS: [&str; 2] = [
    include_str!("../migrations/0001_create_companies.sql"),
    include_str!("../migrations/0002_create_invoices.sql"),
];

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbCompany {
    code: String,
    name: String,
    description: Option<String>,
}

impl From<DbCompany> for Company {
    fn from(r: DbCompany) -> Self {
        Company {
            code: r.code,
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(FromRow)]
struct DbCompanySummary {
    code: String,
    name: String,
}

#[derive(FromRow)]
struct DbInvoiceSummary {
    id: i64,
    comp_code: String,
}

#[derive(FromRow)]
struct DbInvoice {
    id: i64,
    comp_code: String,
    amt: f64,
    paid: bool,
    add_date: String,
    paid_date: Option<String>,
}

impl DbInvoice {
    fn into_invoice(self) -> Result<Invoice, RepoError> {
        Ok(Invoice {
            id: self.id,
            comp_code: self.comp_code,
            amt: self.amt,
            paid: self.paid,
            add_date: parse_ts(&self.add_date)?,
            paid_date: self.paid_date.as_deref().map(parse_ts).transpose()?,
        })
    }
}

#[derive(FromRow)]
struct DbInvoiceDetail {
    id: i64,
    comp_code: String,
    amt: f64,
    paid: bool,
    add_date: String,
    paid_date: Option<String>,
    name: String,
    description: Option<String>,
}

impl DbInvoiceDetail {
    fn into_detail(self) -> Result<InvoiceDetail, RepoError> {
        Ok(InvoiceDetail {
            id: self.id,
            amt: self.amt,
            paid: self.paid,
            add_date: parse_ts(&self.add_date)?,
            paid_date: self.paid_date.as_deref().map(parse_ts).transpose()?,
            company: Company {
                code: self.comp_code,
                name: self.name,
                description: self.description,
            },
        })
    }
}

fn parse_ts(s: &str) -> Result<chrono::DateTime<Utc>, RepoError> {
    timestamp::parse(s).map_err(|e| RepoError::DbError(format!("bad timestamp {s:?}: {e}")))
}

fn db_err(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => return RepoError::Constraint(db.message().to_string()),
            _ => {}
        }
    }
    RepoError::DbError(e.to_string())
}

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        for ddl in MIGRATIONS {
            sqlx::query(ddl).execute(&pool).await?;
        }
        tracing::debug!(database_url, "sqlite repository ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_invoice(&self, id: i64) -> Result<Option<Invoice>, RepoError> {
        let row: Option<DbInvoice> = sqlx::query_as(
            "SELECT id, comp_code, amt, paid, add_date, paid_date FROM invoices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_invoice()).transpose()
    }
}

#[async_trait]
impl CompanyRepository for SqliteRepo {
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, RepoError> {
        let rows: Vec<DbCompanySummary> =
            sqlx::query_as("SELECT code, name FROM companies ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|r| CompanySummary {
                code: r.code,
                name: r.name,
            })
            .collect())
    }

    async fn get_company(&self, code: &str) -> Result<Option<Company>, RepoError> {
        let row: Option<DbCompany> =
            sqlx::query_as("SELECT code, name, description FROM companies WHERE code = ?")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.map(Company::from))
    }

    async fn company_invoice_ids(&self, code: &str) -> Result<Vec<i64>, RepoError> {
        sqlx::query_scalar("SELECT id FROM invoices WHERE comp_code = ? ORDER BY id")
            .bind(code)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn create_company(&self, company: NewCompany) -> Result<Company, RepoError> {
        sqlx::query("INSERT INTO companies (code, name, description) VALUES (?, ?, ?)")
            .bind(&company.code)
            .bind(&company.name)
            .bind(&company.description)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        // The insert above rejects a NULL code, so it is present here.
        let code = company.code.unwrap_or_default();
        self.get_company(&code)
            .await?
            .ok_or_else(|| RepoError::DbError(format!("company {code} missing after insert")))
    }

    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> Result<Option<Company>, RepoError> {
        let updated = sqlx::query("UPDATE companies SET name = ?, description = ? WHERE code = ?")
            .bind(changes.name)
            .bind(changes.description)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_company(code).await
    }

    async fn delete_company(&self, code: &str) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM companies WHERE code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl InvoiceRepository for SqliteRepo {
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, RepoError> {
        let rows: Vec<DbInvoiceSummary> =
            sqlx::query_as("SELECT id, comp_code FROM invoices ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|r| InvoiceSummary {
                id: r.id,
                comp_code: r.comp_code,
            })
            .collect())
    }

    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceDetail>, RepoError> {
        let row: Option<DbInvoiceDetail> = sqlx::query_as(
            "SELECT i.id, i.comp_code, i.amt, i.paid, i.add_date, i.paid_date, c.name, c.description
             FROM invoices AS i
             INNER JOIN companies AS c ON i.comp_code = c.code
             WHERE i.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_detail()).transpose()
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RepoError> {
        let res = sqlx::query("INSERT INTO invoices (comp_code, amt) VALUES (?, ?)")
            .bind(invoice.comp_code)
            .bind(invoice.amt)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        let id = res.last_insert_rowid();
        self.fetch_invoice(id)
            .await?
            .ok_or_else(|| RepoError::DbError(format!("invoice {id} missing after insert")))
    }

    async fn update_invoice(
        &self,
        id: i64,
        changes: InvoiceChanges,
    ) -> Result<Option<Invoice>, RepoError> {
        let updated = sqlx::query(
            "UPDATE invoices
             SET amt = ?1,
                 paid = COALESCE(?2, paid),
                 paid_date = CASE
                     WHEN ?2 IS NULL THEN paid_date
                     WHEN ?2 THEN COALESCE(paid_date, ?3)
                     ELSE NULL
                 END
             WHERE id = ?4",
        )
        .bind(changes.amt)
        .bind(changes.paid)
        .bind(timestamp::format(&Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_invoice(id).await
    }

    async fn delete_invoice(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
