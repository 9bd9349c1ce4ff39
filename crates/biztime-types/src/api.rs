//! JSON bodies exchanged over HTTP. Request fields are optional on purpose:
//! a missing field is forwarded to the store and rejected there.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::company::{CompanySummary, NewCompany};
use crate::domain::invoice::InvoiceSummary;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CreateCompanyRequest> for NewCompany {
    fn from(r: CreateCompanyRequest) -> Self {
        Self {
            code: r.code,
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateInvoiceRequest {
    pub comp_code: Option<String>,
    pub amt: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UpdateInvoiceRequest {
    pub amt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompanyList {
    pub companies: Vec<CompanySummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompanyBody<T> {
    pub company: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InvoiceList {
    pub invoices: Vec<InvoiceSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InvoiceBody<T> {
    pub invoice: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    pub fn deleted() -> Self {
        Self {
            status: "deleted".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
}
