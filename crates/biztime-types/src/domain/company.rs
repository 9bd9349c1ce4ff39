use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Row shape returned by the companies listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanySummary {
    pub code: String,
    pub name: String,
}

/// A company together with the ids of the invoices it owns, ordered by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyDetail {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub invoices: Vec<i64>,
}

impl CompanyDetail {
    pub fn new(company: Company, invoices: Vec<i64>) -> Self {
        Self {
            code: company.code,
            name: company.name,
            description: company.description,
            invoices,
        }
    }
}

/// Insert payload. Fields stay optional so that missing values reach the
/// store as NULL and trip its constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompany {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NewCompany {
    /// Fills in `code` from `name` when the caller left it out or blank.
    pub fn with_derived_code(mut self) -> Self {
        let missing = self.code.as_deref().map_or(true, |c| c.trim().is_empty());
        if missing {
            self.code = self.name.as_deref().map(derive_code);
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Lowercases `name` and drops every whitespace character.
pub fn derive_code(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
