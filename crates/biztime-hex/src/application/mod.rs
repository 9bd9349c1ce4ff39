pub mod company_service;
pub mod invoice_service;
