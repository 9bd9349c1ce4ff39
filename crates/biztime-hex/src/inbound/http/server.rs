use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    serve, Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::company_service::CompanyService;
use crate::application::invoice_service::InvoiceService;
use crate::errors::AppError;
use biztime_types::api::{
    CompanyBody, CompanyList, CreateCompanyRequest, CreateInvoiceRequest, InvoiceBody,
    InvoiceList, StatusBody, UpdateCompanyRequest, UpdateInvoiceRequest,
};
use biztime_types::domain::company::{Company, CompanyChanges, CompanyDetail};
use biztime_types::domain::invoice::{Invoice, InvoiceDetail};
use biztime_types::ports::company_repository::CompanyRepository;
use biztime_types::ports::invoice_repository::InvoiceRepository;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

/// Services shared by every handler. Both sit on the same repository handle.
pub struct AppState<R>
where
    R: CompanyRepository + InvoiceRepository,
{
    pub companies: CompanyService<R>,
    pub invoices: InvoiceService<R>,
}

#[derive(Clone)]
pub struct HttpServer<R>
where
    R: CompanyRepository + InvoiceRepository,
{
    pub state: Arc<AppState<R>>,
    pub config: HttpServerConfig,
}

type Shared<R> = State<Arc<AppState<R>>>;

impl<R> HttpServer<R>
where
    R: CompanyRepository + InvoiceRepository + Clone,
{
    pub async fn new(repo: R, config: HttpServerConfig) -> anyhow::Result<Self> {
        let state = AppState {
            companies: CompanyService::new(repo.clone()),
            invoices: InvoiceService::new(repo),
        };
        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route(
                "/companies",
                get(list_companies::<R>).post(create_company::<R>),
            )
            .route(
                "/companies/{code}",
                get(get_company::<R>)
                    .put(update_company::<R>)
                    .delete(delete_company::<R>),
            )
            .route("/invoices", get(list_invoices::<R>).post(create_invoice::<R>))
            .route(
                "/invoices/{id}",
                get(get_invoice::<R>)
                    .put(update_invoice::<R>)
                    .delete(delete_invoice::<R>),
            )
            .layer(trace_layer)
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

/// A path id that is not a 64-bit integer can never match a row; it fails
/// the same way a database type error would.
fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid invoice id {id:?}: {e}")))
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn list_companies<R>(State(state): Shared<R>) -> Result<Json<CompanyList>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let companies = state.companies.list_companies().await?;
    Ok(Json(CompanyList { companies }))
}

async fn get_company<R>(
    State(state): Shared<R>,
    Path(code): Path<String>,
) -> Result<Json<CompanyBody<CompanyDetail>>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let company = state.companies.get_company(&code).await?;
    Ok(Json(CompanyBody { company }))
}

async fn create_company<R>(
    State(state): Shared<R>,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyBody<Company>>), AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let Json(payload) = payload?;
    let company = state.companies.create_company(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(CompanyBody { company })))
}

async fn update_company<R>(
    State(state): Shared<R>,
    Path(code): Path<String>,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> Result<Json<CompanyBody<Company>>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let Json(payload) = payload?;
    let changes = CompanyChanges {
        name: payload.name,
        description: payload.description,
    };
    let company = state.companies.update_company(&code, changes).await?;
    Ok(Json(CompanyBody { company }))
}

async fn delete_company<R>(
    State(state): Shared<R>,
    Path(code): Path<String>,
) -> Result<Json<StatusBody>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    state.companies.delete_company(&code).await?;
    Ok(Json(StatusBody::deleted()))
}

async fn list_invoices<R>(State(state): Shared<R>) -> Result<Json<InvoiceList>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let invoices = state.invoices.list_invoices().await?;
    Ok(Json(InvoiceList { invoices }))
}

async fn get_invoice<R>(
    State(state): Shared<R>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceBody<InvoiceDetail>>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let invoice = state.invoices.get_invoice(parse_id(&id)?).await?;
    Ok(Json(InvoiceBody { invoice }))
}

async fn create_invoice<R>(
    State(state): Shared<R>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InvoiceBody<Invoice>>), AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let Json(payload) = payload?;
    let invoice = state
        .invoices
        .create_invoice(payload.comp_code, payload.amt)
        .await?;
    Ok((StatusCode::CREATED, Json(InvoiceBody { invoice })))
}

async fn update_invoice<R>(
    State(state): Shared<R>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateInvoiceRequest>, JsonRejection>,
) -> Result<Json<InvoiceBody<Invoice>>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let invoice = state
        .invoices
        .update_invoice(id, payload.amt, payload.paid)
        .await?;
    Ok(Json(InvoiceBody { invoice }))
}

async fn delete_invoice<R>(
    State(state): Shared<R>,
    Path(id): Path<String>,
) -> Result<Json<StatusBody>, AppError>
where
    R: CompanyRepository + InvoiceRepository,
{
    state.invoices.delete_invoice(parse_id(&id)?).await?;
    Ok(Json(StatusBody::deleted()))
}
