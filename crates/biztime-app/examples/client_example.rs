///  To run :
///  cargo r --example client_example
use biztime_client::BizTimeClient;
use biztime_hex::inbound::http::{HttpServer, HttpServerConfig};
use biztime_repo::build_repo;
use biztime_types::api::{CreateCompanyRequest, UpdateCompanyRequest};
use reqwest::StatusCode;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("biztime.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let repo = build_repo(Some(&db_url)).await?;
    let server = HttpServer::new(
        repo,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = BizTimeClient::new(&addr)?;
    let company = client
        .create_company(CreateCompanyRequest {
            code: None,
            name: Some("Example Corp".into()),
            description: Some("Sample company".into()),
        })
        .await?;
    println!("Created company code={}", company.code);
    assert_eq!(company.code, "examplecorp");

    let invoice = client.create_invoice(&company.code, 250.0).await?;
    println!("Created invoice id={} added {}", invoice.id, invoice.add_date);

    let detail = client.get_company(&company.code).await?;
    println!("Company invoices={:?}", detail.invoices);
    assert_eq!(detail.invoices, vec![invoice.id]);

    let paid = client.update_invoice(invoice.id, 300.0, Some(true)).await?;
    println!("Invoice paid={} on {:?}", paid.paid, paid.paid_date);

    let renamed = client
        .update_company(
            &company.code,
            UpdateCompanyRequest {
                name: Some("Example Corporation".into()),
                description: Some("Renamed".into()),
            },
        )
        .await?;
    println!("Renamed to {}", renamed.name);

    client.delete_company(&company.code).await?;
    println!("Deleted company");

    // Invoices go with their company.
    match client.get_invoice(invoice.id).await {
        Ok(_) => anyhow::bail!("invoice {} survived its company", invoice.id),
        Err(err) => {
            let status = err.downcast_ref::<reqwest::Error>().and_then(|e| e.status());
            assert_eq!(status, Some(StatusCode::NOT_FOUND));
            println!("Invoice {} is gone", invoice.id);
        }
    }

    handle.abort();
    Ok(())
}
