use biztime_hex::inbound::http::{HttpServer, HttpServerConfig};
use biztime_repo::memory::InMemoryRepo;
use biztime_types::api::{CompanyBody, CompanyList, ErrorBody, InvoiceBody, InvoiceList};
use biztime_types::domain::company::{Company, CompanyDetail};
use biztime_types::domain::invoice::Invoice;
use chrono::TimeZone;
use serde_json::{json, Value};

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn seeded_repo() -> InMemoryRepo {
    let repo = InMemoryRepo::new();
    for (code, name, description) in [
        ("apple", "Apple", "Maker of OSX."),
        ("ibm", "IBM", "Big blue."),
    ] {
        repo.companies.insert(
            code.into(),
            Company {
                code: code.into(),
                name: name.into(),
                description: Some(description.into()),
            },
        );
    }
    let add_date = chrono::Utc.with_ymd_and_hms(2018, 1, 1, 5, 0, 0).unwrap();
    for (id, comp_code, amt) in [(1, "apple", 100.0), (2, "apple", 200.0), (3, "ibm", 300.0)] {
        repo.seed_invoice(Invoice {
            id,
            comp_code: comp_code.into(),
            amt,
            paid: false,
            add_date,
            paid_date: None,
        });
    }
    repo
}

/// Starts a server over a freshly seeded store and returns its base url.
async fn spawn_server() -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };
    let server = HttpServer::new(seeded_repo(), config).await.unwrap();
    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

#[tokio::test]
async fn company_routes_over_http() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", addr)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let list: CompanyList = client
        .get(format!("{}/companies", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let codes: Vec<_> = list.companies.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["apple", "ibm"]);

    let res = client
        .get(format!("{}/companies/apple", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "company": {
                "code": "apple",
                "name": "Apple",
                "description": "Maker of OSX.",
                "invoices": [1, 2]
            }
        })
    );

    let res = client
        .post(format!("{}/companies", addr))
        .json(&json!({ "name": "Shazam", "description": "Description" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: CompanyBody<Company> = res.json().await.unwrap();
    assert_eq!(
        created.company,
        Company {
            code: "shazam".into(),
            name: "Shazam".into(),
            description: Some("Description".into()),
        }
    );

    let fetched: CompanyBody<CompanyDetail> = client
        .get(format!("{}/companies/shazam", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.company.name, "Shazam");
    assert!(fetched.company.invoices.is_empty());

    let res = client
        .put(format!("{}/companies/apple", addr))
        .json(&json!({ "name": "New Apple", "description": "New Description" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: CompanyBody<Company> = res.json().await.unwrap();
    assert_eq!(updated.company.name, "New Apple");
    assert_eq!(updated.company.code, "apple");

    let res = client
        .delete(format!("{}/companies/apple", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "deleted" }));

    let res = client
        .get(format!("{}/companies/apple", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    handle.abort();
}

#[tokio::test]
async fn company_error_paths() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/companies/asdfghjkl", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let err: ErrorBody = res.json().await.unwrap();
    assert_eq!(err.error.message, "Company \"asdfghjkl\" not found");
    assert_eq!(err.error.status, 404);

    // "Apple" derives the existing code "apple"
    let res = client
        .post(format!("{}/companies", addr))
        .json(&json!({ "name": "Apple", "description": "nan" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorBody = res.json().await.unwrap();
    assert_eq!(err.error.status, 500);

    let res = client
        .put(format!("{}/companies/asdfghjkl", addr))
        .json(&json!({ "name": "New Apple", "description": "New Description" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/companies/apple", addr))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .delete(format!("{}/companies/asdfghjkl", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    handle.abort();
}

#[tokio::test]
async fn invoice_routes_over_http() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let list: InvoiceList = client
        .get(format!("{}/invoices", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pairs: Vec<_> = list
        .invoices
        .iter()
        .map(|i| (i.id, i.comp_code.as_str()))
        .collect();
    assert_eq!(pairs, [(1, "apple"), (2, "apple"), (3, "ibm")]);

    let body: Value = client
        .get(format!("{}/invoices/1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let invoice = &body["invoice"];
    assert_eq!(invoice["id"], 1);
    assert_eq!(invoice["amt"], json!(100));
    assert_eq!(invoice["paid"], false);
    assert_eq!(invoice["add_date"], "2018-01-01T05:00:00.000Z");
    assert_eq!(invoice["paid_date"], Value::Null);
    assert_eq!(
        invoice["company"],
        json!({ "code": "apple", "name": "Apple", "description": "Maker of OSX." })
    );

    let res = client
        .post(format!("{}/invoices", addr))
        .json(&json!({ "amt": "400", "comp_code": "ibm" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: InvoiceBody<Invoice> = res.json().await.unwrap();
    assert_eq!(created.invoice.id, 4);
    assert_eq!(created.invoice.comp_code, "ibm");
    assert_eq!(created.invoice.amt, 400.0);
    assert!(!created.invoice.paid);
    assert!(created.invoice.paid_date.is_none());

    let res = client
        .put(format!("{}/invoices/1", addr))
        .json(&json!({ "amt": "300" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let invoice = &body["invoice"];
    assert_eq!(invoice["amt"].as_f64(), Some(300.0));
    assert_eq!(invoice["comp_code"], "apple");
    assert_eq!(invoice["paid"], false);
    assert_eq!(invoice["add_date"], "2018-01-01T05:00:00.000Z");
    assert_eq!(invoice["paid_date"], Value::Null);

    let res = client
        .put(format!("{}/invoices/1", addr))
        .json(&json!({ "amt": 300, "paid": true }))
        .send()
        .await
        .unwrap();
    let paid: InvoiceBody<Invoice> = res.json().await.unwrap();
    assert!(paid.invoice.paid);
    assert!(paid.invoice.paid_date.is_some());

    let res = client
        .delete(format!("{}/invoices/1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "deleted" }));

    handle.abort();
}

#[tokio::test]
async fn invoice_error_paths() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/invoices/9999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let err: ErrorBody = res.json().await.unwrap();
    assert_eq!(err.error.message, "Invoice \"9999\" not found");

    let res = client
        .post(format!("{}/invoices", addr))
        .json(&json!({ "amt": 10, "comp_code": "ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .post(format!("{}/invoices", addr))
        .json(&json!({ "amt": "ten", "comp_code": "ibm" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .put(format!("{}/invoices/9999", addr))
        .json(&json!({ "amt": "300" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/invoices/1", addr))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .delete(format!("{}/invoices/9999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    for id in ["abc", "99999999999999999999"] {
        let res = client
            .get(format!("{}/invoices/{}", addr, id))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorBody = res.json().await.unwrap();
        assert_eq!(err.error.status, 500);
    }

    let res = client
        .delete(format!("{}/invoices/abc", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    handle.abort();
}

#[tokio::test]
async fn malformed_bodies_are_server_errors() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    // no content type
    let res = client
        .post(format!("{}/companies", addr))
        .body(r#"{"name":"Acme"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .post(format!("{}/companies", addr))
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorBody = res.json().await.unwrap();
    assert_eq!(err.error.message, "internal error");

    let res = client
        .put(format!("{}/invoices/1", addr))
        .json(&json!("300"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .post(format!("{}/invoices", addr))
        .header("content-type", "application/json")
        .body("{\"amt\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}

#[tokio::test]
async fn companies_list_by_name_not_code() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    for (code, name) in [("zz", "Alpha"), ("aa", "Zeta")] {
        let res = client
            .post(format!("{}/companies", addr))
            .json(&json!({ "code": code, "name": name, "description": "d" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    }

    let mut listings = Vec::new();
    for _ in 0..2 {
        let list: CompanyList = client
            .get(format!("{}/companies", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        listings.push(list.companies);
    }
    let names: Vec<_> = listings[0].iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Apple", "IBM", "Zeta"]);
    assert_eq!(listings[0], listings[1]);

    handle.abort();
}
