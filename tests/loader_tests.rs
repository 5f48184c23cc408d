mod common;

use chinabuyhub::catalog::Catalog;
use chinabuyhub::sheets::SheetsClient;
use chinabuyhub::source::Source;
use common::{service_account_json, PRODUCTS_CSV};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn csv_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn csv_catalog(server: &MockServer, has_header: bool) -> Catalog {
    Catalog::new(
        reqwest::Client::new(),
        Source::Csv {
            url: format!("{}/pub", server.uri()),
            has_header,
        },
    )
}

#[tokio::test]
async fn test_minimal_sheet_keeps_quoted_commas() {
    let server = csv_server("foto,nombre,precio\nhttp://a.png,\"Shoe, Red\",10\n,,").await;
    let catalog = csv_catalog(&server, true);

    let count = catalog.reload().await.unwrap();
    let products = catalog.snapshot().await;

    assert_eq!(count, 1);
    assert_eq!(products[0].photo_url, "http://a.png");
    assert_eq!(products[0].name, "Shoe, Red");
    assert_eq!(products[0].price, "10");
}

#[tokio::test]
async fn test_fixture_sheet_is_normalized() {
    let server = csv_server(&PRODUCTS_CSV).await;
    let catalog = csv_catalog(&server, true);

    catalog.reload().await.unwrap();
    let products = catalog.snapshot().await;
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["Nike Dunk Low", "Hoodie \"Essentials\" Negro", "Gorra NY, azul"]
    );
    assert_eq!(products[0].category, "zapatillas");
    assert_eq!(products[0].links.cnfans, "https://cnfans.com/item/1");
    assert_eq!(products[1].links.usfans, "https://usfans.com/item/2");
    assert_eq!(products[1].links.kakobuy, "");
    assert_eq!(products[2].links.kakobuy, "https://kakobuy.com/item/3");
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let server = csv_server(&PRODUCTS_CSV).await;
    let catalog = csv_catalog(&server, true);

    catalog.reload().await.unwrap();
    let first = catalog.snapshot().await;
    catalog.reload().await.unwrap();
    let second = catalog.snapshot().await;

    assert_eq!(*first, *second);
}

#[tokio::test]
async fn test_headerless_sheet_uses_column_order() {
    let server = csv_server("http://a.png,Camiseta,15€,,https://usfans.com/9,,Ropa\n").await;
    let catalog = csv_catalog(&server, false);

    catalog.reload().await.unwrap();
    let products = catalog.snapshot().await;

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].links.usfans, "https://usfans.com/9");
    assert_eq!(products[0].category, "ropa");
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCTS_CSV.as_str()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let catalog = csv_catalog(&server, true);

    catalog.reload().await.unwrap();
    let before = catalog.snapshot().await;
    assert!(catalog.reload().await.is_err());

    assert_eq!(catalog.len().await, 3);
    assert_eq!(*catalog.snapshot().await, *before);
}

#[tokio::test]
async fn test_snapshot_survives_reload() {
    let server = csv_server(&PRODUCTS_CSV).await;
    let catalog = csv_catalog(&server, true);

    let empty = catalog.snapshot().await;
    catalog.reload().await.unwrap();

    assert!(empty.is_empty());
    assert_eq!(catalog.len().await, 3);
}

#[tokio::test]
async fn test_sheets_values_with_service_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Productos!A:H"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Productos!A1:H3",
            "majorDimension": "ROWS",
            "values": [
                ["foto", "nombre", "precio", "link kakobuy", "link usfans", "link cnfans", "categoria"],
                ["https://img.example/bag.png", "Bolso", 40, "", "https://usfans.com/3"],
                ["", "Sin foto"],
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sheets = SheetsClient::from_service_account_json(
        reqwest::Client::new(),
        &service_account_json(&format!("{}/token", server.uri())),
    )
    .unwrap()
    .with_api_url(server.uri());

    let rows = sheets.fetch_values("sheet-123", "Productos!A:H").await.unwrap();
    let products = chinabuyhub::catalog::products_from_rows(&rows, true);

    assert_eq!(rows.len(), 3);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Bolso");
    assert_eq!(products[0].price, "40");
    assert_eq!(products[0].links.usfans, "https://usfans.com/3");
}

#[tokio::test]
async fn test_rejected_token_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let sheets = SheetsClient::from_service_account_json(
        reqwest::Client::new(),
        &service_account_json(&format!("{}/token", server.uri())),
    )
    .unwrap()
    .with_api_url(server.uri());

    assert!(sheets.fetch_values("sheet-123", "Productos!A:H").await.is_err());
}
