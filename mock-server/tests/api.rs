use axum::http::{self, Request, StatusCode};
use beer_mock_server::{
    app, app_with_store, Cerveza, CervezasResponse, Fabricante, FabricantesResponse, MessageResponse, Store,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-KEY", KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-KEY", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn seeded() -> Store {
    Store {
        fabricantes: vec![Fabricante {
            id: "f1".to_string(),
            nombre: "Mahou".to_string(),
            tipo: "nacionales".to_string(),
            logo: None,
        }],
        cervezas: vec![
            Cerveza {
                id: "c1".to_string(),
                id_fabricante: "f1".to_string(),
                nombre: "Cinco Estrellas".to_string(),
                tipo: "lager".to_string(),
                logo: None,
                descripcion: "Clásica".to_string(),
                grados: 5.5,
                kcal: 180.0,
                is_fav: false,
            },
            Cerveza {
                id: "c2".to_string(),
                id_fabricante: "f1".to_string(),
                nombre: "Maestra".to_string(),
                tipo: "doble lupulo".to_string(),
                logo: Some("https://example.com/maestra.png".to_string()),
                descripcion: "Tostada".to_string(),
                grados: 7.5,
                kcal: 220.0,
                is_fav: true,
            },
        ],
    }
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(
            Request::builder()
                .uri("/fabricante/getFabricantes")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app("another-key")
        .oneshot(request("GET", "/fabricante/getFabricantes"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: MessageResponse = body_json(resp).await;
    assert!(!body.message.is_empty());
}

// --- manufacturers ---

#[tokio::test]
async fn list_manufacturers_empty() {
    let resp = app(KEY)
        .oneshot(request("GET", "/fabricante/getFabricantes"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: FabricantesResponse = body_json(resp).await;
    assert!(body.fabricantes.is_empty());
}

#[tokio::test]
async fn add_manufacturer_echoes_list_with_server_id() {
    let resp = app(KEY)
        .oneshot(json_request(
            "POST",
            "/fabricante/addFabricante",
            r#"{"nombre":"Guinness","logo":"","tipo":"importadas"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: FabricantesResponse = body_json(resp).await;
    assert_eq!(body.fabricantes.len(), 1);
    assert_eq!(body.fabricantes[0].nombre, "Guinness");
    assert_eq!(body.fabricantes[0].tipo, "importadas");
    assert!(body.fabricantes[0].logo.is_none());
    assert!(!body.fabricantes[0].id.is_empty());
}

#[tokio::test]
async fn add_manufacturer_accepts_large_inline_logo() {
    // Past axum's 2 MB default, under MAX_BODY_BYTES.
    let logo = "A".repeat(6 * 1024 * 1024);
    let body = format!(r#"{{"nombre":"Paulaner","logo":"{logo}","tipo":"importadas"}}"#);
    let resp = app(KEY)
        .oneshot(json_request("POST", "/fabricante/addFabricante", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: FabricantesResponse = body_json(resp).await;
    assert_eq!(body.fabricantes[0].logo.as_deref().map(str::len), Some(logo.len()));
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let logo = "A".repeat(beer_mock_server::MAX_BODY_BYTES);
    let body = format!(r#"{{"nombre":"Paulaner","logo":"{logo}","tipo":"importadas"}}"#);
    let resp = app(KEY)
        .oneshot(json_request("POST", "/fabricante/addFabricante", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn add_manufacturer_blank_name_returns_400() {
    let resp = app(KEY)
        .oneshot(json_request(
            "POST",
            "/fabricante/addFabricante",
            r#"{"nombre":"  ","tipo":"nacionales"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_manufacturer_malformed_json_returns_422() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/fabricante/addFabricante", r#"{"name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_manufacturer_not_found() {
    let resp = app(KEY)
        .oneshot(request("DELETE", "/fabricante/deleteFabricante?id_fabricante=nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_manufacturer_without_id_returns_400() {
    let resp = app(KEY)
        .oneshot(request("DELETE", "/fabricante/deleteFabricante"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- beers ---

#[tokio::test]
async fn list_beers_of_manufacturer() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(request("GET", "/cerveza/getCervezas?id_fabricante=f1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: CervezasResponse = body_json(resp).await;
    let ids: Vec<String> = body.cervezas.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
}

#[tokio::test]
async fn list_beers_empty_is_null() {
    let store = Store {
        cervezas: Vec::new(),
        ..seeded()
    };
    let resp = app_with_store(KEY, store)
        .oneshot(request("GET", "/cerveza/getCervezas?id_fabricante=f1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["cervezas"].is_null());
}

#[tokio::test]
async fn list_beers_unknown_manufacturer_returns_404() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(request("GET", "/cerveza/getCervezas?id_fabricante=zz"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_beer_unknown_manufacturer_returns_404() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(json_request(
            "POST",
            "/cerveza/addCerveza",
            r#"{"id_fabricante":"zz","nombre":"X","tipo":"ipa","logo":"","descripcion":"","grados":5.0,"kcal":100.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_beer_returns_manufacturer_beers() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(json_request(
            "PUT",
            "/cerveza/updateCerveza",
            r#"{"id_cerveza":"c1","nombre":"Cinco","tipo":"pilsen","logo":"","descripcion":"Nueva","grados":5.0,"kcal":170.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: CervezasResponse = body_json(resp).await;
    let beers = body.cervezas.unwrap();
    assert_eq!(beers.len(), 2);
    assert_eq!(beers[0].nombre, "Cinco");
    assert_eq!(beers[0].tipo, "pilsen");
    assert_eq!(beers[0].grados, 5.0);
}

#[tokio::test]
async fn update_beer_not_found() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(json_request(
            "PUT",
            "/cerveza/updateCerveza",
            r#"{"id_cerveza":"zz","nombre":"X","tipo":"ipa","logo":"","descripcion":"","grados":5.0,"kcal":100.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_favorite_flips_flag() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(json_request("PUT", "/cerveza/favCerveza", r#"{"id_cerveza":"c2"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: CervezasResponse = body_json(resp).await;
    let beers = body.cervezas.unwrap();
    assert!(!beers[0].is_fav);
    assert!(!beers[1].is_fav);
}

#[tokio::test]
async fn delete_beer_not_found() {
    let resp = app_with_store(KEY, seeded())
        .oneshot(request("DELETE", "/cerveza/deleteCerveza?id_cerveza=zz"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn catalog_lifecycle() {
    use tower::Service;

    let mut app = app(KEY).into_service();

    // add manufacturer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/fabricante/addFabricante",
            r#"{"nombre":"Estrella Galicia","logo":"www.estrellagalicia.es/logo.png","tipo":"nacionales"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: FabricantesResponse = body_json(resp).await;
    let manufacturer_id = body.fabricantes[0].id.clone();

    // add beer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/cerveza/addCerveza",
            &format!(
                r#"{{"id_fabricante":"{manufacturer_id}","nombre":"1906","tipo":"lager","logo":"","descripcion":"Reserva","grados":6.5,"kcal":200.0}}"#
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // list beers
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "GET",
            &format!("/cerveza/getCervezas?id_fabricante={manufacturer_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: CervezasResponse = body_json(resp).await;
    let beers = body.cervezas.unwrap();
    assert_eq!(beers.len(), 1);
    assert_eq!(beers[0].nombre, "1906");
    assert!(!beers[0].is_fav);
    let beer_id = beers[0].id.clone();

    // delete beer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/cerveza/deleteCerveza?id_cerveza={beer_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // delete manufacturer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "DELETE",
            &format!("/fabricante/deleteFabricante?id_fabricante={manufacturer_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(!body.is_empty());

    // list after delete is empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/fabricante/getFabricantes"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: FabricantesResponse = body_json(resp).await;
    assert!(body.fabricantes.is_empty());
}
