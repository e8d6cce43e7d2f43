//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and either the expected parse result or the expected error kind. Bodies
//! are compared as parsed JSON so key order does not matter.

use beer_center_core::{
    ApiError, Beer, BeerCenterClient, BeerUpdate, BeersEnvelope, Category, ClientConfig, HttpMethod, HttpRequest,
    HttpResponse, Manufacturer, ManufacturersEnvelope, NewBeer, NewManufacturer,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:6969/daa-api/v1";

fn client() -> BeerCenterClient {
    BeerCenterClient::new(&ClientConfig::new(BASE_URL, "test-key")).unwrap()
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match &expected["body"] {
        Value::Null => assert!(req.body.is_none(), "{name}: unexpected body"),
        body => {
            let actual: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap())
}

/// Returns true when the case expects an error, after checking it matches.
fn check_error<T: std::fmt::Debug>(name: &str, case: &Value, result: &Result<T, ApiError>) -> bool {
    let expected = &case["expected_error"];
    if expected.is_null() {
        assert!(result.is_ok(), "{name}: unexpected error {result:?}");
        return false;
    }
    let err = result.as_ref().expect_err(name);
    match expected["kind"].as_str().unwrap() {
        "Server" => assert_eq!(err.status(), expected["status"].as_u64().map(|s| s as u16), "{name}: status"),
        "MissingData" => assert_eq!(err, &ApiError::MissingData, "{name}"),
        "Decoding" => assert!(matches!(err, ApiError::Decoding(_)), "{name}: got {err:?}"),
        other => panic!("unknown error kind in vector: {other}"),
    }
    true
}

fn id_input(case: &Value) -> &str {
    case["input"]["id"].as_str().unwrap()
}

// ---------------------------------------------------------------------------
// Manufacturers
// ---------------------------------------------------------------------------

#[test]
fn list_manufacturers_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list_manufacturers.json")) {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_list_manufacturers(), &case["expected_request"]);

        let result = c.parse_list_manufacturers(simulated(&case));
        if !check_error(name, &case, &result) {
            let expected: Vec<Manufacturer> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn add_manufacturer_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/add_manufacturer.json")) {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let new = NewManufacturer {
            name: input["name"].as_str().unwrap().to_string(),
            logo: input["logo"].as_str().map(str::to_string),
            category: Category::from_wire(input["category"].as_str().unwrap()).unwrap(),
        };
        let req = c.build_add_manufacturer(&new).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_add_manufacturer(simulated(&case));
        if !check_error(name, &case, &result) {
            let expected: ManufacturersEnvelope = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn delete_manufacturer_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/delete_manufacturer.json")) {
        let name = case["name"].as_str().unwrap();
        let req = c.build_delete_manufacturer(id_input(&case));
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_manufacturer(simulated(&case));
        check_error(name, &case, &result);
    }
}

// ---------------------------------------------------------------------------
// Beers
// ---------------------------------------------------------------------------

#[test]
fn list_beers_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list_beers.json")) {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_list_beers(id_input(&case)), &case["expected_request"]);

        let result = c.parse_list_beers(simulated(&case));
        if !check_error(name, &case, &result) {
            let expected: BeersEnvelope = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn add_beer_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/add_beer.json")) {
        let name = case["name"].as_str().unwrap();
        let input: NewBeer = serde_json::from_value(case["input"].clone()).unwrap();
        assert_request(name, &c.build_add_beer(&input).unwrap(), &case["expected_request"]);

        let result = c.parse_add_beer(simulated(&case));
        check_error(name, &case, &result);
    }
}

#[test]
fn update_beer_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update_beer.json")) {
        let name = case["name"].as_str().unwrap();
        let input: BeerUpdate = serde_json::from_value(case["input"].clone()).unwrap();
        assert_request(name, &c.build_update_beer(&input).unwrap(), &case["expected_request"]);

        let result = c.parse_update_beer(simulated(&case));
        if !check_error(name, &case, &result) {
            let expected: BeersEnvelope = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn delete_beer_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/delete_beer.json")) {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_delete_beer(id_input(&case)), &case["expected_request"]);

        let result = c.parse_delete_beer(simulated(&case));
        check_error(name, &case, &result);
    }
}

#[test]
fn toggle_favorite_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/toggle_favorite.json")) {
        let name = case["name"].as_str().unwrap();
        let req = c.build_toggle_favorite(id_input(&case)).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_toggle_favorite(simulated(&case));
        if !check_error(name, &case, &result) {
            let expected: Vec<Beer> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
