//! C-ABI wrapper around `beer-center-core`.
//!
//! # Overview
//! Exposes the beer catalog API through `extern "C"` functions so a host
//! app in any language with a C FFI can build requests, run them on its own
//! HTTP stack, and parse the responses without linking Rust's async runtime.
//! Logo resolution and upload encoding are exposed as well, since both are
//! pure computations the host needs for rendering and for the add/edit flows.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core client 1:1.
//! - A single `FfiBeerResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `beer_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use beer_center_core::logo;
use beer_center_core::{
    BeerCenterClient, BeerUpdate, ClientConfig, HttpRequest, HttpResponse, NewBeer, NewManufacturer,
};

use types::*;

/// Read a caller-owned C string. `None` for null or non-UTF-8 input.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_string)
}

/// Write `code` through the caller's optional out-param.
fn report(error: *mut FfiErrorCode, code: FfiErrorCode) {
    if !error.is_null() {
        unsafe { *error = code };
    }
}

/// Panic guard for the builders that can reject their input. The outcome
/// code is written to `error` (which may be null) and the request is null
/// on anything but `Ok`.
fn build_with(
    error: *mut FfiErrorCode,
    build: impl FnOnce() -> Result<HttpRequest, FfiErrorCode> + std::panic::UnwindSafe,
) -> *mut FfiHttpRequest {
    let outcome = catch_unwind(build).unwrap_or(Err(FfiErrorCode::Panic));
    match outcome {
        Ok(req) => {
            report(error, FfiErrorCode::Ok);
            FfiHttpRequest::from_core(req)
        }
        Err(code) => {
            report(error, code);
            std::ptr::null_mut()
        }
    }
}

fn client_ref<'a>(client: *const FfiBeerClient) -> Result<&'a BeerCenterClient, FfiErrorCode> {
    if client.is_null() {
        return Err(FfiErrorCode::NullArg);
    }
    Ok(&unsafe { &*client }.inner)
}

fn required(ptr: *const c_char) -> Result<String, FfiErrorCode> {
    read_str(ptr).ok_or(FfiErrorCode::NullArg)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`, sending `api_key` on every
/// request.
///
/// Returns null if either argument is null, or if the configuration is
/// rejected (bad URL, empty key). The caller must free the returned pointer
/// with `beer_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_client_new(base_url: *const c_char, api_key: *const c_char) -> *mut FfiBeerClient {
    catch_unwind(|| {
        let (Some(url), Some(key)) = (read_str(base_url), read_str(api_key)) else {
            return std::ptr::null_mut();
        };
        match BeerCenterClient::new(&ClientConfig::new(url, key)) {
            Ok(client) => Box::into_raw(Box::new(FfiBeerClient { inner: client })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `beer_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_client_free(client: *mut FfiBeerClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the request listing every manufacturer.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `beer_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_list_manufacturers(client: *const FfiBeerClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_manufacturers())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request adding a manufacturer. `logo` may be null.
///
/// Returns null if `client` or `name` is null, or if `name` is blank. When
/// `error` is non-null it receives `Ok`, `NullArg`, `InvalidInput`,
/// `Encoding` or `Panic`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_add_manufacturer(
    client: *const FfiBeerClient,
    name: *const c_char,
    logo: *const c_char,
    category: FfiCategory,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(error, || {
        let client = client_ref(client)?;
        let input = NewManufacturer {
            name: required(name)?,
            logo: read_str(logo),
            category: category.into(),
        };
        client.build_add_manufacturer(&input).map_err(|e| FfiErrorCode::from(&e))
    })
}

/// Build the request deleting the manufacturer with `id`.
///
/// Returns null if `client` or `id` is null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_delete_manufacturer(
    client: *const FfiBeerClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_manufacturer(&id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request listing the beers of `manufacturer_id`.
///
/// Returns null only if an argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_list_beers(
    client: *const FfiBeerClient,
    manufacturer_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(manufacturer_id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_list_beers(&id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request adding a beer to `manufacturer_id`. `logo` may be null
/// and is then sent as an empty string.
///
/// Returns null on a null required argument (`NullArg`) or when a field is
/// rejected (`InvalidInput`: blank text, negative or non-finite amounts).
/// The code is written to `error` when it is non-null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_add_beer(
    client: *const FfiBeerClient,
    manufacturer_id: *const c_char,
    name: *const c_char,
    style: *const c_char,
    logo: *const c_char,
    description: *const c_char,
    abv: f32,
    calories: f32,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(error, || {
        let client = client_ref(client)?;
        let input = NewBeer {
            manufacturer_id: required(manufacturer_id)?,
            name: required(name)?,
            style: required(style)?,
            logo: read_str(logo).unwrap_or_default(),
            description: required(description)?,
            abv,
            calories,
        };
        client.build_add_beer(&input).map_err(|e| FfiErrorCode::from(&e))
    })
}

/// Build the request replacing every field of beer `beer_id`.
///
/// Same argument rules as `beer_build_add_beer`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_update_beer(
    client: *const FfiBeerClient,
    beer_id: *const c_char,
    name: *const c_char,
    style: *const c_char,
    logo: *const c_char,
    description: *const c_char,
    abv: f32,
    calories: f32,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(error, || {
        let client = client_ref(client)?;
        let input = BeerUpdate {
            beer_id: required(beer_id)?,
            name: required(name)?,
            style: required(style)?,
            logo: read_str(logo).unwrap_or_default(),
            description: required(description)?,
            abv,
            calories,
        };
        client.build_update_beer(&input).map_err(|e| FfiErrorCode::from(&e))
    })
}

/// Build the request deleting beer `beer_id`.
///
/// Cannot fail except on a null argument, which returns null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_delete_beer(client: *const FfiBeerClient, beer_id: *const c_char) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(beer_id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_beer(&id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request flipping the favorite flag of beer `beer_id`.
///
/// `error`, when non-null, receives the outcome code as in
/// `beer_build_add_manufacturer`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_build_toggle_favorite(
    client: *const FfiBeerClient,
    beer_id: *const c_char,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(error, || {
        let client = client_ref(client)?;
        client
            .build_toggle_favorite(&required(beer_id)?)
            .map_err(|e| FfiErrorCode::from(&e))
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// empty. Invalid UTF-8 is replaced rather than dropped, so a garbled body
/// still fails JSON decoding instead of reading as missing.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Shared null checks and panic guard for every `beer_parse_*` function.
fn parse_with(
    name: &'static str,
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&BeerCenterClient, HttpResponse) -> *mut FfiBeerResult + std::panic::UnwindSafe,
) -> *mut FfiBeerResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiBeerResult::null_arg("client");
        }
        if response.is_null() {
            return FfiBeerResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, ffi_response_to_core(resp))
    })
    .unwrap_or_else(|_| FfiBeerResult::panic(&format!("panic in {name}")))
}

/// Parse a list-manufacturers response.
///
/// Returns a result with `data_tag = Manufacturers` on success.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_list_manufacturers(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_list_manufacturers", client, response, |c, resp| {
        match c.parse_list_manufacturers(resp) {
            Ok(list) => FfiBeerResult::ok_manufacturers(list, None),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse an add-manufacturer response. The server's echo, if any, comes back
/// with `data_tag = Manufacturers`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_add_manufacturer(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_add_manufacturer", client, response, |c, resp| {
        match c.parse_add_manufacturer(resp) {
            Ok(envelope) => FfiBeerResult::ok_manufacturers(envelope.fabricantes, Some(envelope.message)),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse a delete-manufacturer response. Only status 200 succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_delete_manufacturer(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_delete_manufacturer", client, response, |c, resp| {
        match c.parse_delete_manufacturer(resp) {
            Ok(()) => FfiBeerResult::ok_empty(),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse a list-beers response.
///
/// Returns `data_tag = Beers`; `present` is false when the manufacturer has
/// no beers.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_list_beers(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_list_beers", client, response, |c, resp| {
        match c.parse_list_beers(resp) {
            Ok(envelope) => FfiBeerResult::ok_beers(envelope.cervezas, Some(envelope.message)),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse an add-beer response. Only status 200 succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_add_beer(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_add_beer", client, response, |c, resp| {
        match c.parse_add_beer(resp) {
            Ok(()) => FfiBeerResult::ok_empty(),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse an update-beer response.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_update_beer(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_update_beer", client, response, |c, resp| {
        match c.parse_update_beer(resp) {
            Ok(envelope) => FfiBeerResult::ok_beers(envelope.cervezas, Some(envelope.message)),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse a delete-beer response. Only status 200 succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_delete_beer(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_delete_beer", client, response, |c, resp| {
        match c.parse_delete_beer(resp) {
            Ok(()) => FfiBeerResult::ok_empty(),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

/// Parse a toggle-favorite response: the manufacturer's full beer list.
#[unsafe(no_mangle)]
pub extern "C" fn beer_parse_toggle_favorite(
    client: *const FfiBeerClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBeerResult {
    parse_with("beer_parse_toggle_favorite", client, response, |c, resp| {
        match c.parse_toggle_favorite(resp) {
            Ok(list) => FfiBeerResult::ok_beers(Some(list), None),
            Err(e) => FfiBeerResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Logos
// ---------------------------------------------------------------------------

/// Decide how to render a logo string. A null `logo` is a placeholder.
///
/// Never returns null except on an internal panic. Free with `beer_free_logo`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_resolve_logo(logo: *const c_char) -> *mut FfiLogo {
    catch_unwind(|| FfiLogo::from_core(logo::resolve(read_str(logo).as_deref()))).unwrap_or(std::ptr::null_mut())
}

/// Re-encode a picked image as the base64 JPEG text sent as `logo`.
///
/// Returns null if `bytes` is null or not a decodable image, or if it is
/// larger than the upload limit. Free with `beer_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn beer_encode_logo(bytes: *const u8, len: usize, quality: u8) -> *mut c_char {
    catch_unwind(|| {
        if bytes.is_null() {
            return std::ptr::null_mut();
        }
        let input = unsafe { std::slice::from_raw_parts(bytes, len) };
        match logo::encode_upload(input, quality) {
            Ok(encoded) => c_string(encoded),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `beer_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free an `FfiBeerResult` returned by any `beer_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn beer_free_result(result: *mut FfiBeerResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiBeerResult::free(result) });
}

/// Free an `FfiLogo` returned by `beer_resolve_logo`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_free_logo(logo: *mut FfiLogo) {
    if logo.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiLogo::free(logo) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn beer_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
