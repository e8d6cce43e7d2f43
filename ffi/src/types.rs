//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Optional strings become null
//! pointers. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use beer_center_core::logo::LogoSource;
use beer_center_core::{ApiError, Beer, BeerCenterClient, Category, HttpMethod, HttpRequest, Manufacturer};

/// Opaque handle to a `BeerCenterClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiBeerClient {
    pub(crate) inner: BeerCenterClient,
}

/// Move `s` to the C heap. Interior NULs are dropped rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

pub(crate) fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), c_string)
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
fn leak_vec<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let mut boxed = items.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    (ptr, len)
}

/// Reclaim a vector handed out by `leak_vec`.
///
/// # Safety
/// `ptr`/`len` must come from `leak_vec` and not have been reclaimed yet.
pub(crate) unsafe fn reclaim_vec<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// Manufacturer category as a C enum.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiCategory {
    National = 0,
    Imported = 1,
}

impl From<FfiCategory> for Category {
    fn from(c: FfiCategory) -> Self {
        match c {
            FfiCategory::National => Category::National,
            FfiCategory::Imported => Category::Imported,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `beer_build_*` functions. The C caller executes the request
/// and passes the response back through `beer_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    /// Absolute URL, query string included.
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when the request carries no body.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = leak_vec(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }

    /// # Safety
    /// `req` must come from `from_core` and not have been freed yet.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        for h in unsafe { reclaim_vec(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `beer_parse_*` function. The FFI layer reads
/// but does not free these fields. A null `body` is an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct FfiManufacturer {
    pub id: *mut c_char,
    pub name: *mut c_char,
    /// Raw category token, e.g. "nacionales".
    pub category: *mut c_char,
    /// Null when the manufacturer has no logo.
    pub logo: *mut c_char,
}

impl From<Manufacturer> for FfiManufacturer {
    fn from(m: Manufacturer) -> Self {
        FfiManufacturer {
            id: c_string(m.id),
            name: c_string(m.name),
            category: c_string(m.category),
            logo: c_string_opt(m.logo),
        }
    }
}

impl FfiManufacturer {
    fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.name);
        free_c_string(self.category);
        free_c_string(self.logo);
    }
}

#[repr(C)]
pub struct FfiBeer {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub style: *mut c_char,
    pub logo: *mut c_char,
    pub description: *mut c_char,
    pub abv: f32,
    pub calories: f32,
    pub is_favorite: bool,
}

impl From<Beer> for FfiBeer {
    fn from(b: Beer) -> Self {
        FfiBeer {
            id: c_string(b.id),
            name: c_string(b.name),
            style: c_string(b.style),
            logo: c_string_opt(b.logo),
            description: c_string(b.description),
            abv: b.abv,
            calories: b.calories,
            is_favorite: b.is_favorite,
        }
    }
}

impl FfiBeer {
    fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.name);
        free_c_string(self.style);
        free_c_string(self.logo);
        free_c_string(self.description);
    }
}

#[repr(C)]
pub struct FfiManufacturerList {
    pub items: *mut FfiManufacturer,
    pub len: u32,
}

/// `present` is false when the server sent `null` instead of a list.
#[repr(C)]
pub struct FfiBeerList {
    pub items: *mut FfiBeer,
    pub len: u32,
    pub present: bool,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBeerResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Configuration = 1,
    Network = 2,
    Server = 3,
    Decoding = 4,
    MissingData = 5,
    Encoding = 6,
    InvalidInput = 7,
    Unknown = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Configuration(_) => FfiErrorCode::Configuration,
            ApiError::Network(_) => FfiErrorCode::Network,
            ApiError::Server { .. } => FfiErrorCode::Server,
            ApiError::Decoding(_) => FfiErrorCode::Decoding,
            ApiError::MissingData => FfiErrorCode::MissingData,
            ApiError::Encoding(_) => FfiErrorCode::Encoding,
            ApiError::InvalidInput(_) => FfiErrorCode::InvalidInput,
            ApiError::Unknown(_) => FfiErrorCode::Unknown,
        }
    }
}

/// Tag that tells `beer_free_result` what `FfiBeerResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Manufacturers = 1,
    Beers = 2,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`). `message` carries
/// the server's informational text when the response had one.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is set for `Server`, and `data`
/// is null.
#[repr(C)]
pub struct FfiBeerResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub message: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiBeerResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16) -> *mut Self {
        Box::into_raw(Box::new(FfiBeerResult {
            error_code,
            error_message,
            http_status,
            message: std::ptr::null_mut(),
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying an `FfiManufacturerList`.
    pub(crate) fn ok_manufacturers(list: Vec<Manufacturer>, message: Option<String>) -> *mut Self {
        let (items, len) = leak_vec(list.into_iter().map(FfiManufacturer::from).collect());
        let data = Box::into_raw(Box::new(FfiManufacturerList { items, len }));
        let result = Self::ok_empty();
        unsafe {
            (*result).message = c_string_opt(message);
            (*result).data_tag = FfiDataTag::Manufacturers;
            (*result).data = data as *mut c_void;
        }
        result
    }

    /// Build a success result carrying an `FfiBeerList`.
    pub(crate) fn ok_beers(list: Option<Vec<Beer>>, message: Option<String>) -> *mut Self {
        let present = list.is_some();
        let beers: Vec<FfiBeer> = list.into_iter().flatten().map(FfiBeer::from).collect();
        let (items, len) = leak_vec(beers);
        let data = Box::into_raw(Box::new(FfiBeerList { items, len, present }));
        let result = Self::ok_empty();
        unsafe {
            (*result).message = c_string_opt(message);
            (*result).data_tag = FfiDataTag::Beers;
            (*result).data = data as *mut c_void;
        }
        result
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        Self::boxed(FfiErrorCode::from(&err), c_string(err.to_string()), err.status().unwrap_or(0))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, c_string(format!("null argument: {name}")), 0)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg), 0)
    }

    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed yet.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Manufacturers => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiManufacturerList) };
                for item in unsafe { reclaim_vec(list.items, list.len) } {
                    item.free_fields();
                }
            }
            FfiDataTag::Beers => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiBeerList) };
                for item in unsafe { reclaim_vec(list.items, list.len) } {
                    item.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Logo resolution
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLogoKind {
    Placeholder = 0,
    Remote = 1,
    Inline = 2,
}

/// How to render a logo string.
///
/// `Remote` sets `url`. `Inline` sets `mime_type`, the decoded `bytes` and
/// the pixel size. Unused fields are null or zero.
#[repr(C)]
pub struct FfiLogo {
    pub kind: FfiLogoKind,
    pub url: *mut c_char,
    pub mime_type: *mut c_char,
    pub bytes: *mut u8,
    pub bytes_len: u32,
    pub width: u32,
    pub height: u32,
}

impl FfiLogo {
    pub(crate) fn from_core(source: LogoSource) -> *mut Self {
        let mut logo = FfiLogo {
            kind: FfiLogoKind::Placeholder,
            url: std::ptr::null_mut(),
            mime_type: std::ptr::null_mut(),
            bytes: std::ptr::null_mut(),
            bytes_len: 0,
            width: 0,
            height: 0,
        };
        match source {
            LogoSource::Remote(url) => {
                logo.kind = FfiLogoKind::Remote;
                logo.url = c_string(url);
            }
            LogoSource::Inline(image) => {
                let (bytes, bytes_len) = leak_vec(image.bytes);
                logo.kind = FfiLogoKind::Inline;
                logo.mime_type = c_string(image.format.to_mime_type());
                logo.bytes = bytes;
                logo.bytes_len = bytes_len;
                logo.width = image.width;
                logo.height = image.height;
            }
            LogoSource::Placeholder => {}
        }
        Box::into_raw(Box::new(logo))
    }

    /// # Safety
    /// `logo` must come from `from_core` and not have been freed yet.
    pub(crate) unsafe fn free(logo: *mut Self) {
        let logo = unsafe { Box::from_raw(logo) };
        free_c_string(logo.url);
        free_c_string(logo.mime_type);
        drop(unsafe { reclaim_vec(logo.bytes, logo.bytes_len) });
    }
}
