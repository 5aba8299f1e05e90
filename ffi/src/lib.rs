//! C-ABI entry points around `gym-sync-core`.
//!
//! # Overview
//! Lets a host environment (browser shell, desktop app, script runtime)
//! validate records, run a reconciliation pass and query the remote
//! collection, receiving every answer as a structured `FfiSyncResult` with a
//! JSON payload.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The client handle owns a tokio runtime; async core operations are driven
//!   with `block_on`, so these functions must not be called from inside
//!   another tokio runtime.
//! - The C caller owns all returned pointers and must call the matching
//!   `gym_*_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use gym_sync_core::{
    validate, BusinessUnit, ClientConfig, ConfigError, Reconciler, ResourceClient, SyncConfig,
};

use types::*;

/// Borrow a C string argument as UTF-8.
fn read_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, *mut FfiSyncResult> {
    if ptr.is_null() {
        return Err(FfiSyncResult::null_arg(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| FfiSyncResult::invalid_input(&format!("{name} is not valid UTF-8: {e}")))
}

fn build_client(config: &ClientConfig, sync: SyncConfig) -> Result<FfiSyncClient, ConfigError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|e| ConfigError::Runtime(e.to_string()))?;
    let client = ResourceClient::from_config(config)?;
    Ok(FfiSyncClient {
        runtime,
        reconciler: Reconciler::new(client, sync),
    })
}

/// Run `f` against the client handle, converting null handles and panics into
/// result envelopes.
fn with_client(
    client: *const FfiSyncClient,
    name: &str,
    f: impl FnOnce(&FfiSyncClient) -> *mut FfiSyncResult,
) -> *mut FfiSyncResult {
    if client.is_null() {
        return FfiSyncResult::null_arg("client");
    }
    catch_unwind(AssertUnwindSafe(|| f(unsafe { &*client })))
        .unwrap_or_else(|_| FfiSyncResult::panic(&format!("panic in {name}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` with default collection, timeout and
/// sequential processing.
///
/// Returns null if `base_url` is null or not UTF-8, or if the HTTP client
/// cannot be built. The caller must free the returned pointer with
/// `gym_sync_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn gym_sync_client_new(base_url: *const c_char) -> *mut FfiSyncClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        match build_client(&ClientConfig::new(url), SyncConfig::default()) {
            Ok(client) => Box::into_raw(Box::new(client)),
            Err(e) => {
                tracing::warn!("could not create sync client: {e}");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from `GYM_SYNC_*` environment variables.
///
/// On success writes the handle to `*out` and returns an `Ok` result; on
/// failure `*out` is left untouched and the result carries `Config`.
#[unsafe(no_mangle)]
pub extern "C" fn gym_sync_client_from_env(out: *mut *mut FfiSyncClient) -> *mut FfiSyncResult {
    catch_unwind(AssertUnwindSafe(|| {
        if out.is_null() {
            return FfiSyncResult::null_arg("out");
        }
        let configs = ClientConfig::from_env().and_then(|c| Ok((c, SyncConfig::from_env()?)));
        let client = configs.and_then(|(client, sync)| build_client(&client, sync));
        match client {
            Ok(client) => {
                let endpoint = client.reconciler.client().api().endpoint().to_string();
                unsafe { *out = Box::into_raw(Box::new(client)) };
                FfiSyncResult::ok_json(&serde_json::json!({ "endpoint": endpoint }))
            }
            Err(e) => FfiSyncResult::from_config(&e),
        }
    }))
    .unwrap_or_else(|_| FfiSyncResult::panic("panic in gym_sync_client_from_env"))
}

/// Free a client created by `gym_sync_client_new` or
/// `gym_sync_client_from_env`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn gym_sync_client_free(client: *mut FfiSyncClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Validate one record given as JSON. Needs no client and performs no I/O.
///
/// Returns `Ok` with a `{"valid": bool, "errors": [...]}` payload whenever the
/// JSON parses, whether or not the record is valid.
#[unsafe(no_mangle)]
pub extern "C" fn gym_validate(record_json: *const c_char) -> *mut FfiSyncResult {
    catch_unwind(|| {
        let raw = match read_str(record_json, "record_json") {
            Ok(raw) => raw,
            Err(result) => return result,
        };
        match serde_json::from_str::<BusinessUnit>(raw) {
            Ok(unit) => FfiSyncResult::ok_json(&validate(&unit)),
            Err(e) => FfiSyncResult::invalid_input(&format!("record_json: {e}")),
        }
    })
    .unwrap_or_else(|_| FfiSyncResult::panic("panic in gym_validate"))
}

/// Run one reconciliation pass over a JSON array of records.
///
/// With `validate_first`, every record is validated before anything is sent
/// and the first invalid one is returned as a `Validation` error. A failed
/// snapshot returns `Snapshot`. Otherwise the result is `Ok` and the payload
/// is the full report: `{"outcomes": [...], "created", "updated", "failed"}`.
#[unsafe(no_mangle)]
pub extern "C" fn gym_sync_all(
    client: *const FfiSyncClient,
    records_json: *const c_char,
    validate_first: bool,
) -> *mut FfiSyncResult {
    with_client(client, "gym_sync_all", |client| {
        let raw = match read_str(records_json, "records_json") {
            Ok(raw) => raw,
            Err(result) => return result,
        };
        let units: Vec<BusinessUnit> = match serde_json::from_str(raw) {
            Ok(units) => units,
            Err(e) => return FfiSyncResult::invalid_input(&format!("records_json: {e}")),
        };
        let reconciler = &client.reconciler;
        let result = client.runtime.block_on(async {
            if validate_first {
                reconciler.sync_validated(&units).await
            } else {
                reconciler.sync_all(&units).await
            }
        });
        match result {
            Ok(report) => FfiSyncResult::ok_json(&report),
            Err(e) => FfiSyncResult::from_sync(&e),
        }
    })
}

/// Look up one record by id. Absence is `Ok` with
/// `{"result": "not_found", "value": id}`.
#[unsafe(no_mangle)]
pub extern "C" fn gym_find_by_id(client: *const FfiSyncClient, id: u64) -> *mut FfiSyncResult {
    with_client(client, "gym_find_by_id", |client| {
        let resource = client.reconciler.client();
        match client.runtime.block_on(resource.find_by_id(id)) {
            Ok(lookup) => FfiSyncResult::ok_json(&lookup),
            Err(e) => FfiSyncResult::from_transport(&e),
        }
    })
}

/// Case-insensitive text search over name, city and street. The payload is a
/// JSON array, possibly empty.
#[unsafe(no_mangle)]
pub extern "C" fn gym_search(
    client: *const FfiSyncClient,
    query: *const c_char,
) -> *mut FfiSyncResult {
    with_client(client, "gym_search", |client| {
        let query = match read_str(query, "query") {
            Ok(query) => query,
            Err(result) => return result,
        };
        let resource = client.reconciler.client();
        match client.runtime.block_on(resource.search_by_text(query)) {
            Ok(units) => FfiSyncResult::ok_json(&units),
            Err(e) => FfiSyncResult::from_transport(&e),
        }
    })
}

/// Delete one record. Not part of a sync pass.
#[unsafe(no_mangle)]
pub extern "C" fn gym_delete(client: *const FfiSyncClient, id: u64) -> *mut FfiSyncResult {
    with_client(client, "gym_delete", |client| {
        let resource = client.reconciler.client();
        match client.runtime.block_on(resource.delete(id)) {
            Ok(deleted) => FfiSyncResult::ok_json(&serde_json::json!({ "deleted": deleted })),
            Err(e) => FfiSyncResult::from_transport(&e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiSyncResult` returned by any `gym_*` function. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn gym_free_result(result: *mut FfiSyncResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.payload_json.is_null() {
            drop(unsafe { CString::from_raw(result.payload_json) });
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
