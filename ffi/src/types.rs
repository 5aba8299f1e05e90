//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Payloads cross the boundary as JSON C strings rather than mirrored structs:
//! sync reports, lookups and errors are nested, and hosts (browser shells,
//! scripting runtimes) already speak JSON. The envelope itself is a flat C
//! struct so callers can branch on `error_code` without parsing anything.

use std::ffi::CString;
use std::os::raw::c_char;

use gym_sync_core::reconcile::Reconciler;
use gym_sync_core::{ConfigError, ReqwestTransport, SyncError, TransportError, ValidationError};
use serde::Serialize;

/// Opaque handle owning the async runtime and the reconciler. C callers
/// receive a pointer to this and pass it back into every FFI function.
pub struct FfiSyncClient {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) reconciler: Reconciler<ReqwestTransport>,
}

/// Error codes returned in `FfiSyncResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// The remote snapshot could not be fetched; nothing was attempted.
    Snapshot = 1,
    /// A single HTTP operation failed.
    Transport = 2,
    /// A record failed pre-flight validation; nothing was sent.
    Validation = 3,
    /// A JSON or string argument could not be decoded.
    InvalidInput = 4,
    Config = 5,
    Panic = 6,
    NullArg = 7,
}

/// Result envelope for every operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and
/// `payload_json` holds the operation's JSON result. On failure
/// `error_code` describes the category, `error_message` is a human-readable C
/// string, `http_status` is the response status if there was one, and
/// `payload_json` holds the structured error when one exists.
#[repr(C)]
pub struct FfiSyncResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub payload_json: *mut c_char,
}

/// Allocate a C string, dropping interior NULs instead of failing.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

fn to_json_c_string<T: Serialize>(value: &T) -> Result<*mut c_char, serde_json::Error> {
    serde_json::to_string(value).map(|json| to_c_string(&json))
}

impl FfiSyncResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: Option<&str>,
        http_status: u16,
        payload_json: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiSyncResult {
            error_code,
            error_message: error_message.map_or(std::ptr::null_mut(), to_c_string),
            http_status,
            payload_json,
        }))
    }

    /// Build a success result carrying `value` as JSON.
    pub(crate) fn ok_json<T: Serialize>(value: &T) -> *mut Self {
        match to_json_c_string(value) {
            Ok(payload) => Self::boxed(FfiErrorCode::Ok, None, 0, payload),
            Err(e) => Self::invalid_input(&format!("could not encode result: {e}")),
        }
    }

    /// Error result carrying the error itself as the JSON payload.
    fn structured<E: Serialize + std::fmt::Display>(
        code: FfiErrorCode,
        http_status: u16,
        err: &E,
    ) -> *mut Self {
        let payload = to_json_c_string(err).unwrap_or(std::ptr::null_mut());
        Self::boxed(code, Some(&err.to_string()), http_status, payload)
    }

    pub(crate) fn from_transport(err: &TransportError) -> *mut Self {
        Self::structured(FfiErrorCode::Transport, err.status().unwrap_or(0), err)
    }

    pub(crate) fn from_validation(err: &ValidationError) -> *mut Self {
        Self::structured(FfiErrorCode::Validation, 0, err)
    }

    pub(crate) fn from_sync(err: &SyncError) -> *mut Self {
        match err {
            SyncError::Snapshot(source) => {
                let payload = to_json_c_string(source).unwrap_or(std::ptr::null_mut());
                Self::boxed(
                    FfiErrorCode::Snapshot,
                    Some(&err.to_string()),
                    source.status().unwrap_or(0),
                    payload,
                )
            }
            SyncError::Validation(source) => Self::from_validation(source),
        }
    }

    pub(crate) fn from_config(err: &ConfigError) -> *mut Self {
        Self::boxed(FfiErrorCode::Config, Some(&err.to_string()), 0, std::ptr::null_mut())
    }

    pub(crate) fn invalid_input(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::InvalidInput, Some(msg), 0, std::ptr::null_mut())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            Some(&format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg), 0, std::ptr::null_mut())
    }
}
