//! Host boundary types

use std::ffi::c_void;

/// Result of plugin initialization reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ready to receive audio and render
    Ok,

    /// Unrecoverable; the host unloads the plugin and makes no further calls
    PermanentFailure,
}

/// Opaque graphics device pointer handed out by the host.
///
/// Not owned: the plugin never releases what this points at. Backends that
/// need to keep the device alive take their own reference from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(*mut c_void);

impl DeviceHandle {
    pub fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Services the host exposes to the plugin during initialization
pub trait Host {
    /// Graphics device (OpenGL: unused context token, Direct3D 11: the
    /// immediate device context)
    fn device(&self) -> DeviceHandle;

    /// Resolve a graphics API entry point such as `glBegin` in the host's
    /// current context. Null when unavailable.
    fn proc_address(&self, _symbol: &str) -> *const c_void {
        std::ptr::null()
    }
}
