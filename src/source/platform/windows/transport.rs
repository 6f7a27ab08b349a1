//! NPF driver transport: device handles and OID requests.

use std::ffi::CString;

use windows::Win32::Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileA, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::IO::DeviceIoControl;
use windows::core::PCSTR;

use crate::source::{AdapterHandle, AdapterTransport, RequestKind, SourceError};

/// Control code for writing an OID.
const BIOCSETOID: u32 = 2_147_483_648;

/// Control code for reading an OID.
const BIOCQUERYOID: u32 = 2_147_483_652;

/// `Oid` and `Length` precede the data in a request buffer.
const OID_HEADER_LEN: usize = 8;

const DEVICE_PREFIX: &str = "\\Device\\";

/// Opens adapters through the NPF driver's device objects.
#[derive(Debug, Clone, Default)]
pub struct NpfTransport {
    _private: (),
}

impl NpfTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl AdapterTransport for NpfTransport {
    fn open(&self, name: &str) -> Result<Box<dyn AdapterHandle + '_>, SourceError> {
        let path = device_path(name)?;

        // SAFETY: `path` is NUL-terminated and outlives the call. The handle
        // is owned by the returned `NpfHandle`.
        let handle = unsafe {
            CreateFileA(
                PCSTR(path.as_ptr().cast()),
                GENERIC_READ.0 | GENERIC_WRITE.0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                None,
            )
        }?;

        Ok(Box::new(NpfHandle { handle }))
    }
}

/// Maps `\Device\NPF_x` to the Win32 path `\\.\Global\NPF_x`.
fn device_path(name: &str) -> Result<CString, SourceError> {
    let device = name
        .strip_prefix(DEVICE_PREFIX)
        .ok_or_else(|| SourceError::not_found(name))?;

    CString::new(format!("\\\\.\\Global\\{device}")).map_err(|_| SourceError::Platform {
        message: format!("embedded NUL in {name:?}"),
    })
}

struct NpfHandle {
    handle: HANDLE,
}

impl AdapterHandle for NpfHandle {
    fn request(
        &mut self,
        kind: RequestKind,
        oid: u32,
        buffer: &mut [u8],
    ) -> Result<usize, SourceError> {
        let mut packet = encode_request(kind, oid, buffer)?;
        let size = u32::try_from(packet.len()).map_err(|_| SourceError::Platform {
            message: "request buffer too large".to_string(),
        })?;
        let code = match kind {
            RequestKind::Query => BIOCQUERYOID,
            RequestKind::Set => BIOCSETOID,
        };
        let mut returned = 0u32;

        // SAFETY: `packet` is used as both input and output and holds `size` bytes.
        unsafe {
            DeviceIoControl(
                self.handle,
                code,
                Some(packet.as_ptr().cast()),
                size,
                Some(packet.as_mut_ptr().cast()),
                size,
                Some(&raw mut returned),
                None,
            )
        }?;

        Ok(decode_response(kind, &packet, buffer))
    }
}

impl Drop for NpfHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from `CreateFileA` and is closed once.
        let _ = unsafe { CloseHandle(self.handle) };
    }
}

/// Lays out `Oid`, `Length`, and data as the driver expects.
fn encode_request(kind: RequestKind, oid: u32, buffer: &[u8]) -> Result<Vec<u8>, SourceError> {
    let length = u32::try_from(buffer.len()).map_err(|_| SourceError::Platform {
        message: "request buffer too large".to_string(),
    })?;

    let mut packet = vec![0u8; OID_HEADER_LEN + buffer.len()];
    packet[..4].copy_from_slice(&oid.to_le_bytes());
    packet[4..OID_HEADER_LEN].copy_from_slice(&length.to_le_bytes());
    if kind == RequestKind::Set {
        packet[OID_HEADER_LEN..].copy_from_slice(buffer);
    }
    Ok(packet)
}

/// Copies query results back and returns the number of meaningful bytes.
fn decode_response(kind: RequestKind, packet: &[u8], buffer: &mut [u8]) -> usize {
    let reported = u32::from_le_bytes([packet[4], packet[5], packet[6], packet[7]]) as usize;
    let len = reported.min(buffer.len());
    if kind == RequestKind::Query {
        buffer[..len].copy_from_slice(&packet[OID_HEADER_LEN..OID_HEADER_LEN + len]);
    }
    len
}
