//! Registry-backed device-class and TCP/IP configuration stores.

use std::ffi::CString;

use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS, WIN32_ERROR};
use windows::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_READ, REG_DWORD, REG_VALUE_TYPE, RegCloseKey, RegEnumKeyExA,
    RegOpenKeyExA, RegQueryValueExA,
};
use windows::core::{PCSTR, PSTR};

use crate::source::{
    DeviceClassStore, DeviceEntry, InterfaceParameters, SourceError, TcpipConfigStore,
};

/// Network adapter device class.
const NETWORK_CLASS_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Class\{4D36E972-E325-11CE-BFC1-08002BE10318}";

/// Holds the legacy `Bind` multi-string.
const TCPIP_LINKAGE_KEY: &str = r"SYSTEM\CurrentControlSet\Services\Tcpip\Linkage";

/// Root of the per-interface TCP/IP parameters.
const TCPIP_INTERFACES_KEY: &str = r"SYSTEM\CurrentControlSet\Services\Tcpip\Parameters\Interfaces";

/// Registry key names are limited to 255 characters.
const MAX_KEY_NAME: usize = 256;

/// An open registry key, closed on drop.
struct RegKey(HKEY);

impl RegKey {
    fn open_local_machine(path: &str) -> Result<Self, SourceError> {
        Self::open(HKEY_LOCAL_MACHINE, path)
    }

    fn open(parent: HKEY, path: &str) -> Result<Self, SourceError> {
        let c_path = to_c_string(path)?;
        let mut key = HKEY::default();

        // SAFETY: `c_path` is NUL-terminated and outlives the call; `key`
        // receives a handle owned by the returned `RegKey`.
        let status = unsafe {
            RegOpenKeyExA(
                parent,
                PCSTR(c_path.as_ptr().cast()),
                Some(0),
                KEY_READ,
                &raw mut key,
            )
        };
        check(status, path)?;

        Ok(Self(key))
    }

    fn subkey(&self, path: &str) -> Result<Self, SourceError> {
        Self::open(self.0, path)
    }

    fn subkey_names(&self) -> Result<Vec<String>, SourceError> {
        let mut names = Vec::new();
        let mut buffer = [0u8; MAX_KEY_NAME];

        for index in 0.. {
            let mut len = MAX_KEY_NAME as u32;
            // SAFETY: `buffer` holds `len` writable bytes; optional outputs are unused.
            let status = unsafe {
                RegEnumKeyExA(
                    self.0,
                    index,
                    Some(PSTR(buffer.as_mut_ptr())),
                    &raw mut len,
                    None,
                    None,
                    None,
                    None,
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            status.ok()?;
            names.push(String::from_utf8_lossy(&buffer[..len as usize]).into_owned());
        }

        Ok(names)
    }

    fn raw_value(&self, name: &str) -> Result<(REG_VALUE_TYPE, Vec<u8>), SourceError> {
        let c_name = to_c_string(name)?;
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = 0u32;

        // SAFETY: size query only; no data pointer is passed.
        let status = unsafe {
            RegQueryValueExA(
                self.0,
                PCSTR(c_name.as_ptr().cast()),
                None,
                Some(&raw mut kind),
                None,
                Some(&raw mut size),
            )
        };
        check(status, name)?;

        let mut data = vec![0u8; size as usize];
        // SAFETY: `data` holds `size` writable bytes.
        let status = unsafe {
            RegQueryValueExA(
                self.0,
                PCSTR(c_name.as_ptr().cast()),
                None,
                Some(&raw mut kind),
                Some(data.as_mut_ptr()),
                Some(&raw mut size),
            )
        };
        check(status, name)?;
        data.truncate(size as usize);

        Ok((kind, data))
    }

    fn bytes(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        self.raw_value(name).map(|(_, data)| data)
    }

    fn string(&self, name: &str) -> Result<String, SourceError> {
        let data = self.bytes(name)?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        Ok(String::from_utf8_lossy(&data[..end]).into_owned())
    }

    fn dword(&self, name: &str) -> Result<u32, SourceError> {
        match self.raw_value(name)? {
            (kind, data) if kind == REG_DWORD && data.len() >= 4 => {
                Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
            }
            _ => Err(SourceError::Platform {
                message: format!("{name} is not a DWORD"),
            }),
        }
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        // SAFETY: the key was opened by `RegOpenKeyExA` and is closed once.
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

fn to_c_string(value: &str) -> Result<CString, SourceError> {
    CString::new(value).map_err(|_| SourceError::Platform {
        message: format!("embedded NUL in {value:?}"),
    })
}

fn check(status: WIN32_ERROR, what: &str) -> Result<(), SourceError> {
    if status == ERROR_FILE_NOT_FOUND {
        return Err(SourceError::not_found(what));
    }
    Ok(status.ok()?)
}

/// Reads the network device class and the legacy binding list.
#[derive(Debug, Clone, Default)]
pub struct RegistryDeviceStore {
    _private: (),
}

impl RegistryDeviceStore {
    /// Creates the store.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl DeviceClassStore for RegistryDeviceStore {
    fn device_entries(&self) -> Result<Vec<DeviceEntry>, SourceError> {
        let class = RegKey::open_local_machine(NETWORK_CLASS_KEY)?;

        let mut entries = Vec::new();
        for name in class.subkey_names()? {
            // `Properties` and similar subkeys deny read access.
            let Ok(entry) = class.subkey(&name) else {
                continue;
            };
            let export = entry
                .subkey("Linkage")
                .and_then(|linkage| linkage.string("Export"))
                .ok();

            entries.push(DeviceEntry {
                component_id: entry.string("ComponentId").ok(),
                if_type: entry.dword("*IfType").ok(),
                export,
                key: name,
            });
        }

        Ok(entries)
    }

    fn binding_list(&self) -> Result<Vec<u8>, SourceError> {
        RegKey::open_local_machine(TCPIP_LINKAGE_KEY)?.bytes("Bind")
    }
}

/// Reads per-interface TCP/IP parameters.
#[derive(Debug, Clone, Default)]
pub struct RegistryTcpipStore {
    _private: (),
}

impl RegistryTcpipStore {
    /// Creates the store.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn interface_key(interface_id: &str) -> Result<RegKey, SourceError> {
        match RegKey::open_local_machine(TCPIP_INTERFACES_KEY) {
            Ok(interfaces) => interfaces.subkey(interface_id),
            Err(_) => RegKey::open_local_machine(&format!(
                r"SYSTEM\CurrentControlSet\Services\{interface_id}\Parameters\Tcpip"
            )),
        }
    }
}

impl TcpipConfigStore for RegistryTcpipStore {
    fn interface_parameters(&self, interface_id: &str) -> Result<InterfaceParameters, SourceError> {
        let key = Self::interface_key(interface_id)?;

        Ok(InterfaceParameters {
            enable_dhcp: key.dword("EnableDHCP").ok(),
            use_zero_broadcast: key.dword("UseZeroBroadcast").ok(),
            ip_address: key.bytes("IPAddress").ok(),
            subnet_mask: key.bytes("SubnetMask").ok(),
            dhcp_ip_address: key.bytes("DhcpIPAddress").ok(),
            dhcp_subnet_mask: key.bytes("DhcpSubnetMask").ok(),
        })
    }
}
