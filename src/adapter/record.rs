//! Core adapter record types.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::{Serialize, Serializer};

/// Longest adapter name (in bytes) a record can hold.
pub const MAX_NAME_LENGTH: usize = 267;

/// Longest adapter description (in bytes) a record keeps.
pub const MAX_DESCRIPTION_LENGTH: usize = 127;

/// Maximum number of link-layer address bytes a record stores.
pub const MAX_MAC_ADDR_LENGTH: usize = 8;

/// Link-layer medium reported by the "media in use" property query.
///
/// Values `0..=19` are the NDIS media codes. The negative codes
/// (stored as their two's-complement `u32`) are pseudo media used by
/// capture drivers for link layers NDIS has no name for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Medium {
    /// 802.3 Ethernet.
    #[default]
    Ethernet,
    /// 802.5 Token Ring.
    TokenRing,
    /// FDDI.
    Fddi,
    /// WAN.
    Wan,
    /// `LocalTalk`.
    LocalTalk,
    /// DIX Ethernet.
    Dix,
    /// Raw ARCNET.
    ArcnetRaw,
    /// ARCNET 878.2.
    Arcnet878_2,
    /// ATM.
    Atm,
    /// Wireless WAN.
    WirelessWan,
    /// `IrDA`.
    Irda,
    /// Broadcast PC.
    Bpc,
    /// Connection-oriented WAN.
    CoWan,
    /// IEEE 1394.
    Ieee1394,
    /// `InfiniBand`.
    InfiniBand,
    /// Tunnel.
    Tunnel,
    /// Native 802.11.
    Native802_11,
    /// NDIS loopback.
    Loopback,
    /// `WiMAX`.
    WiMax,
    /// Raw IP.
    Ip,
    /// No link-layer header (capture-driver loopback).
    Null,
    /// Cisco HDLC.
    Chdlc,
    /// PPP over a serial line.
    PppSerial,
    /// Bare 802.11 frames.
    Bare80211,
    /// 802.11 frames with a radiotap header.
    Radio80211,
    /// 802.11 frames with a PPI header.
    Ppi,
    /// Unknown medium, preserving the original code.
    Other(u32),
}

impl Medium {
    /// Raw code of the null medium.
    pub const NULL_CODE: u32 = u32::MAX;

    /// Maps a raw media code to a [`Medium`].
    #[must_use]
    pub const fn from_raw(code: u32) -> Self {
        match code {
            0 => Self::Ethernet,
            1 => Self::TokenRing,
            2 => Self::Fddi,
            3 => Self::Wan,
            4 => Self::LocalTalk,
            5 => Self::Dix,
            6 => Self::ArcnetRaw,
            7 => Self::Arcnet878_2,
            8 => Self::Atm,
            9 => Self::WirelessWan,
            10 => Self::Irda,
            11 => Self::Bpc,
            12 => Self::CoWan,
            13 => Self::Ieee1394,
            14 => Self::InfiniBand,
            15 => Self::Tunnel,
            16 => Self::Native802_11,
            17 => Self::Loopback,
            18 => Self::WiMax,
            19 => Self::Ip,
            Self::NULL_CODE => Self::Null,
            0xFFFF_FFFE => Self::Chdlc,
            0xFFFF_FFFD => Self::PppSerial,
            0xFFFF_FFFC => Self::Bare80211,
            0xFFFF_FFFB => Self::Radio80211,
            0xFFFF_FFFA => Self::Ppi,
            other => Self::Other(other),
        }
    }

    /// Returns the raw media code.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Ethernet => 0,
            Self::TokenRing => 1,
            Self::Fddi => 2,
            Self::Wan => 3,
            Self::LocalTalk => 4,
            Self::Dix => 5,
            Self::ArcnetRaw => 6,
            Self::Arcnet878_2 => 7,
            Self::Atm => 8,
            Self::WirelessWan => 9,
            Self::Irda => 10,
            Self::Bpc => 11,
            Self::CoWan => 12,
            Self::Ieee1394 => 13,
            Self::InfiniBand => 14,
            Self::Tunnel => 15,
            Self::Native802_11 => 16,
            Self::Loopback => 17,
            Self::WiMax => 18,
            Self::Ip => 19,
            Self::Null => Self::NULL_CODE,
            Self::Chdlc => 0xFFFF_FFFE,
            Self::PppSerial => 0xFFFF_FFFD,
            Self::Bare80211 => 0xFFFF_FFFC,
            Self::Radio80211 => 0xFFFF_FFFB,
            Self::Ppi => 0xFFFF_FFFA,
            Self::Other(code) => code,
        }
    }

    /// Returns true for the null medium.
    #[must_use]
    pub const fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethernet => write!(f, "802.3"),
            Self::TokenRing => write!(f, "802.5"),
            Self::Native802_11 => write!(f, "802.11"),
            Self::Other(code) => write!(f, "unknown ({code:#010x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Link type and speed of an adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkLayer {
    /// Medium in use.
    pub link_type: Medium,
    /// Link speed in bits per second, `0` when unknown.
    pub link_speed: u64,
}

/// How a record may be used by the capture path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum AdapterFlags {
    /// Regular adapter, openable through the transport.
    #[default]
    Normal,
    /// WAN (dial-up) adapter.
    NdisWan,
    /// Recorded but never opened (e.g. firewire adapters).
    DoNotExport,
}

impl fmt::Display for AdapterFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::NdisWan => write!(f, "ndiswan"),
            Self::DoNotExport => write!(f, "do-not-export"),
        }
    }
}

/// Link-layer address of up to [`MAX_MAC_ADDR_LENGTH`] bytes.
///
/// A length of `0` means the address is unknown.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MacAddress {
    bytes: [u8; MAX_MAC_ADDR_LENGTH],
    len: usize,
}

impl MacAddress {
    /// Copies up to [`MAX_MAC_ADDR_LENGTH`] bytes from `bytes`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_MAC_ADDR_LENGTH);
        let mut stored = [0u8; MAX_MAC_ADDR_LENGTH];
        stored[..len].copy_from_slice(&bytes[..len]);
        Self { bytes: stored, len }
    }

    /// Usable address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of usable bytes (`MacAddressLen`).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no address is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One address bound to an adapter.
///
/// IPv6 entries carry unspecified mask and broadcast placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NetworkAddress {
    /// Interface address.
    pub ip_address: IpAddr,
    /// Subnet mask (unspecified for IPv6).
    pub subnet_mask: IpAddr,
    /// Broadcast address (unspecified for IPv6).
    pub broadcast: IpAddr,
}

impl NetworkAddress {
    /// Creates an IPv4 entry.
    #[must_use]
    pub const fn v4(address: Ipv4Addr, mask: Ipv4Addr, broadcast: Ipv4Addr) -> Self {
        Self {
            ip_address: IpAddr::V4(address),
            subnet_mask: IpAddr::V4(mask),
            broadcast: IpAddr::V4(broadcast),
        }
    }

    /// Creates an IPv6 entry with empty mask and broadcast.
    #[must_use]
    pub const fn v6(address: Ipv6Addr) -> Self {
        Self {
            ip_address: IpAddr::V6(address),
            subnet_mask: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            broadcast: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Returns true for IPv4 entries.
    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        self.ip_address.is_ipv4()
    }
}

/// Everything the registry knows about one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterRecord {
    /// Canonical transport name, unique within the registry.
    pub name: String,
    /// Human-readable vendor description.
    pub description: String,
    /// Link-layer address.
    pub mac_address: MacAddress,
    /// Medium and speed.
    pub link_layer: LinkLayer,
    /// Usage flags.
    pub flags: AdapterFlags,
    /// Bound addresses, in discovery order.
    pub addresses: Vec<NetworkAddress>,
}

impl AdapterRecord {
    /// Creates a record with the given name and every other field empty.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            mac_address: MacAddress::default(),
            link_layer: LinkLayer::default(),
            flags: AdapterFlags::Normal,
            addresses: Vec::new(),
        }
    }

    /// Creates a placeholder for an adapter that must never be opened.
    #[must_use]
    pub fn do_not_export(name: impl Into<String>) -> Self {
        Self {
            flags: AdapterFlags::DoNotExport,
            ..Self::new(name)
        }
    }

    /// Sets the description, truncated to [`MAX_DESCRIPTION_LENGTH`] bytes.
    pub fn set_description(&mut self, description: &str) {
        self.description = truncate_on_char_boundary(description, MAX_DESCRIPTION_LENGTH).to_owned();
    }

    /// Returns true when the capture path may open this adapter.
    #[must_use]
    pub const fn is_exported(&self) -> bool {
        !matches!(self.flags, AdapterFlags::DoNotExport)
    }
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
