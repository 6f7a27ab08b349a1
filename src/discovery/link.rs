//! Link type and speed probing.

use crate::adapter::{LinkLayer, Medium};
use crate::source::{AdapterHandle, RequestKind, oid};

use super::{ScanError, zeroed_buffer};

/// Size of the media-in-use reply.
const MEDIUM_LEN: usize = 4;

/// Size of the link-speed reply: transmit then receive rate.
const LINK_SPEED_LEN: usize = 16;

/// Queries link type and speed through an open handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkLayerProbe;

impl LinkLayerProbe {
    /// Probes the medium (mandatory) and the link speed (optional).
    ///
    /// A missing or short speed reply leaves `link_speed` at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::LinkProbe`] when the media query fails and
    /// [`ScanError::AllocationFailure`] when a reply buffer cannot be
    /// allocated.
    pub fn probe(handle: &mut dyn AdapterHandle) -> Result<LinkLayer, ScanError> {
        let link_type = Self::medium(handle)?;
        let link_speed = Self::link_speed(handle)?.unwrap_or(0);

        Ok(LinkLayer {
            link_type,
            link_speed,
        })
    }

    fn medium(handle: &mut dyn AdapterHandle) -> Result<Medium, ScanError> {
        let mut buffer = zeroed_buffer(MEDIUM_LEN)?;
        let len = handle
            .request(RequestKind::Query, oid::GEN_MEDIA_IN_USE, &mut buffer)
            .map_err(ScanError::LinkProbe)?;
        if len < MEDIUM_LEN {
            return Err(ScanError::malformed(
                "media in use",
                format!("{len}-byte reply"),
            ));
        }

        let code = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        Ok(Medium::from_raw(code))
    }

    fn link_speed(handle: &mut dyn AdapterHandle) -> Result<Option<u64>, ScanError> {
        let mut buffer = zeroed_buffer(LINK_SPEED_LEN)?;
        let Ok(len) = handle.request(RequestKind::Query, oid::GEN_LINK_SPEED_EX, &mut buffer)
        else {
            return Ok(None);
        };
        if len < LINK_SPEED_LEN {
            return Ok(None);
        }

        let Some((xmit, rest)) = buffer.split_first_chunk::<8>() else {
            return Ok(None);
        };
        let Some((rcv, _)) = rest.split_first_chunk::<8>() else {
            return Ok(None);
        };
        Ok(Some(mean(u64::from_le_bytes(*xmit), u64::from_le_bytes(*rcv))))
    }
}

/// Overflow-free arithmetic mean.
const fn mean(a: u64, b: u64) -> u64 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::AdapterTransport;
    use crate::source::test_fixtures::{FakeAdapter, FakeTransport};

    const NAME: &str = "\\Device\\NPF_{LINK}";

    fn probe(adapter: FakeAdapter) -> Result<LinkLayer, ScanError> {
        let transport = FakeTransport::default();
        transport.set_adapter(NAME, adapter);
        let mut handle = transport.open(NAME).unwrap();
        LinkLayerProbe::probe(handle.as_mut())
    }

    #[test]
    fn speed_is_mean_of_transmit_and_receive() {
        let layer = probe(FakeAdapter {
            medium: Some(0),
            link_speed: Some((1_000_000_000, 100_000_000)),
            ..FakeAdapter::default()
        })
        .unwrap();

        assert_eq!(layer.link_type, Medium::Ethernet);
        assert_eq!(layer.link_speed, 550_000_000);
    }

    #[test]
    fn speed_halves_decode_independently() {
        let receive_only = probe(FakeAdapter {
            medium: Some(0),
            link_speed: Some((0, 2_000)),
            ..FakeAdapter::default()
        })
        .unwrap();
        let transmit_max = probe(FakeAdapter {
            medium: Some(0),
            link_speed: Some((u64::MAX, 0)),
            ..FakeAdapter::default()
        })
        .unwrap();

        assert_eq!(receive_only.link_speed, 1_000);
        assert_eq!(transmit_max.link_speed, u64::MAX / 2);
    }

    #[test]
    fn missing_speed_does_not_fail_probe() {
        let layer = probe(FakeAdapter {
            medium: Some(16),
            ..FakeAdapter::default()
        })
        .unwrap();

        assert_eq!(layer.link_type, Medium::Native802_11);
        assert_eq!(layer.link_speed, 0);
    }

    #[test]
    fn missing_medium_fails_probe() {
        let result = probe(FakeAdapter {
            link_speed: Some((10, 10)),
            ..FakeAdapter::default()
        });

        assert!(matches!(result, Err(ScanError::LinkProbe(_))));
    }

    #[test]
    fn null_medium_is_recognized() {
        let layer = probe(FakeAdapter::null_medium("loopback")).unwrap();
        assert!(layer.link_type.is_null());
    }

    #[test]
    fn mean_does_not_overflow() {
        assert_eq!(mean(u64::MAX, u64::MAX), u64::MAX);
        assert_eq!(mean(3, 4), 3);
        assert_eq!(mean(3, 5), 4);
    }
}
