//! TON account address representation and user-friendly encoding.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use crc::{Crc, CRC_16_XMODEM};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// Length of a user-friendly address in characters.
pub const FRIENDLY_LEN: usize = 48;

/// A TON account address: workchain plus 256-bit account id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    workchain: i8,
    hash: [u8; 32],
}

impl TonAddress {
    #[inline]
    pub const fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub const fn workchain(&self) -> i8 {
        self.workchain
    }

    pub const fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Returns the raw form, `<workchain>:<hex account id>`.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// Returns the 48-character URL-safe base64 form.
    ///
    /// Layout: tag, workchain, account id, CRC16-XMODEM (big-endian).
    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            tag |= TAG_TESTNET;
        }

        let mut payload = [0u8; 36];
        payload[0] = tag;
        payload[1] = self.workchain as u8;
        payload[2..34].copy_from_slice(&self.hash);
        let crc = CRC16.checksum(&payload[..34]);
        payload[34..].copy_from_slice(&crc.to_be_bytes());

        URL_SAFE.encode(payload)
    }
}

impl fmt::Debug for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TonAddress({})", self.to_raw())
    }
}

impl fmt::Display for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_friendly(true, false))
    }
}
