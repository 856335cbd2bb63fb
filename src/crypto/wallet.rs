//! Wallet contract versions, state-init hashing and the TON [`AddressDeriver`].

use std::fmt;
use std::str::FromStr;

use super::{
    AddressDeriver, Cell, CellBuilder, CellError, CellRef, DerivationError, Mnemonic, TonAddress,
};

/// Basechain, where regular wallets live.
pub const DEFAULT_WORKCHAIN: i8 = 0;

/// Default subwallet id of v4r2 wallets (698983191 = 0x29A9A317).
const V4R2_SUBWALLET_ID: u32 = 698_983_191;

const V4R2_CODE: CellRef = CellRef {
    hash: [
        0xfe, 0xb5, 0xff, 0x68, 0x20, 0xe2, 0xff, 0x0d, 0x94, 0x83, 0xe7, 0xe0, 0xd6, 0x2c, 0x81,
        0x7d, 0x84, 0x67, 0x89, 0xfb, 0x4a, 0xe5, 0x80, 0xc8, 0x78, 0x86, 0x6d, 0x95, 0x9d, 0xab,
        0xd5, 0xc0,
    ],
    depth: 7,
};

const V5R1_CODE: CellRef = CellRef {
    hash: [
        0x20, 0x83, 0x4b, 0x7b, 0x72, 0xb1, 0x12, 0x14, 0x7e, 0x1b, 0x2f, 0xb4, 0x57, 0xb8, 0x4e,
        0x74, 0xd1, 0xa3, 0x0f, 0x04, 0xf7, 0x37, 0xd4, 0xf6, 0x2a, 0x66, 0x8e, 0x95, 0x52, 0xd2,
        0xb7, 0x2f,
    ],
    depth: 6,
};

/// Wallet contract version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletVersion {
    /// Wallet v4 revision 2
    V4R2,
    /// Wallet v5 revision 1 (W5)
    #[default]
    V5R1,
}

impl FromStr for WalletVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "4" | "v4" | "v4r2" => Ok(WalletVersion::V4R2),
            "5" | "v5" | "v5r1" | "w5" => Ok(WalletVersion::V5R1),
            _ => Err(format!("Unknown wallet version: {} (expected 4 or 5)", s)),
        }
    }
}

impl fmt::Display for WalletVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletVersion::V4R2 => write!(f, "v4r2"),
            WalletVersion::V5R1 => write!(f, "v5r1"),
        }
    }
}

/// Target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn from_testnet_flag(testnet: bool) -> Self {
        if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    /// Global network id, mixed into the v5 wallet id.
    pub const fn global_id(self) -> i32 {
        match self {
            Network::Mainnet => -239,
            Network::Testnet => -3,
        }
    }

    pub const fn is_testnet(self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Everything besides the credential that determines an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletParams {
    pub version: WalletVersion,
    pub network: Network,
    pub bounceable: bool,
}

impl WalletVersion {
    fn code(self) -> CellRef {
        match self {
            WalletVersion::V4R2 => V4R2_CODE,
            WalletVersion::V5R1 => V5R1_CODE,
        }
    }

    /// Builds the initial persistent data of the wallet contract.
    pub fn data_cell(self, public_key: &[u8; 32], network: Network) -> Result<Cell, CellError> {
        let mut data = CellBuilder::new();
        match self {
            WalletVersion::V4R2 => {
                data.store_u32(0)? // seqno
                    .store_u32(V4R2_SUBWALLET_ID)?
                    .store_bytes(public_key)?
                    .store_bit(false)?; // empty plugin dict
            }
            WalletVersion::V5R1 => {
                data.store_bit(true)? // signature auth allowed
                    .store_u32(0)? // seqno
                    .store_u32(v5r1_wallet_id(network, DEFAULT_WORKCHAIN))?
                    .store_bytes(public_key)?
                    .store_bit(false)?; // empty extensions dict
            }
        }
        Ok(data.build())
    }

    /// Computes the account id: the representation hash of the StateInit.
    pub fn account_id(self, public_key: &[u8; 32], network: Network) -> Result<[u8; 32], CellError> {
        let data = self.data_cell(public_key, network)?;

        // split_depth:absent special:absent code:present data:present library:empty
        let mut state_init = CellBuilder::new();
        state_init
            .store_uint(0b00110, 5)?
            .store_ref(self.code())?
            .store_ref(data.to_ref())?;
        Ok(state_init.build().repr_hash())
    }
}

/// Wallet id of a v5r1 client wallet (version 0, subwallet 0).
pub fn v5r1_wallet_id(network: Network, workchain: i8) -> u32 {
    let context = (1u32 << 31) | ((workchain as u8 as u32) << 23);
    context ^ network.global_id() as u32
}

/// Derives TON wallet addresses from freshly generated mnemonics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonDeriver;

impl TonDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Derives the account address of `public_key` under `params`.
    pub fn address_for_key(
        &self,
        public_key: &[u8; 32],
        params: &WalletParams,
    ) -> Result<TonAddress, DerivationError> {
        let account = params.version.account_id(public_key, params.network)?;
        Ok(TonAddress::new(DEFAULT_WORKCHAIN, account))
    }
}

impl AddressDeriver for TonDeriver {
    type Seed = Mnemonic;

    fn generate_seed(&self) -> Mnemonic {
        Mnemonic::generate()
    }

    fn derive(&self, seed: &Mnemonic, params: &WalletParams) -> Result<String, DerivationError> {
        let public_key = seed.public_key()?;
        let address = self.address_for_key(&public_key, params)?;
        Ok(address.to_friendly(params.bounceable, params.network.is_testnet()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];

    #[test]
    fn test_version_parsing() {
        assert_eq!("4".parse::<WalletVersion>().unwrap(), WalletVersion::V4R2);
        assert_eq!("V4R2".parse::<WalletVersion>().unwrap(), WalletVersion::V4R2);
        assert_eq!("5".parse::<WalletVersion>().unwrap(), WalletVersion::V5R1);
        assert_eq!("v5r1".parse::<WalletVersion>().unwrap(), WalletVersion::V5R1);
        assert!("3".parse::<WalletVersion>().is_err());
        assert_eq!(WalletVersion::default(), WalletVersion::V5R1);
    }

    #[test]
    fn test_network_ids() {
        assert_eq!(Network::Mainnet.global_id(), -239);
        assert_eq!(Network::Testnet.global_id(), -3);
        assert_eq!(Network::from_testnet_flag(true), Network::Testnet);
    }

    #[test]
    fn test_v5r1_wallet_ids() {
        assert_eq!(v5r1_wallet_id(Network::Mainnet, 0), 2_147_483_409);
        assert_eq!(v5r1_wallet_id(Network::Testnet, 0), 2_147_483_645);
    }

    #[test]
    fn test_data_cell_sizes() {
        let v4 = WalletVersion::V4R2.data_cell(&KEY, Network::Mainnet).unwrap();
        let v5 = WalletVersion::V5R1.data_cell(&KEY, Network::Mainnet).unwrap();
        assert_eq!(v4.bit_len(), 32 + 32 + 256 + 1);
        assert_eq!(v5.bit_len(), 1 + 32 + 32 + 256 + 1);
        assert_eq!(v4.depth(), 0);
    }

    #[test]
    fn test_account_id_depends_on_inputs() {
        let v4 = WalletVersion::V4R2.account_id(&KEY, Network::Mainnet).unwrap();
        let v5_main = WalletVersion::V5R1.account_id(&KEY, Network::Mainnet).unwrap();
        let v5_test = WalletVersion::V5R1.account_id(&KEY, Network::Testnet).unwrap();
        let other_key = WalletVersion::V5R1.account_id(&[0x43; 32], Network::Mainnet).unwrap();

        assert_ne!(v4, v5_main);
        assert_ne!(v5_main, v5_test);
        assert_ne!(v5_main, other_key);
        // v4r2 carries no network id in its data
        assert_eq!(v4, WalletVersion::V4R2.account_id(&KEY, Network::Testnet).unwrap());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let deriver = TonDeriver::new();
        let seed = deriver.generate_seed();
        let params = WalletParams::default();

        let first = deriver.derive(&seed, &params).unwrap();
        let second = deriver.derive(&seed, &params).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 48);
        assert!(first.starts_with("UQ"));
    }

    #[test]
    fn test_bounce_flag_changes_only_encoding() {
        let deriver = TonDeriver::new();
        let bounceable = WalletParams {
            bounceable: true,
            ..WalletParams::default()
        };
        let plain = deriver.address_for_key(&KEY, &WalletParams::default()).unwrap();
        let bounce = deriver.address_for_key(&KEY, &bounceable).unwrap();

        assert_eq!(plain, bounce);
        assert!(bounce.to_friendly(true, false).starts_with("EQ"));
    }

    #[test]
    fn test_known_wallet_addresses() {
        let mnemonic = Mnemonic::from_phrase(
            "ill actress receive fatal found tide situate raise vessel magnet fury stadium \
             venue viable worth equal slight super day crowd remain income impose outside",
        )
        .unwrap();
        let public_key = mnemonic.public_key().unwrap();
        let deriver = TonDeriver::new();

        let address = |version| {
            let params = WalletParams {
                version,
                ..WalletParams::default()
            };
            deriver
                .address_for_key(&public_key, &params)
                .unwrap()
                .to_friendly(false, false)
        };

        assert_eq!(
            address(WalletVersion::V4R2),
            "UQCxkZirmLM4EKFJ7m4srYW8jo1xpOwf-v-zVLjZdzkKJ1sD"
        );
        assert_eq!(
            address(WalletVersion::V5R1),
            "UQAoFJxm9aPtsOD5lWEf7bukVUHQeTKFL9xyUvGGdQtIO0qt"
        );
    }
}
