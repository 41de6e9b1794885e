use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::acl::AclEntry;
use crate::error::{DeployError, DeployResult};

/// 20-byte on-chain account/contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .strip_prefix("0x")
            .ok_or_else(|| anyhow!("address must be 0x-prefixed: {}", s))?;
        if raw.len() != 40 {
            return Err(anyhow!(
                "invalid address length: expected 40 hex digits, got {}",
                raw.len()
            ));
        }
        let bytes = hex::decode(raw).with_context(|| format!("invalid address hex: {}", s))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte word, used for content-derived ids (keccak256 of a logical id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash32 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .strip_prefix("0x")
            .ok_or_else(|| anyhow!("bytes32 must be 0x-prefixed: {}", s))?;
        if raw.len() != 64 {
            return Err(anyhow!(
                "invalid bytes32 length: expected 64 hex digits, got {}",
                raw.len()
            ));
        }
        let bytes = hex::decode(raw).with_context(|| format!("invalid bytes32 hex: {}", s))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Hash32(out))
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Unsigned 256-bit integer, big-endian. Written as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uint256(pub [u8; 32]);

impl Uint256 {
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<u64> for Uint256 {
    fn from(v: u64) -> Self {
        let mut out = [0u8; 32];
        out[24..].copy_from_slice(&v.to_be_bytes());
        Uint256(out)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut work = self.0;
        let mut digits = Vec::new();
        while work != [0u8; 32] {
            let mut rem = 0u16;
            for byte in work.iter_mut() {
                let acc = (rem << 8) | u16::from(*byte);
                *byte = (acc / 10) as u8;
                rem = acc % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        digits.reverse();
        f.write_str(&String::from_utf8_lossy(&digits))
    }
}

impl FromStr for Uint256 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow!("not a decimal integer: {}", s));
        }
        let mut out = [0u8; 32];
        for digit in s.bytes().map(|b| u16::from(b - b'0')) {
            let mut carry = digit;
            for byte in out.iter_mut().rev() {
                let acc = u16::from(*byte) * 10 + carry;
                *byte = (acc & 0xff) as u8;
                carry = acc >> 8;
            }
            if carry != 0 {
                return Err(anyhow!("{} does not fit in 256 bits", s));
            }
        }
        Ok(Uint256(out))
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A value passed to a constructor or contract entry point.
///
/// JSON mapping: booleans, integers up to `u64::MAX`, `0x` + 40 hex digits
/// as addresses, `0x` + 64 hex digits as bytes32, all-digit strings as
/// 256-bit integers, any other string as text, arrays as ACL entries.
/// Integers above `u64::MAX` must be quoted; JSON numbers lose precision
/// past that point and are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Uint(u64),
    Uint256(Uint256),
    Address(Address),
    Bytes32(Hash32),
    Text(String),
    Entries(Vec<AclEntry>),
}

struct ArgValueVisitor;

impl<'de> Visitor<'de> for ArgValueVisitor {
    type Value = ArgValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, an unsigned integer, a string or a list of ACL entries")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<ArgValue, E> {
        Ok(ArgValue::Bool(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ArgValue, E> {
        Ok(ArgValue::Uint(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ArgValue, E> {
        u64::try_from(v)
            .map(ArgValue::Uint)
            .map_err(|_| E::custom(format!("negative value {} is not a valid argument", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ArgValue, E> {
        Err(E::custom(format!(
            "number {} is not an integer up to u64::MAX; write large values as decimal strings",
            v
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ArgValue, E> {
        if v.starts_with("0x") {
            match v.len() {
                42 => return v.parse().map(ArgValue::Address).map_err(E::custom),
                66 => return v.parse().map(ArgValue::Bytes32).map_err(E::custom),
                _ => {}
            }
        }
        if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) {
            return v.parse().map(ArgValue::Uint256).map_err(E::custom);
        }
        Ok(ArgValue::Text(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<ArgValue, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = seq.next_element::<AclEntry>()? {
            entries.push(entry);
        }
        Ok(ArgValue::Entries(entries))
    }
}

impl<'de> Deserialize<'de> for ArgValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ArgValueVisitor)
    }
}

impl ArgValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            ArgValue::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ArgValue::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Address> for ArgValue {
    fn from(addr: Address) -> Self {
        ArgValue::Address(addr)
    }
}

impl From<Uint256> for ArgValue {
    fn from(v: Uint256) -> Self {
        ArgValue::Uint256(v)
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::Uint(v)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

/// Deployment category of a contract descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// Registry and registry factory, deployed by the bootstrap phase.
    Core,
    Factory,
    Extension,
    Adapter,
    Util,
    Test,
}

/// Access-control declarations of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclSpec {
    /// DAO-level flag names. `Some` (even empty) registers the contract
    /// as an adapter of the DAO; `None` leaves it unregistered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dao: Option<Vec<String>>,
    /// Extension id -> flag names scoped to that extension.
    #[serde(default)]
    pub extensions: BTreeMap<String, Vec<String>>,
}

impl AclSpec {
    pub fn has_dao_access(&self) -> bool {
        self.dao.is_some()
    }

    pub fn dao_flags(&self) -> &[String] {
        self.dao.as_deref().unwrap_or(&[])
    }

    /// Whether any non-empty flag list targets an extension.
    pub fn has_extension_access(&self) -> bool {
        self.extensions.values().any(|flags| !flags.is_empty())
    }

    pub fn flags_for_extension(&self, extension_id: &str) -> &[String] {
        self.extensions
            .get(extension_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn default_enabled() -> bool {
    true
}

/// A declarative entry of the contract table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescriptor {
    /// Logical id; hashed into the on-chain registry key.
    pub id: String,
    /// Artifact name handed to the deploy primitive.
    pub name: String,
    /// Key in the result aggregate.
    pub alias: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub skip_auto_deploy: bool,
    #[serde(default)]
    pub deployment_args: Vec<String>,
    #[serde(default)]
    pub acls: AclSpec,
    #[serde(default)]
    pub dao_configs: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generates_extension_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ContractDescriptor {
    /// Minimal descriptor for contracts not listed in the table
    /// (e.g. the off-chain voting helpers).
    pub fn synthetic(id: &str, name: &str, alias: &str, contract_type: ContractType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            alias: alias.to_string(),
            contract_type,
            enabled: true,
            skip_auto_deploy: false,
            deployment_args: Vec::new(),
            acls: AclSpec::default(),
            dao_configs: Vec::new(),
            generates_extension_id: None,
            version: None,
        }
    }

    /// Enabled and not excluded from the automatic phases.
    pub fn is_deployable(&self) -> bool {
        self.enabled && !self.skip_auto_deploy
    }
}

/// A deployed on-chain instance tagged with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    pub configs: ContractDescriptor,
    pub address: Address,
}

impl DeployedContract {
    /// Handle for an instance that already lives at `address`.
    pub fn at(configs: ContractDescriptor, address: Address) -> Self {
        Self { configs, address }
    }

    pub fn alias(&self) -> &str {
        &self.configs.alias
    }

    pub fn name(&self) -> &str {
        &self.configs.name
    }

    pub fn id(&self) -> &str {
        &self.configs.id
    }
}

/// Alias-keyed set of deployed handles that keeps deployment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractSet {
    entries: Vec<DeployedContract>,
}

impl ContractSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle; an alias may appear only once.
    pub fn insert(&mut self, contract: DeployedContract) -> DeployResult<()> {
        if let Some(existing) = self.get(contract.alias()) {
            return Err(DeployError::DuplicateAlias {
                alias: contract.alias().to_string(),
                first: existing.name().to_string(),
                second: contract.name().to_string(),
            });
        }
        self.entries.push(contract);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&DeployedContract> {
        self.entries.iter().find(|c| c.alias() == alias)
    }

    /// Lookup by logical id rather than alias.
    pub fn find_by_id(&self, id: &str) -> Option<&DeployedContract> {
        self.entries.iter().find(|c| c.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeployedContract> {
        self.entries.iter()
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.alias()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ContractSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|c| (c.alias(), c)))
    }
}

/// Contracts installed by the off-chain voting installer. All `None` when
/// the feature is off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingHelpers {
    pub offchain_voting: Option<DeployedContract>,
    pub snapshot_proposal: Option<DeployedContract>,
    pub offchain_voting_hash: Option<DeployedContract>,
    pub kick_bad_reporter: Option<DeployedContract>,
}

impl VotingHelpers {
    pub fn is_empty(&self) -> bool {
        self.offchain_voting.is_none()
            && self.snapshot_proposal.is_none()
            && self.offchain_voting_hash.is_none()
            && self.kick_bad_reporter.is_none()
    }
}

/// Final aggregate of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub dao: DeployedContract,
    pub dao_factory: DeployedContract,
    pub factories: ContractSet,
    pub extensions: ContractSet,
    pub adapters: ContractSet,
    pub util_contracts: ContractSet,
    pub test_contracts: ContractSet,
    pub voting_helpers: VotingHelpers,
}

impl DeploymentResult {
    /// Every alias in the aggregate, in category then deployment order.
    pub fn aliases(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for set in [
            &self.factories,
            &self.extensions,
            &self.adapters,
            &self.util_contracts,
            &self.test_contracts,
        ] {
            out.extend(set.aliases());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U256_MAX: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn test_uint256_decimal_round_trip_at_bounds() {
        for text in ["0", "1", "18446744073709551616", "1000000000000000000000000", U256_MAX] {
            let value: Uint256 = text.parse().unwrap();
            assert_eq!(value.to_string(), text);
        }
        assert_eq!(Uint256::from(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn test_uint256_rejects_overflow_and_non_digits() {
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(too_big.parse::<Uint256>().is_err());
        assert!("".parse::<Uint256>().is_err());
        assert!("12a".parse::<Uint256>().is_err());
        assert!("-1".parse::<Uint256>().is_err());
    }

    #[test]
    fn test_arg_value_json_mapping() {
        let parse = |json: &str| serde_json::from_str::<ArgValue>(json);

        assert_eq!(parse("true").unwrap(), ArgValue::Bool(true));
        assert_eq!(parse("600").unwrap(), ArgValue::Uint(600));
        assert_eq!(
            parse(r#""1000000000000000000000000""#).unwrap(),
            ArgValue::Uint256("1000000000000000000000000".parse().unwrap())
        );
        assert_eq!(parse(r#""DAO Units""#).unwrap(), ArgValue::from("DAO Units"));
        assert!(matches!(
            parse(r#""0x00000000000000000000000000000000000ff1ce""#).unwrap(),
            ArgValue::Address(_)
        ));
        assert!(matches!(
            parse(&format!("\"0x{}\"", "ab".repeat(32))).unwrap(),
            ArgValue::Bytes32(_)
        ));
        assert_eq!(parse("[]").unwrap(), ArgValue::Entries(Vec::new()));
    }

    #[test]
    fn test_arg_value_rejects_lossy_numbers() {
        let err = serde_json::from_str::<ArgValue>("1000000000000000000000000").unwrap_err();
        assert!(err.to_string().contains("decimal strings"), "{}", err);
        assert!(serde_json::from_str::<ArgValue>("1.5").is_err());
        assert!(serde_json::from_str::<ArgValue>("-3").is_err());
    }

    #[test]
    fn test_uint256_serializes_as_decimal_string() {
        let value = ArgValue::Uint256("1000000000000000000000000".parse().unwrap());
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#""1000000000000000000000000""#
        );
    }
}
