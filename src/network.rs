use serde::Serialize;

/// A named chain the deployer knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: &'static str,
    pub chain_id: u64,
}

pub const NETWORKS: &[Network] = &[
    Network { name: "ganache", chain_id: 1337 },
    Network { name: "mainnet", chain_id: 1 },
    Network { name: "rinkeby", chain_id: 4 },
    Network { name: "goerli", chain_id: 5 },
    Network { name: "polygon", chain_id: 137 },
    Network { name: "mumbai", chain_id: 80001 },
    Network { name: "harmony", chain_id: 1_666_600_000 },
    Network { name: "harmonytest", chain_id: 1_666_700_000 },
];

/// Exact, case-sensitive lookup. Unknown names yield `None`.
pub fn lookup(name: &str) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.name == name)
}
