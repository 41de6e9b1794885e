//! Built-in contract table used when no table file is supplied.

use crate::types::{ContractDescriptor, ContractType};
use ContractType::{Adapter, Core, Extension, Factory, Test, Util};

struct Entry(ContractDescriptor);

impl Entry {
    fn new(id: &str, name: &str, alias: &str, contract_type: ContractType) -> Self {
        let mut descriptor = ContractDescriptor::synthetic(id, name, alias, contract_type);
        descriptor.version = Some("1.0.0".to_string());
        Entry(descriptor)
    }

    fn args(mut self, args: &[&str]) -> Self {
        self.0.deployment_args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    fn generates(mut self, extension_id: &str) -> Self {
        self.0.generates_extension_id = Some(extension_id.to_string());
        self
    }

    fn dao(mut self, flags: &[&str]) -> Self {
        self.0.acls.dao = Some(flags.iter().map(|f| f.to_string()).collect());
        self
    }

    fn ext(mut self, extension_id: &str, flags: &[&str]) -> Self {
        self.0.acls.extensions.insert(
            extension_id.to_string(),
            flags.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    fn dao_config(mut self, params: &[&str]) -> Self {
        self.0
            .dao_configs
            .push(params.iter().map(|p| p.to_string()).collect());
        self
    }

    fn disabled(mut self) -> Self {
        self.0.enabled = false;
        self
    }

    fn skip_auto_deploy(mut self) -> Self {
        self.0.skip_auto_deploy = true;
        self
    }

    fn build(self) -> ContractDescriptor {
        self.0
    }
}

pub fn default_contracts() -> Vec<ContractDescriptor> {
    vec![
        // Core
        Entry::new("daoRegistry", "DaoRegistry", "daoRegistry", Core).build(),
        Entry::new("daoFactory", "DaoFactory", "daoFactory", Core).build(),
        // Factories
        Entry::new("bank-factory", "BankFactory", "bankExtFactory", Factory)
            .generates("bank")
            .args(&["daoAddress", "maxExternalTokens"])
            .build(),
        Entry::new("erc1271-factory", "ERC1271ExtensionFactory", "erc1271ExtFactory", Factory)
            .generates("erc1271")
            .args(&["daoAddress"])
            .build(),
        Entry::new("executor-factory", "ExecutorExtensionFactory", "executorExtFactory", Factory)
            .generates("executor-ext")
            .args(&["daoAddress"])
            .build(),
        Entry::new("nft-factory", "NFTCollectionFactory", "nftCollectionFactory", Factory)
            .generates("nft")
            .args(&["daoAddress"])
            .build(),
        Entry::new("erc20-factory", "ERC20TokenExtensionFactory", "erc20ExtFactory", Factory)
            .generates("erc20-ext")
            .args(&[
                "daoAddress",
                "erc20TokenName",
                "unitTokenToMint",
                "erc20TokenSymbol",
                "erc20TokenDecimals",
            ])
            .build(),
        Entry::new(
            "vesting-factory",
            "InternalTokenVestingExtensionFactory",
            "vestingExtFactory",
            Factory,
        )
        .generates("internal-token-vesting-extension")
        .args(&["daoAddress"])
        .build(),
        Entry::new("erc1155-factory", "ERC1155TokenCollectionFactory", "erc1155ExtFactory", Factory)
            .generates("erc1155-ext")
            .args(&["daoAddress"])
            .build(),
        // Extensions
        Entry::new("bank", "BankExtension", "bankExtension", Extension).build(),
        Entry::new("erc1271", "ERC1271Extension", "erc1271Extension", Extension).build(),
        Entry::new("executor-ext", "ExecutorExtension", "executorExtension", Extension).build(),
        Entry::new("nft", "NFTExtension", "nftExtension", Extension).build(),
        Entry::new("erc20-ext", "ERC20Extension", "erc20Extension", Extension)
            .ext("bank", &["INTERNAL_TRANSFER"])
            .build(),
        Entry::new(
            "internal-token-vesting-extension",
            "InternalTokenVestingExtension",
            "vestingExtension",
            Extension,
        )
        .build(),
        Entry::new("erc1155-ext", "ERC1155TokenExtension", "erc1155Extension", Extension).build(),
        // Adapters
        Entry::new("daoRegistryAdapter", "DaoRegistryAdapterContract", "daoRegistryAdapter", Adapter)
            .dao(&["UPDATE_DELEGATE_KEY"])
            .build(),
        Entry::new("bank-adapter", "BankAdapterContract", "bankAdapter", Adapter)
            .dao(&[])
            .ext("bank", &["WITHDRAW", "SUB_FROM_BALANCE", "UPDATE_TOKEN"])
            .build(),
        Entry::new("configuration", "ConfigurationContract", "configuration", Adapter)
            .dao(&["SUBMIT_PROPOSAL", "SET_CONFIGURATION"])
            .build(),
        Entry::new("ragequit", "RagequitContract", "ragequit", Adapter)
            .dao(&[])
            .ext("bank", &["SUB_FROM_BALANCE", "ADD_TO_BALANCE", "INTERNAL_TRANSFER"])
            .build(),
        Entry::new("managing", "ManagingContract", "managing", Adapter)
            .dao(&[
                "SUBMIT_PROPOSAL",
                "REPLACE_ADAPTER",
                "ADD_EXTENSION",
                "REMOVE_EXTENSION",
                "SET_CONFIGURATION",
            ])
            .build(),
        Entry::new("guildkick", "GuildKickContract", "guildkick", Adapter)
            .dao(&["SUBMIT_PROPOSAL"])
            .ext(
                "bank",
                &["WITHDRAW", "INTERNAL_TRANSFER", "SUB_FROM_BALANCE", "ADD_TO_BALANCE"],
            )
            .build(),
        Entry::new("financing", "FinancingContract", "financing", Adapter)
            .dao(&["SUBMIT_PROPOSAL"])
            .ext("bank", &["ADD_TO_BALANCE", "SUB_FROM_BALANCE"])
            .build(),
        Entry::new("onboarding", "OnboardingContract", "onboarding", Adapter)
            .dao(&["SUBMIT_PROPOSAL", "UPDATE_DELEGATE_KEY", "NEW_MEMBER"])
            .ext("bank", &["ADD_TO_BALANCE", "INTERNAL_TRANSFER"])
            .dao_config(&[
                "daoAddress",
                "unitTokenToMint",
                "unitPrice",
                "nbUnits",
                "maxChunks",
                "tokenAddr",
            ])
            .build(),
        Entry::new("voting", "VotingContract", "voting", Adapter)
            .dao(&[])
            .dao_config(&["daoAddress", "votingPeriod", "gracePeriod"])
            .build(),
        Entry::new("tribute", "TributeContract", "tribute", Adapter)
            .dao(&["SUBMIT_PROPOSAL", "NEW_MEMBER"])
            .ext("bank", &["ADD_TO_BALANCE", "REGISTER_NEW_TOKEN"])
            .build(),
        Entry::new("distribute", "DistributeContract", "distribute", Adapter)
            .dao(&["SUBMIT_PROPOSAL"])
            .ext("bank", &["INTERNAL_TRANSFER"])
            .build(),
        Entry::new("nft-adapter", "NFTAdapterContract", "nftAdapter", Adapter)
            .dao(&[])
            .ext("nft", &["COLLECT_NFT"])
            .build(),
        Entry::new("tribute-nft", "TributeNFTContract", "tributeNFT", Adapter)
            .dao(&["SUBMIT_PROPOSAL", "NEW_MEMBER"])
            .ext("nft", &["COLLECT_NFT"])
            .ext("bank", &["ADD_TO_BALANCE"])
            .build(),
        Entry::new(
            "erc20-transfer-strategy",
            "ERC20TransferStrategy",
            "erc20TransferStrategy",
            Adapter,
        )
        .dao(&[])
        .ext("bank", &["INTERNAL_TRANSFER"])
        .build(),
        Entry::new("signatures", "SignaturesContract", "signatures", Adapter)
            .dao(&["SUBMIT_PROPOSAL"])
            .ext("erc1271", &["SIGN"])
            .build(),
        Entry::new("coupon-onboarding", "CouponOnboardingContract", "couponOnboarding", Adapter)
            .dao(&["NEW_MEMBER"])
            .ext("bank", &["ADD_TO_BALANCE", "INTERNAL_TRANSFER"])
            .dao_config(&[
                "daoAddress",
                "couponCreatorAddress",
                "erc20Extension",
                "unitTokenToMint",
                "maxAmount",
            ])
            .build(),
        Entry::new("kyc-onboarding", "KycOnboardingContract", "kycOnboarding", Adapter)
            .args(&["weth"])
            .dao(&["NEW_MEMBER"])
            .ext("bank", &["ADD_TO_BALANCE", "INTERNAL_TRANSFER"])
            .disabled()
            .build(),
        Entry::new("lend-nft", "LendNFTContract", "lendNFT", Adapter)
            .dao(&["SUBMIT_PROPOSAL", "NEW_MEMBER"])
            .ext("nft", &["WITHDRAW_NFT", "COLLECT_NFT"])
            .skip_auto_deploy()
            .build(),
        // Utilities
        Entry::new("multicall", "Multicall", "multicall", Util).build(),
        Entry::new("pixel-nft", "PixelNFT", "pixelNFT", Util)
            .args(&["maxNFTs"])
            .build(),
        Entry::new("ol-token", "OLToken", "olToken", Util)
            .args(&["erc20TokenSupply"])
            .build(),
        // Test contracts
        Entry::new("test-token-1", "TestToken1", "testToken1", Test)
            .args(&["testTokenSupply"])
            .build(),
        Entry::new("test-token-2", "TestToken2", "testToken2", Test)
            .args(&["testTokenSupply"])
            .build(),
        Entry::new("test-fairshare-calc", "TestFairShareCalc", "testFairShareCalc", Test).build(),
    ]
}
