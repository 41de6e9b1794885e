use thiserror::Error;

/// Coarse classification of deployment failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something the run needs is absent from the table or the context.
    Configuration,
    /// A factory's generated-extension link does not resolve.
    Linkage,
    /// The chain client rejected a deploy, send or query.
    ChainCall,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("contract artifact `{name}` is not available in the deploy context")]
    MissingContract { name: String },

    #[error("missing deployment argument `{argument}` for contract `{contract}`")]
    MissingArgument { contract: String, argument: String },

    #[error("cannot resolve parameter `{parameter}` for contract `{contract}`")]
    UnresolvedParameter { contract: String, parameter: String },

    #[error("unknown ACL flag `{flag}` declared by `{contract}` for `{target}`")]
    UnknownAclFlag {
        contract: String,
        target: String,
        flag: String,
    },

    #[error("alias `{alias}` declared by both `{first}` and `{second}`")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("required contract `{0}` is not deployed")]
    MissingDeployment(String),

    #[error("factory `{factory}` generates extension `{extension_id}` which is not in the contract table")]
    Linkage {
        factory: String,
        extension_id: String,
    },

    #[error("chain call `{operation}` on `{contract}` failed: {source}")]
    ChainCall {
        contract: String,
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unexpected return value from `{operation}` on `{contract}`")]
    UnexpectedReturn { contract: String, operation: String },
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::MissingContract { .. }
            | DeployError::MissingArgument { .. }
            | DeployError::UnresolvedParameter { .. }
            | DeployError::UnknownAclFlag { .. }
            | DeployError::DuplicateAlias { .. }
            | DeployError::MissingDeployment(_) => ErrorKind::Configuration,
            DeployError::Linkage { .. } => ErrorKind::Linkage,
            DeployError::ChainCall { .. } | DeployError::UnexpectedReturn { .. } => {
                ErrorKind::ChainCall
            }
        }
    }

    pub(crate) fn chain(contract: &str, operation: &str, source: anyhow::Error) -> Self {
        DeployError::ChainCall {
            contract: contract.to_string(),
            operation: operation.to_string(),
            source,
        }
    }
}

pub type DeployResult<T> = std::result::Result<T, DeployError>;
