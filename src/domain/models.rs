use serde::{Deserialize, Serialize};

/// Address used for the fee recipient of fee-less payment networks.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Payment network identifier of the ERC20 fee proxy contract.
pub const ERC20_FEE_PROXY_CONTRACT: &str = "pn-erc20-fee-proxy-contract";

/// Builder identifier stored in the content data of every request.
pub const BUILDER_ID: &str = "request-network";

/// Application name recorded as `createdWith` in the content data.
pub const APP_NAME: &str = "Request Network Quickstart: Create a request";

/// Underlying asset kind of a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyType {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "ERC20")]
    Erc20,
}

impl CurrencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyType::Eth => "ETH",
            CurrencyType::Erc20 => "ERC20",
        }
    }
}

/// A currency a request can be denominated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    #[serde(rename = "type")]
    pub currency_type: CurrencyType,
    /// Token contract address for ERC20, the symbol for native currencies.
    pub value: String,
    /// Settlement network identifier, e.g. `mainnet` or `xdai`.
    pub network: String,
    pub decimals: u32,
}

/// Whether a storage chain is a production network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkType::Mainnet => write!(f, "mainnet"),
            NetworkType::Testnet => write!(f, "testnet"),
        }
    }
}

/// A network whose ledger anchors the content hash of request data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageChain {
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    /// Request node gateway used to persist and confirm transactions.
    pub gateway: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityType {
    #[serde(rename = "ethereumAddress")]
    EthereumAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    pub value: String,
}

impl Identity {
    pub fn ethereum(address: impl Into<String>) -> Self {
        Self {
            identity_type: IdentityType::EthereumAddress,
            value: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDescriptor {
    #[serde(rename = "type")]
    pub currency_type: CurrencyType,
    pub value: String,
    pub network: String,
}

impl From<&Currency> for CurrencyDescriptor {
    fn from(currency: &Currency) -> Self {
        Self {
            currency_type: currency.currency_type,
            value: currency.value.clone(),
            network: currency.network.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub currency: CurrencyDescriptor,
    /// Amount in the currency's smallest unit, as a decimal integer string.
    pub expected_amount: String,
    pub payee: Identity,
    /// Absent means the request is payable by anyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNetworkParameters {
    pub payment_network_name: String,
    pub payment_address: String,
    pub fee_address: String,
    pub fee_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNetwork {
    pub id: String,
    pub parameters: PaymentNetworkParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub reason: String,
    pub due_date: String,
    pub builder_id: String,
    pub created_with: String,
}

/// Structured creation payload handed to the invoicing client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestParameters {
    pub request_info: RequestInfo,
    pub payment_network: PaymentNetwork,
    pub content_data: ContentData,
    pub signer: Identity,
}

/// Request data as reported by the invoicing network.
///
/// The content is opaque to this crate apart from the `state` field and
/// the `requestId`, which are surfaced in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestResult(pub serde_json::Value);

impl RequestResult {
    pub fn state(&self) -> Option<&str> {
        self.0.get("state").and_then(|s| s.as_str())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.0.get("requestId").and_then(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
