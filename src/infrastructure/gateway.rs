//! Blocking HTTP client for a request-node gateway.
//!
//! The client signs a `create` action with the connected wallet, persists
//! it through the storage chain's gateway and polls the gateway until the
//! transaction is confirmed on-chain.

use super::config::GatewayConfig;
use crate::application::{ClientError, MessageSigner, RequestClient, RequestHandle, WalletError};
use crate::domain::{CreateRequestParameters, RequestResult};
use ethers_core::utils::keccak256;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::{Map, Value, json};
use std::thread;
use tracing::{debug, info, warn};

pub const REQUEST_LOGIC_VERSION: &str = "2.0.3";
pub const SIGNATURE_METHOD: &str = "ecdsa-ethereum";
pub const CONTENT_DATA_EXTENSION: &str = "content-data";

/// Multi-format prefix of keccak-256 hashes.
const HASH_PREFIX: &str = "01";

/// Sorts object keys and lower-cases string values, recursively.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), normalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}

/// Keccak-256 of the normalized JSON, hex-encoded with the multi-format prefix.
pub fn normalized_hash(value: &Value) -> String {
    let serialized = normalize(value).to_string();
    format!("{}{}", HASH_PREFIX, hex::encode(keccak256(serialized.as_bytes())))
}

/// Unsigned `create` action data for the given parameters.
pub fn create_action(parameters: &CreateRequestParameters) -> Value {
    let info = &parameters.request_info;
    let pn = &parameters.payment_network;

    let mut action_parameters = json!({
        "currency": info.currency,
        "expectedAmount": info.expected_amount,
        "payee": info.payee,
        "timestamp": info.timestamp,
        "extensionsData": [
            {
                "action": "create",
                "id": pn.id,
                "parameters": pn.parameters,
                "version": "0.2.0",
            },
            {
                "action": "create",
                "id": CONTENT_DATA_EXTENSION,
                "parameters": { "content": parameters.content_data },
                "version": "0.1.0",
            },
        ],
    });
    if let Some(payer) = &info.payer {
        action_parameters["payer"] = json!(payer);
    }

    json!({
        "name": "create",
        "parameters": action_parameters,
        "version": REQUEST_LOGIC_VERSION,
    })
}

/// Wraps action data with the signer's signature over its normalized hash.
pub fn sign_action(data: Value, signer: &dyn MessageSigner) -> Result<Value, WalletError> {
    let hash = normalized_hash(&data);
    let signature = signer.sign_message(hash.as_bytes())?;
    Ok(json!({
        "data": data,
        "signature": { "method": SIGNATURE_METHOD, "value": signature },
    }))
}

pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }
}

fn endpoint(gateway: &str, path: &str) -> String {
    format!("{}/{}", gateway.trim_end_matches('/'), path)
}

fn read_json(response: reqwest::blocking::Response) -> Result<Value, ClientError> {
    let status = response.status();
    let body = response.text().map_err(|e| ClientError::Http(e.to_string()))?;
    if !status.is_success() {
        return Err(ClientError::Gateway { status: status.as_u16(), body });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Serialization(e.to_string()))
}

impl RequestClient for GatewayClient {
    fn create_request(
        &self,
        gateway: &str,
        parameters: &CreateRequestParameters,
        signer: &dyn MessageSigner,
    ) -> Result<Box<dyn RequestHandle>, ClientError> {
        let action = create_action(parameters);
        let signed = sign_action(action, signer)?;
        let request_id = normalized_hash(&signed);

        let mut topics = vec![normalized_hash(&json!(parameters.request_info.payee))];
        if let Some(payer) = &parameters.request_info.payer {
            topics.push(normalized_hash(&json!(payer)));
        }

        let transaction = json!({ "data": signed.to_string() });
        let transaction_hash = normalized_hash(&transaction);

        let body = json!({
            "channelId": request_id,
            "topics": topics,
            "transactionData": transaction,
        });
        let url = endpoint(gateway, "persistTransaction");
        debug!(%url, %request_id, "persisting transaction");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let persisted = read_json(response)?;
        info!(%request_id, %transaction_hash, "transaction persisted");

        let info = &parameters.request_info;
        let data = json!({
            "requestId": request_id,
            "state": "pending",
            "currency": info.currency,
            "expectedAmount": info.expected_amount,
            "payee": info.payee,
            "payer": info.payer,
            "creator": info.payee,
            "timestamp": info.timestamp,
            "extensionsData": signed["data"]["parameters"]["extensionsData"],
            "contentData": parameters.content_data,
            "version": REQUEST_LOGIC_VERSION,
            "meta": persisted.get("meta").cloned().unwrap_or(Value::Null),
            "pending": { "state": "created" },
        });

        Ok(Box::new(GatewayHandle {
            http: self.http.clone(),
            config: self.config.clone(),
            gateway: gateway.to_string(),
            transaction_hash,
            data,
        }))
    }
}

/// A persisted request awaiting on-chain confirmation.
pub struct GatewayHandle {
    http: Client,
    config: GatewayConfig,
    gateway: String,
    transaction_hash: String,
    data: Value,
}

impl RequestHandle for GatewayHandle {
    fn data(&self) -> RequestResult {
        RequestResult(self.data.clone())
    }

    fn wait_for_confirmation(self: Box<Self>) -> Result<RequestResult, ClientError> {
        let url = endpoint(&self.gateway, "getConfirmedTransaction");
        thread::sleep(self.config.confirmation_defer);

        for attempt in 1..=self.config.confirmation_max_retry {
            let response = self
                .http
                .get(&url)
                .query(&[("transactionHash", self.transaction_hash.as_str())])
                .send()
                .map_err(|e| ClientError::Http(e.to_string()))?;

            if response.status() == StatusCode::NOT_FOUND {
                debug!(attempt, transaction_hash = %self.transaction_hash, "not confirmed yet");
                if attempt < self.config.confirmation_max_retry {
                    thread::sleep(self.config.confirmation_retry_delay);
                }
                continue;
            }

            let confirmed = read_json(response)?;
            let mut data = self.data.clone();
            data["state"] = json!("created");
            data["pending"] = Value::Null;
            data["meta"] = confirmed.get("meta").cloned().unwrap_or(confirmed);
            info!(attempt, transaction_hash = %self.transaction_hash, "transaction confirmed");
            return Ok(RequestResult(data));
        }

        warn!(
            attempts = self.config.confirmation_max_retry,
            transaction_hash = %self.transaction_hash,
            "confirmation retries exhausted"
        );
        Err(ClientError::ConfirmationTimeout {
            attempts: self.config.confirmation_max_retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::submission::tests::{FakeSigner, OTHER, PAYEE, usdc};
    use crate::application::{FormState, build_create_parameters};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use std::time::Duration;

    fn parameters(payer: Option<&str>) -> CreateRequestParameters {
        let form = FormState {
            storage_chain_key: "100".to_string(),
            currency_key: "usdc".to_string(),
            expected_amount: "3".to_string(),
            payer_identity: payer.unwrap_or_default().to_string(),
            reason: "Hosting".to_string(),
            ..FormState::default()
        };
        build_create_parameters(&form, &usdc(), PAYEE, 1_700_000_000).unwrap()
    }

    fn fast_config(max_retry: u32) -> GatewayConfig {
        GatewayConfig {
            confirmation_defer: Duration::ZERO,
            confirmation_retry_delay: Duration::ZERO,
            confirmation_max_retry: max_retry,
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Serves one canned response per connection, in order, and records
    /// each request line and body.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }
                let mut request_body = vec![0; content_length];
                reader.read_exact(&mut request_body).unwrap();
                seen.push(format!(
                    "{}\n{}",
                    request_line.trim_end(),
                    String::from_utf8_lossy(&request_body)
                ));

                let mut stream = reader.into_inner();
                write!(
                    stream,
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
            }
            seen
        });
        (base, handle)
    }

    #[test]
    fn test_normalize_sorts_keys_and_lowercases() {
        let value = json!({"b": "ABC", "a": [{"d": "X", "c": 1}], "e": null});
        assert_eq!(
            normalize(&value).to_string(),
            r#"{"a":[{"c":1,"d":"x"}],"b":"abc","e":null}"#
        );
    }

    #[test]
    fn test_normalized_hash_ignores_key_order_and_case() {
        let a = normalized_hash(&json!({"x": "AbC", "y": 1}));
        let b = normalized_hash(&json!({"y": 1, "x": "abc"}));
        assert_eq!(a, b);
        assert!(a.starts_with("01"));
        assert_eq!(a.len(), 2 + 64);
        assert_ne!(a, normalized_hash(&json!({"x": "abd", "y": 1})));
    }

    #[test]
    fn test_create_action_carries_extensions() {
        let action = create_action(&parameters(None));
        assert_eq!(action["name"], "create");
        assert_eq!(action["version"], REQUEST_LOGIC_VERSION);

        let params = &action["parameters"];
        assert_eq!(params["expectedAmount"], "3000000");
        assert!(params.get("payer").is_none());
        let extensions = params["extensionsData"].as_array().unwrap();
        assert_eq!(extensions[0]["id"], "pn-erc20-fee-proxy-contract");
        assert_eq!(extensions[0]["parameters"]["paymentAddress"], PAYEE);
        assert_eq!(extensions[1]["id"], CONTENT_DATA_EXTENSION);
        assert_eq!(extensions[1]["parameters"]["content"]["reason"], "Hosting");

        let with_payer = create_action(&parameters(Some(OTHER)));
        assert_eq!(with_payer["parameters"]["payer"]["value"], OTHER);
    }

    #[test]
    fn test_sign_action_wraps_data() {
        let signed = sign_action(create_action(&parameters(None)), &FakeSigner).unwrap();
        assert_eq!(signed["signature"]["method"], SIGNATURE_METHOD);
        assert!(signed["signature"]["value"].as_str().unwrap().starts_with("0x"));
        assert_eq!(signed["data"]["name"], "create");
    }

    #[test]
    fn test_create_and_confirm_against_gateway() {
        let (base, server) = serve(vec![
            (200, r#"{"meta": {"storageMeta": {"state": "pending"}}, "result": {}}"#),
            (404, ""),
            (200, r#"{"meta": {"storageMeta": {"state": "confirmed"}}, "result": {}}"#),
        ]);
        let client = GatewayClient::new(fast_config(3)).unwrap();

        let handle = client
            .create_request(&base, &parameters(Some(OTHER)), &FakeSigner)
            .unwrap();
        let pending = handle.data();
        assert_eq!(pending.state(), Some("pending"));
        let request_id = pending.request_id().unwrap().to_string();
        assert!(request_id.starts_with("01"));
        assert_eq!(pending.0["meta"]["storageMeta"]["state"], "pending");

        let confirmed = handle.wait_for_confirmation().unwrap();
        assert_eq!(confirmed.state(), Some("created"));
        assert_eq!(confirmed.request_id(), Some(request_id.as_str()));
        assert_eq!(confirmed.0["meta"]["storageMeta"]["state"], "confirmed");
        assert!(confirmed.0["pending"].is_null());

        let seen = server.join().unwrap();
        assert!(seen[0].starts_with("POST /persistTransaction"));
        let persisted: Value = serde_json::from_str(seen[0].split_once('\n').unwrap().1).unwrap();
        assert_eq!(persisted["channelId"], request_id.as_str());
        assert_eq!(persisted["topics"].as_array().unwrap().len(), 2);
        assert!(seen[1].starts_with("GET /getConfirmedTransaction?transactionHash=01"));
        assert!(seen[2].starts_with("GET /getConfirmedTransaction?transactionHash=01"));
    }

    #[test]
    fn test_gateway_error_status() {
        let (base, server) = serve(vec![(500, "storage unavailable")]);
        let client = GatewayClient::new(fast_config(1)).unwrap();

        let err = client
            .create_request(&base, &parameters(None), &FakeSigner)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ClientError::Gateway { status: 500, body: "storage unavailable".to_string() }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_no_retry_delay_after_last_attempt() {
        let (base, server) = serve(vec![(200, "{}"), (404, "")]);
        let config = GatewayConfig {
            confirmation_retry_delay: Duration::from_secs(5),
            ..fast_config(1)
        };
        let client = GatewayClient::new(config).unwrap();

        let handle = client.create_request(&base, &parameters(None), &FakeSigner).unwrap();
        let started = std::time::Instant::now();
        assert_eq!(
            handle.wait_for_confirmation().err(),
            Some(ClientError::ConfirmationTimeout { attempts: 1 })
        );
        assert!(started.elapsed() < Duration::from_secs(4));
        server.join().unwrap();
    }

    #[test]
    fn test_confirmation_timeout() {
        let (base, server) = serve(vec![(200, "{}"), (404, ""), (404, "")]);
        let client = GatewayClient::new(fast_config(2)).unwrap();

        let handle = client.create_request(&base, &parameters(None), &FakeSigner).unwrap();
        assert_eq!(
            handle.wait_for_confirmation().err(),
            Some(ClientError::ConfirmationTimeout { attempts: 2 })
        );
        server.join().unwrap();
    }
}
