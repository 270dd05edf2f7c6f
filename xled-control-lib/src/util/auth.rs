use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use rand::RngCore;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::util::context::CallContext;
use crate::util::error::{Error, Result};
use crate::util::options::Host;
use crate::util::traits::{ResponseCode, ResponseCodeTrait};
use crate::util::transport::{decode_json, DeviceRequest, RequestBody, Transport};

pub const LOGIN_PATH: &str = "/xled/v1/login";
pub const VERIFY_PATH: &str = "/xled/v1/verify";

const CHALLENGE_LEN: usize = 32;

/// A session with a device, only obtainable through [`Auth::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    host: Host,
    token: String,
    expires_in: Option<i32>,
}

impl Credential {
    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Lifetime announced by the device at login, not enforced here.
    pub fn expires_in(&self) -> Option<i32> {
        self.expires_in
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct LoginResponse {
    #[serde(default)]
    authentication_token: String,
    #[serde(rename = "challenge-response", default)]
    challenge_response: String,
    /// Seems to be always 1440. Since a Day has 1440 Minutes, this may mean: "10 Days"?
    authentication_token_expires_in: Option<i32>,
    #[serde(default)]
    code: u32,
}

impl ResponseCodeTrait for LoginResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct VerifyResponse {
    #[serde(default)]
    code: u32,
}

impl ResponseCodeTrait for VerifyResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

pub struct Auth;

impl Auth {
    pub fn generate_challenge() -> Vec<u8> {
        let mut challenge = vec![0u8; CHALLENGE_LEN];
        rand::thread_rng().fill_bytes(&mut challenge);
        challenge
    }

    /// Runs the login/verify handshake against `host`.
    ///
    /// A credential is only handed out after the device accepted both phases.
    pub async fn authenticate(
        transport: &dyn Transport,
        host: &str,
        context: &CallContext,
    ) -> Result<Credential> {
        let host = Host::parse(host)?;

        let challenge = STANDARD.encode(Self::generate_challenge());
        let login = send_challenge(transport, &host, challenge, context).await?;

        if login.authentication_token.is_empty() {
            return Err(Error::protocol("login", "no authentication token received"));
        }
        if login.challenge_response.is_empty() {
            return Err(Error::protocol("login", "no challenge response received"));
        }
        if !login.is_ok() {
            return Err(Error::unexpected_code("login", login.response_code()));
        }
        debug!("Login to {} accepted, verifying", host);

        send_verify(
            transport,
            &host,
            &login.authentication_token,
            &login.challenge_response,
            context,
        )
        .await?;

        info!("Authenticated with {}", host);
        Ok(Credential {
            host,
            token: login.authentication_token,
            expires_in: login.authentication_token_expires_in,
        })
    }
}

async fn send_challenge(
    transport: &dyn Transport,
    host: &Host,
    challenge: String,
    context: &CallContext,
) -> Result<LoginResponse> {
    let request = DeviceRequest::new(Method::POST, host, LOGIN_PATH)
        .with_body(RequestBody::Json(json!({ "challenge": challenge })));
    let body = context.run(transport.round_trip(request)).await?;
    decode_json("login", &body)
}

async fn send_verify(
    transport: &dyn Transport,
    host: &Host,
    auth_token: &str,
    challenge_response: &str,
    context: &CallContext,
) -> Result<()> {
    let request = DeviceRequest::new(Method::POST, host, VERIFY_PATH)
        .with_auth_token(auth_token)
        .with_body(RequestBody::Json(
            json!({ "challenge-response": challenge_response }),
        ));
    let body = context.run(transport.round_trip(request)).await?;
    let verify: VerifyResponse = decode_json("verify", &body)?;
    if verify.is_ok() {
        Ok(())
    } else {
        Err(Error::unexpected_code("verify", verify.response_code()))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::util::transport::fake::{Reply, ScriptedTransport};

    fn login_ok() -> serde_json::Value {
        json!({
            "authentication_token": "abc",
            "challenge-response": "xyz",
            "authentication_token_expires_in": 14400,
            "code": 1000
        })
    }

    #[test]
    fn test_generate_challenge() {
        let challenge = Auth::generate_challenge();
        assert_eq!(challenge.len(), 32);
        assert_ne!(challenge, Auth::generate_challenge());
    }

    #[tokio::test]
    async fn test_empty_host_sends_nothing() {
        let transport = ScriptedTransport::default();
        for host in ["", "  "] {
            let result = Auth::authenticate(&transport, host, &CallContext::new()).await;
            assert!(matches!(result, Err(Error::Configuration { .. })));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_and_verify() {
        let transport = ScriptedTransport::json([login_ok(), json!({ "code": 1000 })]);
        let credential = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new())
            .await
            .unwrap();
        assert_eq!(credential.host().as_str(), "192.168.4.1");
        assert_eq!(credential.token(), "abc");
        assert_eq!(credential.expires_in(), Some(14400));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);

        assert_eq!(requests[0].path, LOGIN_PATH);
        assert_eq!(requests[0].auth_token, None);
        let RequestBody::Json(login) = &requests[0].body else {
            panic!("login must send JSON");
        };
        let challenge = STANDARD
            .decode(login["challenge"].as_str().unwrap())
            .unwrap();
        assert_eq!(challenge.len(), 32);

        assert_eq!(requests[1].path, VERIFY_PATH);
        assert_eq!(requests[1].auth_token.as_deref(), Some("abc"));
        assert_eq!(
            requests[1].body,
            RequestBody::Json(json!({ "challenge-response": "xyz" }))
        );
    }

    #[tokio::test]
    async fn test_verify_rejected() {
        let transport = ScriptedTransport::json([login_ok(), json!({ "code": 1001 })]);
        let result = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new()).await;
        assert!(matches!(
            result,
            Err(Error::Protocol {
                operation: "verify",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_login_without_token_stops_before_verify() {
        let transport = ScriptedTransport::json([json!({
            "authentication_token": "",
            "challenge-response": "xyz",
            "code": 1000
        })]);
        let result = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new()).await;
        assert!(matches!(result, Err(Error::Protocol { operation: "login", .. })));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_login_without_challenge_response() {
        let transport = ScriptedTransport::json([json!({
            "authentication_token": "abc",
            "code": 1000
        })]);
        let result = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new()).await;
        assert!(matches!(result, Err(Error::Protocol { operation: "login", .. })));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_login_error_code() {
        let mut reply = login_ok();
        reply["code"] = json!(1105);
        let transport = ScriptedTransport::json([reply]);
        let result = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new()).await;
        let Err(Error::Protocol { reason, .. }) = result else {
            panic!("expected a protocol error");
        };
        assert!(reason.contains("1105"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_protocol_failure() {
        let transport = ScriptedTransport::new([Reply::Status(StatusCode::SERVICE_UNAVAILABLE)]);
        let result = Auth::authenticate(&transport, "192.168.4.1", &CallContext::new()).await;
        assert!(matches!(result, Err(Error::TransportStatus { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_during_verify() {
        let transport = ScriptedTransport::new([Reply::Json(login_ok()), Reply::Hang]);
        let context = CallContext::new();
        let token = context.cancellation_token().clone();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            token.cancel();
        });
        let result = Auth::authenticate(&transport, "192.168.4.1", &context).await;
        canceller.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(transport.requests().len(), 2);
    }
}
