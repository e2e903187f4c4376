// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Agent enrollment command
//!
//! [`EnrollCmd`] performs a single enrollment exchange: the request is
//! validated before anything touches the network, the enrollment token is
//! moved into the `kbn-fleet-enrollment-token` header, and the response is
//! decoded and validated before it is handed back. Every failure is returned
//! to the caller; nothing is retried.

use bytes::Bytes;
use fleet_api_contract::validation::{validate_enroll_request, validate_enroll_response};
use fleet_api_contract::{ENROLL_PATH, ENROLLMENT_TOKEN_HEADER, EnrollRequest, EnrollResponse};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, warn};

use crate::error::{EnrollError, EnrollResult};
use crate::extract::{ErrorExtractor, FleetErrorExtractor};
use crate::transport::Transport;

/// Command enrolling an agent into Fleet
#[derive(Debug)]
pub struct EnrollCmd<T, X = FleetErrorExtractor> {
    client: T,
    extractor: X,
}

impl<T> EnrollCmd<T>
where
    T: Transport,
{
    /// Create a command using the default Kibana error extraction
    pub fn new(client: T) -> Self {
        Self {
            client,
            extractor: FleetErrorExtractor,
        }
    }
}

impl<T, X> EnrollCmd<T, X>
where
    T: Transport,
    X: ErrorExtractor,
{
    pub fn with_extractor(client: T, extractor: X) -> Self {
        Self { client, extractor }
    }

    /// Get a reference to the underlying transport
    pub fn client(&self) -> &T {
        &self.client
    }

    /// Enroll the agent in Fleet
    ///
    /// A non-200 response is handed to the extractor only once its body has
    /// been read; a failure while reading it is returned as
    /// [`EnrollError::Transport`] instead.
    pub async fn execute(&self, request: &EnrollRequest) -> EnrollResult<EnrollResponse> {
        validate_enroll_request(request)?;

        let headers = enroll_headers(request)?;
        let body = serde_json::to_vec(request).map_err(|e| EnrollError::Encode(Box::new(e)))?;

        debug!(path = ENROLL_PATH, body_len = body.len(), "sending enrollment request");
        let response = self
            .client
            .send(Method::POST, ENROLL_PATH, &[], headers, Some(Bytes::from(body)))
            .await?;

        let status = response.status();
        // The response is consumed here; its connection is released on every path below
        let body = response.into_bytes().await?;

        if status != StatusCode::OK {
            let err = self.extractor.extract(status, &body);
            warn!(%status, error = %err, "enrollment rejected");
            return Err(err.into());
        }

        let enroll_response: EnrollResponse =
            serde_json::from_slice(&body).map_err(EnrollError::Decode)?;
        validate_enroll_response(&enroll_response)?;

        info!(
            agent_id = %enroll_response.item.id,
            policy_id = %enroll_response.item.policy_id,
            action = %enroll_response.action,
            "agent enrolled"
        );
        Ok(enroll_response)
    }
}

fn enroll_headers(request: &EnrollRequest) -> EnrollResult<HeaderMap> {
    let mut token = HeaderValue::from_str(&request.enrollment_token)
        .map_err(|e| EnrollError::Encode(Box::new(e)))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(ENROLLMENT_TOKEN_HEADER), token);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RemoteError;
    use crate::transport::{TransportError, TransportResponse};
    use async_trait::async_trait;
    use fleet_api_contract::{EnrollmentType, Metadata};
    use futures::stream::{self, StreamExt};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    const SUCCESS_BODY: &str = r#"{
        "action": "created",
        "success": true,
        "item": {
            "id": "a4937110-e53e-11e9-934f-47a8e38a522c",
            "active": true,
            "policy_id": "default",
            "type": "PERMANENT",
            "enrolled_at": "2019-10-02T18:01:22.337Z",
            "user_provided_metadata": {},
            "local_metadata": {},
            "actions": [],
            "access_token": "ACCESS_TOKEN"
        }
    }"#;

    #[derive(Debug)]
    struct RecordedCall {
        method: Method,
        path: String,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        body: Option<Bytes>,
    }

    /// Sets its flag when dropped together with the body stream
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    enum Reply {
        Respond { status: StatusCode, body: &'static str },
        BrokenBody { status: StatusCode },
        Fail,
    }

    struct ScriptedTransport {
        reply: Reply,
        calls: Mutex<Vec<RecordedCall>>,
        body_released: Arc<AtomicBool>,
    }

    impl ScriptedTransport {
        fn respond(status: StatusCode, body: &'static str) -> Self {
            Self {
                reply: Reply::Respond { status, body },
                calls: Mutex::new(Vec::new()),
                body_released: Arc::new(AtomicBool::new(false)),
            }
        }

        fn broken_body(status: StatusCode) -> Self {
            Self {
                reply: Reply::BrokenBody { status },
                calls: Mutex::new(Vec::new()),
                body_released: Arc::new(AtomicBool::new(false)),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Reply::Fail,
                calls: Mutex::new(Vec::new()),
                body_released: Arc::new(AtomicBool::new(false)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            method: Method,
            path: &str,
            query: &[(String, String)],
            headers: HeaderMap,
            body: Option<Bytes>,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(RecordedCall {
                method,
                path: path.to_string(),
                query: query.to_vec(),
                headers,
                body,
            });

            match self.reply {
                Reply::Fail => Err(TransportError::Connection("connection refused".to_string())),
                Reply::Respond { status, body } => {
                    let guard = DropFlag(self.body_released.clone());
                    let chunks = stream::iter(vec![Ok(Bytes::from_static(body.as_bytes()))])
                        .map(move |chunk| {
                            let _alive = &guard;
                            chunk
                        })
                        .boxed();
                    Ok(TransportResponse::new(status, chunks))
                }
                Reply::BrokenBody { status } => {
                    let chunks = stream::iter(vec![
                        Ok(Bytes::from_static(b"{\"statusCode\"")),
                        Err(TransportError::Connection("connection reset".to_string())),
                    ])
                    .boxed();
                    Ok(TransportResponse::new(status, chunks))
                }
            }
        }
    }

    fn request() -> EnrollRequest {
        EnrollRequest::new("tok123", EnrollmentType::Permanent)
    }

    #[tokio::test]
    async fn test_execute_success() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY));

        let response = cmd.execute(&request()).await.unwrap();
        assert_eq!(response.item.id, "a4937110-e53e-11e9-934f-47a8e38a522c");
        assert_eq!(response.item.access_token, "ACCESS_TOKEN");
        assert!(response.success);
        assert!(cmd.client().body_released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_execute_sends_token_only_in_header() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY));
        cmd.execute(&request()).await.unwrap();

        let calls = cmd.client().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "/api/fleet/agents/enroll");
        assert!(call.query.is_empty());
        assert_eq!(call.headers.get("kbn-fleet-enrollment-token").unwrap(), "tok123");
        assert_eq!(call.headers.get(CONTENT_TYPE).unwrap(), "application/json");

        let body = std::str::from_utf8(call.body.as_ref().unwrap()).unwrap();
        assert!(body.contains(r#""type":"PERMANENT""#));
        assert!(!body.contains("sharedId"));
        assert!(!body.contains("tok123"));
    }

    #[tokio::test]
    async fn test_execute_sends_shared_id_and_metadata() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY));
        let request = request()
            .with_shared_id("host-42")
            .with_metadata(Metadata::default().with_user_provided("region", "us-east"));
        cmd.execute(&request).await.unwrap();

        let calls = cmd.client().calls.lock().unwrap();
        let body: serde_json::Value = serde_json::from_slice(calls[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["sharedId"], "host-42");
        assert_eq!(body["metadata"]["userProvided"]["region"], "us-east");
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_call() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY));
        let mut request = EnrollRequest::new("", EnrollmentType::Permanent);
        request.enrollment_type = None;

        let err = cmd.execute(&request).await.unwrap_err();
        match err {
            EnrollError::Validation(validation) => assert_eq!(validation.violations().len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(cmd.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_propagated() {
        let cmd = EnrollCmd::new(ScriptedTransport::failing());
        let err = cmd.execute(&request()).await.unwrap_err();
        assert!(matches!(err, EnrollError::Transport(TransportError::Connection(_))));
        assert_eq!(cmd.client().call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_ok_status_uses_extractor() {
        let body = r#"{"statusCode":401,"error":"Unauthorized","message":"invalid enrollment key"}"#;
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::UNAUTHORIZED, body));

        let err = cmd.execute(&request()).await.unwrap_err();
        match err {
            EnrollError::Remote(remote) => {
                assert_eq!(remote.status, StatusCode::UNAUTHORIZED);
                assert_eq!(remote.message, "invalid enrollment key");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert!(cmd.client().body_released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unreadable_error_body_skips_extractor() {
        let extracted = Arc::new(AtomicBool::new(false));
        let seen = extracted.clone();
        let extractor = move |status: StatusCode, _body: &[u8]| {
            seen.store(true, Ordering::SeqCst);
            RemoteError {
                status,
                error: "unexpected".to_string(),
                message: String::new(),
            }
        };
        let cmd = EnrollCmd::with_extractor(
            ScriptedTransport::broken_body(StatusCode::UNAUTHORIZED),
            extractor,
        );

        let err = cmd.execute(&request()).await.unwrap_err();
        assert!(matches!(err, EnrollError::Transport(TransportError::Connection(_))));
        assert!(!extracted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_non_ok_status_with_custom_extractor() {
        let extractor = |status: StatusCode, body: &[u8]| RemoteError {
            status,
            error: "custom".to_string(),
            message: String::from_utf8_lossy(body).into_owned(),
        };
        let cmd = EnrollCmd::with_extractor(
            ScriptedTransport::respond(StatusCode::CREATED, SUCCESS_BODY),
            extractor,
        );

        // Only 200 counts as success
        let err = cmd.execute(&request()).await.unwrap_err();
        match err {
            EnrollError::Remote(remote) => {
                assert_eq!(remote.status, StatusCode::CREATED);
                assert_eq!(remote.error, "custom");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_access_token_fails_validation() {
        let body = r#"{"action":"created","success":true,"item":{"id":"a4937110","type":"PERMANENT"}}"#;
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, body));

        let err = cmd.execute(&request()).await.unwrap_err();
        match err {
            EnrollError::Validation(validation) => {
                assert_eq!(validation.messages(), vec!["access token is missing"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(cmd.client().body_released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_null_fields_are_reported_by_validation() {
        let body = r#"{"item":{"id":null,"type":"PERMANENT","access_token":null,"actions":null}}"#;
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, body));

        let err = cmd.execute(&request()).await.unwrap_err();
        match err {
            EnrollError::Validation(validation) => {
                assert_eq!(validation.messages(), vec!["access token is missing", "missing ID"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_metadata_and_actions_enroll() {
        let body = r#"{"action":"created","success":true,"item":{"id":"a4937110","policy_id":null,"type":"PERMANENT","user_provided_metadata":null,"local_metadata":null,"actions":null,"access_token":"ACCESS_TOKEN"}}"#;
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, body));

        let response = cmd.execute(&request()).await.unwrap();
        assert_eq!(response.item.id, "a4937110");
        assert!(response.item.policy_id.is_empty());
        assert!(response.item.actions.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, "<html>oops</html>"));

        let err = cmd.execute(&request()).await.unwrap_err();
        assert!(matches!(err, EnrollError::Decode(_)));
        assert!(err.to_string().starts_with("fail to decode enrollment response"));
    }

    #[tokio::test]
    async fn test_unknown_type_in_response_is_decode_error() {
        let body = r#"{"item":{"id":"x","type":"EPHEMERAL","access_token":"t"}}"#;
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, body));

        let err = cmd.execute(&request()).await.unwrap_err();
        assert!(matches!(err, EnrollError::Decode(_)));
    }

    #[tokio::test]
    async fn test_token_with_invalid_header_characters() {
        let cmd = EnrollCmd::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY));
        let request = EnrollRequest::new("tok\n123", EnrollmentType::Permanent);

        let err = cmd.execute(&request).await.unwrap_err();
        assert!(matches!(err, EnrollError::Encode(_)));
        assert_eq!(cmd.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_executions_share_command() {
        let cmd = EnrollCmd::new(Arc::new(ScriptedTransport::respond(StatusCode::OK, SUCCESS_BODY)));
        let first = request();
        let second = request().with_shared_id("other");

        let (a, b) = tokio::join!(cmd.execute(&first), cmd.execute(&second));
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(cmd.client().call_count(), 2);
    }
}
