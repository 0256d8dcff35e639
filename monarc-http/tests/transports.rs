//! Backend parity suite.
//!
//! Every backend must satisfy the same transport semantics, so each
//! scenario here runs against all enabled backends through a real
//! dispatcher and a live mock server.

use std::sync::Arc;

use monarc::{ApiError, ApiRequestor, Credentials, HttpTransport, Method, ParamValue, Params};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backends() -> Vec<Arc<dyn HttpTransport>> {
    let mut transports: Vec<Arc<dyn HttpTransport>> = Vec::new();
    #[cfg(feature = "reqwest")]
    transports.push(Arc::new(monarc_http::ReqwestTransport::default()));
    #[cfg(feature = "ureq")]
    transports.push(Arc::new(monarc_http::UreqTransport::default()));
    #[cfg(feature = "socket")]
    transports.push(Arc::new(monarc_http::SocketTransport::default()));
    transports
}

fn credentials_for(server: &MockServer) -> Credentials {
    Credentials::new("mk_test_123").with_api_base(server.uri())
}

#[tokio::test]
async fn get_sends_encoded_query_and_decodes_response() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/charges"))
            .and(query_param("alist[]", "1"))
            .and(query_param("alist[]", "2"))
            .and(query_param("adict[frobble]", "bits"))
            .and(query_param("note", "\u{2603}"))
            .and(header("Authorization", "Bearer mk_test_123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"object": "list", "count": 2}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        let mut params = Params::new();
        params.insert("alist".to_owned(), ParamValue::from(vec![1, 2]));
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("frobble".to_owned(), ParamValue::from("bits"));
        params.insert("adict".to_owned(), ParamValue::Map(inner));
        params.insert("note".to_owned(), ParamValue::from("\u{2603}"));

        let (decoded, used_key) = requestor
            .request(Method::Get, "/v1/charges", &params, &credentials_for(&server))
            .await
            .unwrap_or_else(|err| panic!("backend {name}: {err}"));

        assert_eq!(decoded["count"], 2, "backend {name}");
        assert_eq!(used_key, "mk_test_123", "backend {name}");
    }
}

#[tokio::test]
async fn post_sends_form_body_with_content_type() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string("amount=100&currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": "ch_1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        let mut params = Params::new();
        params.insert("amount".to_owned(), ParamValue::from(100));
        params.insert("currency".to_owned(), ParamValue::from("usd"));

        let (decoded, _) = requestor
            .request(Method::Post, "/v1/charges", &params, &credentials_for(&server))
            .await
            .unwrap_or_else(|err| panic!("backend {name}: {err}"));

        assert_eq!(decoded["id"], "ch_1", "backend {name}");
    }
}

#[tokio::test]
async fn empty_post_sends_zero_length_body() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .and(body_string(""))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        requestor
            .request(
                Method::Post,
                "/v1/customers",
                &Params::new(),
                &credentials_for(&server),
            )
            .await
            .unwrap_or_else(|err| panic!("backend {name}: {err}"));
    }
}

#[tokio::test]
async fn delete_sends_no_body() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/customers/cus_1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"deleted": true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        let (decoded, _) = requestor
            .request(
                Method::Delete,
                "/v1/customers/cus_1",
                &Params::new(),
                &credentials_for(&server),
            )
            .await
            .unwrap_or_else(|err| panic!("backend {name}: {err}"));
        assert_eq!(decoded["deleted"], true, "backend {name}");
    }
}

#[tokio::test]
async fn error_statuses_classify_identically_across_backends() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/charges/ch_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"error": {"message": "No such charge: ch_missing", "param": "id"}}"#,
            ))
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        let err = requestor
            .request(
                Method::Get,
                "/v1/charges/ch_missing",
                &Params::new(),
                &credentials_for(&server),
            )
            .await
            .unwrap_err();

        match err {
            ApiError::InvalidRequest { detail, param } => {
                assert_eq!(detail.http_status, Some(404), "backend {name}");
                assert_eq!(param.as_deref(), Some("id"), "backend {name}");
            }
            other => panic!("backend {name}: expected invalid request, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn card_decline_carries_request_id_from_headers() {
    for transport in backends() {
        let name = transport.name();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(
                ResponseTemplate::new(402)
                    .set_body_string(
                        r#"{"error": {"message": "Your card was declined.", "code": "card_declined"}}"#,
                    )
                    .insert_header("request-id", "req_77"),
            )
            .mount(&server)
            .await;

        let requestor = ApiRequestor::new(transport);
        let err = requestor
            .request(
                Method::Post,
                "/v1/charges",
                &Params::new(),
                &credentials_for(&server),
            )
            .await
            .unwrap_err();

        match err {
            ApiError::Card { detail, code, .. } => {
                assert_eq!(code.as_deref(), Some("card_declined"), "backend {name}");
                assert_eq!(detail.request_id.as_deref(), Some("req_77"), "backend {name}");
            }
            other => panic!("backend {name}: expected card error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn refused_connection_is_connection_kind() {
    for transport in backends() {
        let name = transport.name();
        let requestor = ApiRequestor::new(transport);
        // Port 1 is never listening locally.
        let credentials = Credentials::new("mk_test_123").with_api_base("http://127.0.0.1:1");

        let err = requestor
            .request(Method::Get, "/v1/charges", &Params::new(), &credentials)
            .await
            .unwrap_err();

        assert!(
            matches!(err, ApiError::Connection { .. }),
            "backend {name}: got {err:?}"
        );
    }
}

#[tokio::test]
async fn default_transport_prefers_the_pooled_backend() {
    let transport = monarc_http::default_transport();
    #[cfg(feature = "reqwest")]
    assert_eq!(transport.name(), "reqwest");
    #[cfg(not(feature = "reqwest"))]
    assert!(!transport.name().is_empty());
}
