use std::time::Duration;

use vnpay_types::RefundTransactionType;

use crate::{
    GatewayConfig, GatewayError, QueryDrRequest, RefundRequest, TransportError, ValidationError,
    VnpayClient, client::tests::SECRET,
};


use mock_gateway::{MockGateway, Mode};

fn client_for(gateway: &MockGateway) -> VnpayClient {
    VnpayClient::new(
        GatewayConfig::new("TESTTMN1", SECRET)
            .with_host(&gateway.base_url)
            .with_locale("en")
            .with_timeout(Duration::from_millis(500)),
    )
    .unwrap()
}

fn query_request() -> QueryDrRequest {
    QueryDrRequest::new("ORDER1", "20250101120000", "Query ORDER1", "127.0.0.1")
}

fn refund_request() -> RefundRequest {
    RefundRequest::new(
        "ORDER1",
        50_000,
        RefundTransactionType::PartialRefund,
        "20250101120000",
        "admin",
        "Refund ORDER1",
        "127.0.0.1",
    )
    .with_transaction_no("14123456")
}

#[tokio::test]
async fn test_query_dr_verified() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let result = client_for(&gateway).query_dr(&query_request()).await.unwrap();

    assert!(result.transport_ok);
    assert!(result.signature_present);
    assert!(result.signature_verified);
    assert!(result.business_success);
    assert!(result.transaction_succeeded());
    assert_eq!(result.response_code.as_deref(), Some("00"));
    assert_eq!(result.amount, Some(100_000));
    assert_eq!(result.message, "Request successful");

    let sent = gateway.transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["vnp_Command"], "querydr");
    assert_eq!(sent[0]["vnp_TmnCode"], "TESTTMN1");
    assert_eq!(sent[0]["vnp_Version"], "2.1.0");
}

#[tokio::test]
async fn test_refund_verified() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let result = client_for(&gateway).refund(&refund_request()).await.unwrap();

    assert!(result.signature_verified);
    assert!(result.is_success());
    assert_eq!(result.amount, Some(50_000));
    assert_eq!(result.transaction_type.as_deref(), Some("03"));

    let sent = gateway.transactions();
    assert_eq!(sent[0]["vnp_Amount"], 5_000_000);
    assert_eq!(sent[0]["vnp_TransactionType"], "03");
    assert_eq!(sent[0]["vnp_CreateBy"], "admin");
}

#[tokio::test]
async fn test_refund_message_uses_request_locale() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let result = client_for(&gateway)
        .refund(&refund_request().with_locale(vnpay_types::Locale::Vn))
        .await
        .unwrap();
    assert_eq!(result.message, "Yêu cầu thành công");
}

#[tokio::test]
async fn test_bad_response_hash_overrides_message() {
    let gateway = MockGateway::start(Mode::BadHash).await;
    let result = client_for(&gateway).query_dr(&query_request()).await.unwrap();

    assert!(result.signature_present);
    assert!(!result.signature_verified);
    // The gateway said 00, but nothing proves it did
    assert_eq!(result.response_code.as_deref(), Some("00"));
    assert!(!result.is_success());
    assert!(!result.transaction_succeeded());
    assert_eq!(result.message, "Wrong checksum");
}

#[tokio::test]
async fn test_missing_response_hash() {
    let gateway = MockGateway::start(Mode::NoHash).await;
    let result = client_for(&gateway).refund(&refund_request()).await.unwrap();

    assert!(!result.signature_present);
    assert!(!result.signature_verified);
    assert!(!result.is_success());
    assert_eq!(result.message, "Request successful");
}

#[tokio::test]
async fn test_gateway_rejects_request_signed_with_other_secret() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let client = VnpayClient::new(
        GatewayConfig::new("TESTTMN1", "WRONGSECRET")
            .with_host(&gateway.base_url)
            .with_locale("en"),
    )
    .unwrap();
    let result = client.query_dr(&query_request()).await.unwrap();

    assert_eq!(result.response_code.as_deref(), Some("97"));
    assert!(!result.business_success);
    // Signed by the mock with the real secret, so it fails locally too
    assert!(!result.signature_verified);
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let gateway = MockGateway::start(Mode::ServerError).await;
    let err = client_for(&gateway).query_dr(&query_request()).await.unwrap_err();

    assert!(err.is_retryable());
    match err {
        GatewayError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let gateway = MockGateway::start(Mode::NotJson).await;
    let err = client_for(&gateway).refund(&refund_request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Protocol(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_validation_happens_before_network() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let mut request = refund_request();
    request.amount = 0;

    let err = client_for(&gateway).refund(&request).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::InvalidAmount(_))
    ));
    assert!(gateway.transactions().is_empty());
}

#[tokio::test]
async fn test_timeout() {
    let gateway = MockGateway::start(Mode::Slow).await;
    let err = client_for(&gateway).query_dr(&query_request()).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::Timeout)
    ));
}

#[tokio::test]
async fn test_cancel() {
    let gateway = MockGateway::start(Mode::Slow).await;
    let err = client_for(&gateway)
        .refund_with_cancel(
            &refund_request(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::Cancelled)
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = VnpayClient::new(
        GatewayConfig::new("TESTTMN1", SECRET).with_host(format!("http://{}", addr)),
    )
    .unwrap();
    let err = client.query_dr(&query_request()).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::Connection(_))
    ));
}

#[tokio::test]
async fn test_bank_list() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let banks = client_for(&gateway).get_bank_list().await.unwrap();

    assert_eq!(banks.len(), 2);
    assert_eq!(banks[0].bank_code, "NCB");
    assert_eq!(
        banks[0].logo_link,
        format!("{}/images/bank/ncb.png", gateway.base_url)
    );
    assert_eq!(banks[1].logo_link, "https://cdn.example/vnpayqr.png");
    assert_eq!(banks[1].display_order, 2);

    let forms = gateway.bank_list_forms();
    assert_eq!(forms[0]["tmn_code"], "TESTTMN1");
}

#[tokio::test]
async fn test_bank_list_errors() {
    let gateway = MockGateway::start(Mode::ServerError).await;
    let err = client_for(&gateway).get_bank_list().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::Status { status: 500, .. })
    ));

    let gateway = MockGateway::start(Mode::NotJson).await;
    let err = client_for(&gateway).get_bank_list().await.unwrap_err();
    assert!(matches!(err, GatewayError::Protocol(_)));
}

#[tokio::test]
async fn test_client_is_shareable_across_tasks() {
    let gateway = MockGateway::start(Mode::Valid).await;
    let client = client_for(&gateway);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .query_dr(&QueryDrRequest::new(
                        format!("ORDER{}", i),
                        "20250101120000",
                        "Query",
                        "127.0.0.1",
                    ))
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().signature_verified);
    }
    assert_eq!(gateway.transactions().len(), 4);
}
