//! The process-wide client. Kept in its own test binary since `init` can
//! only succeed once per process.

use mockito::Server;
use term_librato::prelude::*;

#[tokio::test]
async fn test_init_and_free_functions() {
    let expected = LibratoError::Uninitialized { component: "client" };
    assert_eq!(term_librato::global_client().err(), Some(expected.clone()));
    assert_eq!(term_librato::send_metrics(Vec::new()).await, vec![expected]);

    let mut server = Server::new_async().await;
    let metrics = server
        .mock("POST", "/v1/metrics/")
        .with_status(200)
        .create_async()
        .await;
    let annotation = server
        .mock("POST", "/v1/annotations/deploys")
        .with_status(201)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/v1/annotations/deploys")
        .with_status(204)
        .create_async()
        .await;

    let config = LibratoConfig::new("ops@example.com", "s3cr3t").with_endpoint(server.url());
    term_librato::init(config.clone()).unwrap();
    assert!(matches!(
        term_librato::init(config),
        Err(LibratoError::Configuration { .. })
    ));

    assert!(term_librato::send_metrics(vec![Gauge::new("g", 1).into()])
        .await
        .is_empty());
    assert!(
        term_librato::add_annotation("deploys", &Annotation::new("v1"))
            .await
            .is_empty()
    );
    assert_eq!(
        term_librato::add_annotation("", &Annotation::new("v1")).await,
        vec![LibratoError::EmptyStreamName]
    );
    assert!(term_librato::delete_annotation_stream("deploys")
        .await
        .is_empty());

    metrics.assert_async().await;
    annotation.assert_async().await;
    delete.assert_async().await;
}
