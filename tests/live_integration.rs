use melonly_http::{MelonlyClient, MelonlyError, Pagination};

#[tokio::test]
async fn live_server_info_and_roles() {
    if std::env::var("MELONLY_TOKEN").is_err() {
        eprintln!("skipping live test: MELONLY_TOKEN is not set");
        return;
    }

    let client = MelonlyClient::from_env().expect("live configuration must be valid");

    let info = client
        .get_server_info()
        .await
        .expect("server info must load");
    assert!(!info.id.is_empty());

    match client.get_roles(Pagination::new(1, 1)).await {
        Ok(page) => assert!(page.data.len() <= 1),
        // Throttling is a legitimate answer for a shared live token.
        Err(MelonlyError::RateLimit { .. }) => {}
        Err(other) => panic!("roles request failed: {other}"),
    }
}
