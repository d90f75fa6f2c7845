use edgar13f::{Edgar, EdgarError};

#[tokio::test]
#[ignore]
async fn rate_limiting_and_backoff() {
    let edgar = Edgar::new("test_agent example@example.com").unwrap();
    let url = "https://www.sec.gov/Archives/edgar/daily-index/index.json";

    for i in 0..15 {
        match edgar.get(url).await {
            Ok(_) => {}
            Err(EdgarError::RateLimitExceeded) => {
                assert!(i > 5);
                break;
            }
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }
}

#[tokio::test]
#[ignore]
async fn missing_resource_is_not_found() {
    let edgar = Edgar::new("test_agent example@example.com").unwrap();
    let result = edgar
        .get("https://www.sec.gov/Archives/edgar/data/1/0000000000-00-000000.txt")
        .await;
    assert!(matches!(result, Err(EdgarError::NotFound)));
}
