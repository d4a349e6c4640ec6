use super::*;
use restock_watcher::scraper::{PageFetcher, PageSource};
use restock_watcher::AppError;
use wiremock::matchers::header_exists;

#[tokio::test]
async fn test_fetch_returns_markup() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/X1"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(IN_STOCK_PAGE))
        .expect(1)
        .mount(&env.retailer)
        .await;

    let fetcher = PageFetcher::new(&env.config(&["X1"]))?;
    let html = fetcher.fetch("X1").await?;

    assert!(html.contains("add-to-cart-button"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_retried() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/X1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&env.retailer)
        .await;
    env.serve_page("X1", IN_STOCK_PAGE).await;

    let fetcher = PageFetcher::new(&env.config(&["X1"]))?;
    let html = fetcher.fetch("X1").await?;

    assert!(html.contains("productTitle"));
    Ok(())
}

#[tokio::test]
async fn test_client_error_is_not_retried() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/X1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&env.retailer)
        .await;

    let fetcher = PageFetcher::new(&env.config(&["X1"]))?;
    let err = fetcher.fetch("X1").await.unwrap_err();

    assert!(matches!(err, AppError::HttpStatus { status: 404, .. }));
    Ok(())
}

#[tokio::test]
async fn test_retry_budget_is_bounded() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    let mut config = env.config(&["X1"]);
    config.scraper.retry.max_retries = 2;

    Mock::given(method("GET"))
        .and(path("/dp/X1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&env.retailer)
        .await;

    let fetcher = PageFetcher::new(&config)?;
    let err = fetcher.fetch("X1").await.unwrap_err();

    assert!(matches!(err, AppError::HttpStatus { status: 500, .. }));
    Ok(())
}
