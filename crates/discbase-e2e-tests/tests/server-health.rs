use discbase_e2e_tests::{launch_env, test_config};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard) = test_config("test_health").unwrap();

    let (client, base_url) = launch_env(args).await.unwrap();

    let response = client
        .get(base_url.join("health").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}
