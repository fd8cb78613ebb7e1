use discbase_e2e_tests::{extend_url, launch_env, test_config};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

fn teebird() -> serde_json::Value {
    json!({
        "name": "Teebird",
        "category": 3,
        "brand": "Innova",
        "speed": 7, "glide": 5, "turn": -1, "fade": 1,
        "plastic": "Champion",
        "color": "Red",
        "weight": 175
    })
}

#[tokio::test]
#[traced_test]
async fn test_disc_lifecycle() {
    let (args, _config_guard) = test_config("test_disc_lifecycle").unwrap();
    let base_url = args.base_url.clone();

    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/discs").unwrap();

    // create
    let response = client
        .post(api_url.clone())
        .json(&teebird())
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);
    let location = response
        .headers()
        .get("location")
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string();
    let created: serde_json::Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert!(location.ends_with(&format!("/api/discs/{id}")));
    assert_eq!(created["flightNumbers"].as_str(), Some("7|5|-1|1"));
    assert_eq!(created["imagePositionX"].as_f64(), Some(50.0));
    assert_eq!(created["imagePositionY"].as_f64(), Some(50.0));
    assert_eq!(created["imageZoom"].as_f64(), Some(100.0));
    assert!(created["imagePath"].is_null());
    assert!(created["createdDate"].is_string());

    // get
    let record_url = extend_url(&api_url, id);
    let response = client.get(record_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let stored: serde_json::Value = response.json().await.unwrap();
    assert_eq!(stored["name"].as_str(), Some("Teebird"));
    assert_eq!(stored["category"].as_i64(), Some(3));

    // full update replaces fields, 204 without body
    let mut update = stored.clone();
    update["name"] = json!("Teebird3");
    update["weight"] = json!(168);
    let response = client
        .put(record_url.clone())
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert!(response.text().await.unwrap().is_empty());

    let updated: serde_json::Value = client
        .get(record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"].as_str(), Some("Teebird3"));
    assert_eq!(updated["weight"].as_i64(), Some(168));
    assert_eq!(updated["createdDate"], stored["createdDate"]);

    // id mismatch between path and body
    let response = client
        .put(extend_url(&api_url, id + 1))
        .json(&updated)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // update of a missing record
    let mut phantom = updated.clone();
    phantom["id"] = json!(9999);
    let response = client
        .put(extend_url(&api_url, 9999))
        .json(&phantom)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // delete
    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.delete(record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[traced_test]
async fn test_update_preserves_image_path() {
    let (args, _config_guard) = test_config("test_update_image_path").unwrap();
    let base_url = args.base_url.clone();
    let db_url = args.database_url();

    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/discs").unwrap();

    let response = client
        .post(api_url.clone())
        .json(&teebird())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    // point the record at an image directly in storage
    let pool = discbase_dal::new_pool(&db_url).await.unwrap();
    let repo = discbase_dal::disc::DiscRepository::new(pool);
    repo.set_image_path(id, "/images/disc_seed.png").await.unwrap();

    let record_url = extend_url(&api_url, id);
    let stored: serde_json::Value = client
        .get(record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["imagePath"].as_str(), Some("/images/disc_seed.png"));

    // an empty imagePath in the payload must not clobber the stored one
    let mut update = stored.clone();
    update["name"] = json!("Renamed");
    update["imagePath"] = json!("");
    let response = client
        .put(record_url.clone())
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let after: serde_json::Value = client
        .get(record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["name"].as_str(), Some("Renamed"));
    assert_eq!(after["imagePath"].as_str(), Some("/images/disc_seed.png"));

    // a non-empty one replaces it
    let mut update = after.clone();
    update["imagePath"] = json!("/images/disc_other.png");
    let response = client
        .put(record_url.clone())
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let after: serde_json::Value = client
        .get(record_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["imagePath"].as_str(), Some("/images/disc_other.png"));

    // the referenced file never existed - deletion still removes the record
    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
    let response = client.get(record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[traced_test]
async fn test_listing_and_filtering() {
    let (args, _config_guard) = test_config("test_listing").unwrap();
    let base_url = args.base_url.clone();

    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/discs").unwrap();

    let discs = [
        ("Wraith", 4),
        ("Aviar", 1),
        ("Buzzz", 2),
        ("Teebird", 3),
        ("Zone", 1),
        ("Destroyer", 4),
    ];
    for (name, category) in discs {
        let payload = json!({"name": name, "category": category, "speed": 7, "glide": 5, "turn": -1, "fade": 1});
        let response = client
            .post(api_url.clone())
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    // category rank first, name second
    let response = client.get(api_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let all: Vec<serde_json::Value> = response.json().await.unwrap();
    let names: Vec<&str> = all.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["Aviar", "Zone", "Buzzz", "Teebird", "Destroyer", "Wraith"]
    );

    // filtered by ordinal
    let response = client
        .get(base_url.join("api/discs/category/1").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let putters: Vec<serde_json::Value> = response.json().await.unwrap();
    let names: Vec<&str> = putters.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Aviar", "Zone"]);

    // filtered by name, case-insensitive
    let response = client
        .get(base_url.join("api/discs/category/driver").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let drivers: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(drivers.len(), 2);

    // unknown category
    let response = client
        .get(base_url.join("api/discs/category/frisbee").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[traced_test]
async fn test_validation_reports_fields() {
    let (args, _config_guard) = test_config("test_validation").unwrap();
    let base_url = args.base_url.clone();

    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/discs").unwrap();

    // empty name fails the length bound
    let payload = json!({"name": "", "category": 1});
    let response = client
        .post(api_url.clone())
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    let errors = body["errors"].as_array().expect("field error list");
    assert!(
        errors
            .iter()
            .any(|e| e["field"].as_str() == Some("name") && e["message"].is_string())
    );

    // over-long brand
    let payload = json!({"name": "Teebird", "category": 1, "brand": "x".repeat(51)});
    let response = client.post(api_url).json(&payload).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
