use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};

mod support;
use support::TestServer;

async fn post_score(client: &reqwest::Client, server: &TestServer, body: Value) -> Result<StatusCode> {
    let response = client
        .post(server.url("/api/leaderboard"))
        .json(&body)
        .send()
        .await?;
    Ok(response.status())
}

#[tokio::test]
async fn test_saved_score_appears_in_top10() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    let status = post_score(&client, &server, json!({"name": "Ana", "score": 120, "level": 3})).await?;
    assert_eq!(status, StatusCode::CREATED);

    let body: Value = client
        .get(server.url("/api/leaderboard/top10"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["success"], true);
    let first = &body["leaderboard"][0];
    assert_eq!(first["name"], "Ana");
    assert_eq!(first["score"], 120);
    assert_eq!(first["level"], 3);
    assert_eq!(first["rank"], 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_score_leaves_file_unchanged() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    post_score(&client, &server, json!({"name": "Ana", "score": 120, "level": 3})).await?;
    let before = server.read_file();
    assert!(before.is_some());

    let response = client
        .post(server.url("/api/leaderboard"))
        .json(&json!({"name": "Luis", "level": 1}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], false);

    assert_eq!(server.read_file(), before);
    Ok(())
}

#[tokio::test]
async fn test_views_are_ranked_and_capped() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    for i in 0..12u32 {
        let status = post_score(
            &client,
            &server,
            json!({"name": format!("p{}", i), "score": i * 10, "level": 1}),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let top10: Value = client
        .get(server.url("/api/leaderboard/top10"))
        .send()
        .await?
        .json()
        .await?;
    let rows = top10["leaderboard"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["score"], 110);
    assert_eq!(rows[9]["score"], 20);
    assert_eq!(rows[9]["rank"], 10);

    let all: Value = client
        .get(server.url("/api/leaderboard"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all["leaderboard"].as_array().unwrap().len(), 12);

    // The stored document keeps everything
    let stored: Value = serde_json::from_str(&server.read_file().unwrap())?;
    assert_eq!(stored["leaderboard"].as_array().unwrap().len(), 12);
    assert_eq!(stored["version"], "1.0.0");
    assert!(stored["lastUpdated"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_stats() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    let empty: Value = client
        .get(server.url("/api/leaderboard/stats"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(empty["stats"]["totalScores"], 0);
    assert_eq!(empty["stats"]["averageScore"], 0);
    assert_eq!(empty["stats"]["highestScore"], 0);

    for (name, score) in [("ana", 100), ("ana", 50), ("luis", 30)] {
        post_score(&client, &server, json!({"name": name, "score": score, "level": 2})).await?;
    }

    let body: Value = client
        .get(server.url("/api/leaderboard/stats"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["success"], true);
    let stats = &body["stats"];
    assert_eq!(stats["totalScores"], 3);
    assert_eq!(stats["uniquePlayers"], 2);
    assert_eq!(stats["highestScore"], 100);
    assert_eq!(stats["averageScore"], 60);
    assert!(stats["lastUpdated"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_unknown_routes_are_not_found() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    for path in ["/api/leaderboard/top100", "/api/scores", "/"] {
        let response = client.get(server.url(path)).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: Value = response.json().await?;
        assert_eq!(body["error"], "Not found");
    }

    let response = client.delete(server.url("/api/leaderboard")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_records_do_not_wipe_the_document() -> Result<()> {
    let server = TestServer::direct().await?;
    server.write_file(
        r#"{
            "leaderboard": [
                {"name": "Ana", "score": 300, "level": 5, "date": "1/5/2024, 12:00:00"},
                {"name": "Bob", "score": "lots", "level": 1, "date": "2024-05-01T12:00:00Z"}
            ],
            "version": "1.0.0",
            "lastUpdated": "2024-05-01T12:00:00Z"
        }"#,
    )?;
    let client = reqwest::Client::new();

    let status = post_score(&client, &server, json!({"name": "Luis", "score": 80, "level": 2})).await?;
    assert_eq!(status, StatusCode::CREATED);

    let body: Value = client
        .get(server.url("/api/leaderboard/top10"))
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = body["leaderboard"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Ana", "Luis"]);
    Ok(())
}

#[tokio::test]
async fn test_plain_options_is_ok() -> Result<()> {
    let server = TestServer::direct().await?;
    let client = reqwest::Client::new();

    for path in ["/api/leaderboard", "/api/leaderboard/stats", "/nope"] {
        let response = client
            .request(reqwest::Method::OPTIONS, server.url(path))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}
