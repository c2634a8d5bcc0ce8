// tests/profile_tests.rs

use std::sync::Arc;

use aayush_tracker::{config::Config, notify::NoopMailer, routes, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;

async fn spawn_app() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "profile_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        base_url: "http://localhost:3000".to_string(),
        mail_api_url: None,
        mail_api_key: None,
        mail_from: None,
    };

    let state = AppState {
        pool,
        config,
        notifier: Arc::new(NoopMailer),
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn make_user(address: &str, client: &reqwest::Client, name: &str) -> String {
    let email = format!("{}_{}@example.com", name, &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
        .send()
        .await
        .unwrap();

    let login = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    login["token"].as_str().unwrap().to_string()
}

async fn submit(
    address: &str,
    client: &reqwest::Client,
    token: &str,
    status: &str,
    time_taken: Option<&str>,
    reason: &str,
) {
    let mut body = serde_json::json!({
        "name": "Aayush",
        "date": "2024-03-15",
        "reason": reason,
        "aayush_status": status,
    });
    if let Some(t) = time_taken {
        body["time_taken"] = serde_json::json!(t);
    }
    if status == "no" {
        body["reason_not_coming"] = serde_json::json!("busy");
    }

    let response = client
        .post(format!("{}/api/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn user_stats_reflect_submissions() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = make_user(&address, &client, "caller").await;

    submit(&address, &client, &token, "yes", Some("immediately(2-5 mins)"), "chai").await;
    submit(&address, &client, &token, "yes", Some("5-15 mins"), "chai").await;
    submit(&address, &client, &token, "no", None, "maggi").await;
    submit(&address, &client, &token, "hehehe bhai", None, "mood").await;

    let body = client
        .get(format!("{}/api/user/stats", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["name"], "caller");
    assert!(body["user"]["memberSince"].is_string());

    let stats = &body["stats"];
    assert_eq!(stats["totalCalls"], 4);
    assert_eq!(stats["yesCalls"], 2);
    assert_eq!(stats["noCalls"], 1);
    assert_eq!(stats["heheheBhaiCalls"], 1);
    // 2/4
    assert_eq!(stats["successRate"], 50.0);
    // (3.5 + 10) / 2
    assert_eq!(stats["avgResponseTime"], 6.8);
    assert_eq!(stats["fastestResponse"], "2-5 mins");
    assert_eq!(stats["slowestResponse"], "5-15 mins");
    assert_eq!(stats["mostCommonReason"], "chai");
    // 2*5 + 1*10 + 1*50
    assert_eq!(stats["pareshaaniPoints"], 70);

    let recent = body["recentSubmissions"].as_array().unwrap();
    assert_eq!(recent.len(), 4);
    // Newest first.
    assert_eq!(recent[0]["status"], "hehehe bhai");
}

#[tokio::test]
async fn stats_for_fresh_user_are_all_zero() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = make_user(&address, &client, "fresh").await;

    let body = client
        .get(format!("{}/api/user/stats", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let stats = &body["stats"];
    assert_eq!(stats["totalCalls"], 0);
    assert_eq!(stats["successRate"], 0.0);
    assert!(stats["avgResponseTime"].is_null());
    assert!(stats["fastestResponse"].is_null());
    assert!(stats["mostCommonReason"].is_null());
    assert_eq!(stats["pareshaaniPoints"], 0);
    assert_eq!(body["recentSubmissions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn leaderboard_filters_and_ranks() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // User A: 2 calls, both yes, a perfect rate but below the 3-call bar.
    let token_a = make_user(&address, &client, "usera").await;
    submit(&address, &client, &token_a, "yes", Some("immediately(2-5 mins)"), "chai").await;
    submit(&address, &client, &token_a, "yes", Some("immediately(2-5 mins)"), "chai").await;

    // User B: 4 calls, 2 yes, eligible for the success board.
    let token_b = make_user(&address, &client, "userb").await;
    submit(&address, &client, &token_b, "yes", Some("more than 15 mins"), "chai").await;
    submit(&address, &client, &token_b, "yes", Some("more than 15 mins"), "chai").await;
    submit(&address, &client, &token_b, "no", None, "maggi").await;
    submit(&address, &client, &token_b, "hehehe bhai", None, "mood").await;

    let body = client
        .get(format!("{}/api/leaderboard", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    assert_eq!(body["success"], true);

    let overall = &body["overall"];
    assert_eq!(overall["totalUsers"], 2);
    assert_eq!(overall["totalResponses"], 6);
    assert_eq!(overall["totalYes"], 4);
    assert_eq!(overall["totalNo"], 1);
    assert_eq!(overall["totalHehehe"], 1);
    // 4/6 = 66.66..%
    assert_eq!(overall["overallSuccessRate"], 66.7);

    let boards = &body["leaderboards"];

    // Most calls: B (4) over A (2).
    assert_eq!(boards["mostCalls"][0]["userName"], "userb");
    assert_eq!(boards["mostCalls"][0]["totalCalls"], 4);

    // A's 100% rate does not count with fewer than 3 calls.
    let successful = boards["mostSuccessful"].as_array().unwrap();
    assert_eq!(successful.len(), 1);
    assert_eq!(successful[0]["userName"], "userb");
    assert_eq!(successful[0]["successRate"], 50.0);

    // Fastest average wins the ascending board.
    let fastest = boards["fastestResponse"].as_array().unwrap();
    assert_eq!(fastest.len(), 2);
    assert_eq!(fastest[0]["userName"], "usera");
    assert_eq!(fastest[0]["avgResponseTime"], 3.5);
    assert_eq!(fastest[1]["avgResponseTime"], 20.0);

    // Pareshaani: B has 2*5 + 10 + 50 = 70, A has 10.
    assert_eq!(boards["highestPareshaani"][0]["userName"], "userb");
    assert_eq!(boards["highestPareshaani"][0]["pareshaaniPoints"], 70);
    assert_eq!(boards["mostHeheheBhai"][0]["userName"], "userb");
    assert_eq!(boards["mostRejected"][0]["userName"], "userb");
}
