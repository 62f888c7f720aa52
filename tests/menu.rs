mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn comment_author_comes_from_the_token() {
    let app = TestApp::spawn().await;
    let admin = app.login_as("root", "admin").await;
    let alice = app.login_as("alice", "user").await;
    let bob = app.login_as("bob", "user").await;
    let dish = app.create_dish(&admin, "Uthappizza").await;

    let (status, comment) = app
        .post(
            &format!("/api/dishes/{dish}/comments"),
            Some(&alice),
            json!({ "rating": 5, "comment": "Great", "author": "mallory" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"], "alice");
    let comment_id = comment["id"].as_str().unwrap().to_string();
    let comment_path = format!("/api/dishes/{dish}/comments/{comment_id}");

    let (status, _) = app
        .put(&comment_path, Some(&bob), json!({ "rating": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&comment_path, Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // a fresh token for the same identity keeps ownership
    let alice_again = app.login("alice").await;
    let (status, updated) = app
        .put(&comment_path, Some(&alice_again), json!({ "rating": 4 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 4);
    assert_eq!(updated["comment"], "Great");

    let (status, comments) = app.get(&format!("/api/dishes/{dish}/comments"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&comment_path, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&comment_path, Some(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admins_clear_comments_idempotently() {
    let app = TestApp::spawn().await;
    let admin = app.login_as("root", "admin").await;
    let alice = app.login_as("alice", "user").await;
    let dish = app.create_dish(&admin, "Vadonut").await;
    let path = format!("/api/dishes/{dish}/comments");

    app.post(&path, Some(&alice), json!({ "rating": 3, "comment": "ok" }))
        .await;

    let (status, _) = app.delete(&path, Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let (status, _) = app.delete(&path, Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, comments) = app.get(&path, None).await;
    assert_eq!(comments, json!([]));

    let (status, _) = app.get("/api/dishes/ghost/comments", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_behave_as_a_set() {
    let app = TestApp::spawn().await;
    let admin = app.login_as("root", "admin").await;
    let alice = app.login_as("alice", "user").await;
    let d1 = app.create_dish(&admin, "Uthappizza").await;
    let d2 = app.create_dish(&admin, "Zucchipakoda").await;
    let d3 = app.create_dish(&admin, "Vadonut").await;

    let (status, _) = app.get("/api/favorites", Some(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/favorites", Some(&alice), json!([d1, { "_id": d2 }]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, favorites) = app
        .post("/api/favorites", Some(&alice), json!([{ "id": d2 }, d3, d3]))
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut ids: Vec<String> = favorites["dishes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|dish| dish["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    let mut expected = vec![d1.clone(), d2.clone(), d3.clone()];
    expected.sort();
    assert_eq!(ids, expected);

    let (status, _) = app
        .post(&format!("/api/favorites/{d1}"), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, body) = app
        .post("/api/favorites/ghost", Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "dish not found");
    let (status, _) = app
        .post("/api/favorites", Some(&alice), json!(["ghost"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, favorites) = app
        .delete(&format!("/api/favorites/{d1}"), Some(&alice))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favorites["dishes"].as_array().unwrap().len(), 2);

    for _ in 0..2 {
        let (status, _) = app.delete("/api/favorites", Some(&alice)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app.get("/api/favorites", Some(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_only_leader_and_promotion_crud() {
    let app = TestApp::spawn().await;
    let admin = app.login_as("root", "admin").await;

    let (status, leader) = app
        .post(
            "/api/leaders",
            Some(&admin),
            json!({
                "name": "Peter Pan",
                "image": "images/alberto.png",
                "designation": "Chief Epicurious Officer",
                "abbr": "CEO",
                "description": "Our CEO"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(leader["featured"], false);
    let leader_path = format!("/api/leaders/{}", leader["id"].as_str().unwrap());

    let (status, updated) = app
        .put(&leader_path, Some(&admin), json!({ "featured": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["featured"], true);
    let (status, body) = app.delete(&leader_path, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "leader deleted");
    let (status, _) = app.get(&leader_path, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let promotion = json!({
        "name": "Weekend Grand Buffet",
        "image": "images/buffet.png",
        "label": "New",
        "price": 19.99,
        "description": "Featuring mouthwatering combinations"
    });
    let (status, _) = app
        .post("/api/promotions", Some(&admin), promotion.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post("/api/promotions", Some(&admin), promotion).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/promotions",
            Some(&admin),
            json!({
                "name": "Other",
                "image": "images/buffet.png",
                "label": "Hot",
                "price": 1.0,
                "description": "x"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
