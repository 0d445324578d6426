/// Integration tests for the Levelboard API
///
/// Drive the full router (auth layer, handlers, error mapping) over the
/// in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use common::{access_token, TestContext};
use levelboard_shared::auth::jwt::validate_access_token;
use levelboard_shared::models::user::UserRole;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_signup_and_login() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/signup",
            None,
            json!({ "username": "grace", "email": "grace@example.com", "password": "compiler1952" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["points"], 0);
    assert_eq!(body["user"]["level"], 1);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["token_type"], "Bearer");

    let (status, body) = ctx
        .post("/login", None, json!({ "username": "grace", "password": "compiler1952" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let claims = validate_access_token(body["access_token"].as_str().unwrap(), &ctx.config.jwt.secret).unwrap();
    assert_eq!(claims.role, UserRole::User);

    let (status, _) = ctx
        .post("/login", None, json!({ "email": "grace@example.com", "password": "compiler1952" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .post("/login", None, json!({ "username": "grace", "password": "wrong-password1" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejections() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post("/signup", None, json!({ "username": "ada", "email": "other@example.com", "password": "marathon42" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already taken");

    let (status, body) = ctx
        .post("/signup", None, json!({ "username": "bob", "email": "bob@example.com", "password": "short" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");

    let (status, _) = ctx
        .post("/signup", None, json!({ "username": "bob", "email": "not-an-email", "password": "marathon42" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_add_points_requires_admin() {
    let ctx = TestContext::new().await;
    let uri = format!("/users/{}/addPoints", ctx.user.id);

    let (status, _) = ctx.post(&uri, None, json!({ "points": 10 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.post(&uri, Some(&ctx.user_token), json!({ "points": 10 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(ctx.points_of(ctx.user.id).await, 0);

    let (status, body) = ctx.post(&uri, Some(&ctx.admin_token), json!({ "points": 60 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total_points": 60, "level": 2 }));

    let (status, body) = ctx.post(&uri, Some(&ctx.admin_token), json!({ "points": -100 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total_points": -40, "level": 1 }));
}

#[tokio::test]
async fn test_add_points_overflow_is_bad_request() {
    let ctx = TestContext::new().await;
    let uri = format!("/users/{}/addPoints", ctx.user.id);

    let (status, _) = ctx.post(&uri, Some(&ctx.admin_token), json!({ "points": i64::MAX })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.post(&uri, Some(&ctx.admin_token), json!({ "points": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(ctx.points_of(ctx.user.id).await, i64::MAX);
}

#[tokio::test]
async fn test_demoted_admin_token_loses_admin_routes() {
    let ctx = TestContext::new().await;
    assert!(ctx.store.update_user_role(ctx.admin.id, UserRole::User).await.unwrap());

    let (status, _) = ctx
        .post(
            &format!("/users/{}/addPoints", ctx.user.id),
            Some(&ctx.admin_token),
            json!({ "points": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(ctx.points_of(ctx.user.id).await, 0);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/users/{}", ctx.user.id), Some(&ctx.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post("/classifications", Some(&ctx.admin_token), json!({ "name": "Cycling" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_points_unknown_user() {
    let ctx = TestContext::new().await;
    let uri = format!("/users/{}/addPoints", uuid::Uuid::new_v4());

    let (status, _) = ctx.post(&uri, Some(&ctx.admin_token), json!({ "points": 5 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_action_like() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            &format!("/users/{}/addAction", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "action": "like" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["points_awarded"], 5);
    assert_eq!(body["total_points"], 5);
    assert_eq!(body["level"], 1);
    assert_eq!(body["action"]["action"], "like");

    let (status, body) = ctx.get(&format!("/users/{}/actions", ctx.user.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["points"], 5);
}

#[tokio::test]
async fn test_add_action_unknown_changes_nothing() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            &format!("/users/{}/addAction", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "action": "dance" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    assert_eq!(ctx.points_of(ctx.user.id).await, 0);
    let (_, body) = ctx.get(&format!("/users/{}/actions", ctx.user.id)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_action_for_other_user_forbidden() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            &format!("/users/{}/addAction", ctx.admin.id),
            Some(&ctx.user_token),
            json!({ "action": "like" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins may act for anyone
    let (status, _) = ctx
        .post(
            &format!("/users/{}/addAction", ctx.user.id),
            Some(&ctx.admin_token),
            json!({ "action": "share" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.points_of(ctx.user.id).await, 15);
}

#[tokio::test]
async fn test_stat_submission_and_standing() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            &format!("/users/{}/subscribe", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "classification_id": ctx.running.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .post(
            &format!("/users/{}/stats", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "classification": "Running", "title": "5k", "value": 5.2, "category": "distance" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["points_awarded"], 20);
    assert_eq!(body["total_points"], 20);
    assert_eq!(body["stat"]["classification_id"], json!(ctx.running.id));
    assert_eq!(body["standing"], json!({ "value": 5.2, "position": 1, "total_participants": 1 }));

    let (status, body) = ctx.get(&format!("/users/{}/classifications", ctx.user.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["classification"], "Running");
    assert_eq!(body[0]["position"], 1);
    assert_eq!(body[0]["total_users"], 1);

    let (_, body) = ctx.get(&format!("/users/{}/actions", ctx.user.id)).await;
    assert_eq!(body[0]["action"], "new_stat");
    assert_eq!(body[0]["classification_id"], json!(ctx.running.id));

    let (status, body) = ctx.get("/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stat_unknown_classification() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            &format!("/users/{}/stats", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "classification": "Cycling", "title": "Commute", "value": 12.0, "category": "distance" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.points_of(ctx.user.id).await, 0);
}

#[tokio::test]
async fn test_subscribe_twice_conflicts() {
    let ctx = TestContext::new().await;
    let uri = format!("/users/{}/subscribe", ctx.user.id);
    let body = json!({ "classification_id": ctx.running.id });

    let (status, response) = ctx.post(&uri, Some(&ctx.user_token), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["status"], "subscribed");

    let (status, _) = ctx.post(&uri, Some(&ctx.user_token), body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, profile) = ctx.get(&format!("/users/{}/profile", ctx.user.id)).await;
    assert_eq!(profile["total_classifications"], 1);
}

#[tokio::test]
async fn test_subscribe_unknown_classification() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            &format!("/users/{}/subscribe", ctx.user.id),
            Some(&ctx.user_token),
            json!({ "classification_id": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top3() {
    let ctx = TestContext::new().await;

    for (username, points) in [("ben", 30), ("cleo", 90), ("dan", 10)] {
        let (status, body) = ctx
            .post(
                "/signup",
                None,
                json!({ "username": username, "email": format!("{}@example.com", username), "password": "marathon42" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["user"]["id"].as_str().unwrap().to_string();
        let (status, _) = ctx
            .post(&format!("/users/{}/addPoints", id), Some(&ctx.admin_token), json!({ "points": points }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx.get("/leaderboard/top3").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cleo", "ben", "dan"]);
    assert_eq!(body[0]["level"], 2);
}

#[tokio::test]
async fn test_classification_views() {
    let ctx = TestContext::new().await;

    ctx.post(
        &format!("/users/{}/subscribe", ctx.user.id),
        Some(&ctx.user_token),
        json!({ "classification_id": ctx.running.id }),
    )
    .await;
    ctx.post(
        &format!("/users/{}/stats", ctx.user.id),
        Some(&ctx.user_token),
        json!({ "classification": "Running", "title": "10k", "value": 10.0, "category": "distance" }),
    )
    .await;

    let (status, body) = ctx.get("/classifications/popular").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Running");
    assert_eq!(body[0]["subscribers"], 1);
    assert_eq!(body[0]["top_user"]["username"], "ada");

    let (status, body) = ctx.get(&format!("/classifications/{}/details", ctx.running.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Distance run, in km");
    assert_eq!(body["ranking"][0]["position"], 1);
    assert_eq!(body["ranking"][0]["total_value"], 10.0);

    let (status, _) = ctx
        .get(&format!("/classifications/{}/details", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_classification() {
    let ctx = TestContext::new().await;
    let body = json!({ "name": "Cycling", "description": "Distance ridden" });

    let (status, _) = ctx.post("/classifications", Some(&ctx.user_token), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = ctx.post("/classifications", Some(&ctx.admin_token), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Cycling");

    let (status, _) = ctx.post("/classifications", Some(&ctx.admin_token), body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_profile() {
    let ctx = TestContext::new().await;

    ctx.post(
        &format!("/users/{}/addAction", ctx.user.id),
        Some(&ctx.user_token),
        json!({ "action": "comment" }),
    )
    .await;

    let (status, body) = ctx.get(&format!("/users/{}/profile", ctx.user.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["points"], 10);
    assert_eq!(body["total_actions"], 1);
    assert_eq!(body["progress"]["level"], 1);
    assert_eq!(body["progress"]["points_to_next"], 40);
}

#[tokio::test]
async fn test_change_role_then_refresh() {
    let ctx = TestContext::new().await;

    let (_, tokens) = ctx
        .post(
            "/signup",
            None,
            json!({ "username": "eve", "email": "eve@example.com", "password": "marathon42" }),
        )
        .await;
    let eve_id = tokens["user"]["id"].as_str().unwrap().to_string();
    let refresh_token = tokens["refresh_token"].clone();

    let (status, _) = ctx
        .post(&format!("/users/{}/role", eve_id), Some(&ctx.user_token), json!({ "role": "admin" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post(&format!("/users/{}/role", eve_id), Some(&ctx.admin_token), json!({ "role": "wizard" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(&format!("/users/{}/role", eve_id), Some(&ctx.admin_token), json!({ "role": "admin" }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx.post("/refresh", None, json!({ "refresh_token": refresh_token })).await;
    assert_eq!(status, StatusCode::OK);

    let claims = validate_access_token(body["access_token"].as_str().unwrap(), &ctx.config.jwt.secret).unwrap();
    assert_eq!(claims.role, UserRole::Admin);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post("/refresh", None, json!({ "refresh_token": ctx.user_token }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_user() {
    let ctx = TestContext::new().await;
    let uri = format!("/users/{}", ctx.user.id);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&ctx.user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&ctx.admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&format!("/users/{}/profile", ctx.user.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&ctx.admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Tokens of a deleted user still pass the auth layer but find nothing
    let ghost = access_token(ctx.user.id, UserRole::User);
    let (status, _) = ctx
        .post(&format!("/users/{}/addAction", ctx.user.id), Some(&ghost), json!({ "action": "like" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_users_hides_password_hash() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/users").await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_malformed_bearer_token() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            &format!("/users/{}/addAction", ctx.user.id),
            Some("not.a.jwt"),
            json!({ "action": "like" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
