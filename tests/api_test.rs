//! HTTP-level API tests

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::database::setup_test_database;
use common::fixtures::*;
use foodgram::middleware::ClientCtx;
use serde_json::{json, Value};

macro_rules! init_app {
    ($db:expr, $storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new($storage.clone()))
                .app_data(foodgram::web::json_config())
                .app_data(foodgram::web::query_config())
                .wrap(ClientCtx::default())
                .configure(foodgram::web::configure),
        )
        .await
    };
}

fn token_header(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Token {}", token))
}

#[actix_rt::test]
async fn test_register_login_and_me() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .set_json(json!({
            "email": "Chef@Example.com",
            "username": "chef",
            "first_name": "Gordon",
            "last_name": "Ramsay",
            "password": "kitchen-nightmares"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "chef");
    assert_eq!(body["email"], "chef@example.com");
    assert!(body.get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/token/login/")
        .set_json(json!({ "email": "chef@example.com", "password": "kitchen-nightmares" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let token = body["auth_token"].as_str().unwrap().to_owned();
    assert_eq!(token.len(), 40);

    let req = test::TestRequest::get()
        .uri("/api/users/me/")
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "chef");
    assert_eq!(body["is_subscribed"], false);
    assert_eq!(body["avatar"], Value::Null);

    // Logging in again returns the same token
    let req = test::TestRequest::post()
        .uri("/api/auth/token/login/")
        .set_json(json!({ "email": "chef@example.com", "password": "kitchen-nightmares" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["auth_token"], token.as_str());
}

#[actix_rt::test]
async fn test_registration_rejects_duplicates_and_reserved_name() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    create_test_user(&db, "taken", "password123").await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .set_json(json!({
            "email": "new@test.com",
            "username": "taken",
            "first_name": "A",
            "last_name": "B",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("username").is_some());

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .set_json(json!({
            "email": "me@test.com",
            "username": "me",
            "first_name": "A",
            "last_name": "B",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_authentication_failures() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let user = create_test_user(&db, "chef", "password123").await.unwrap();
    let app = init_app!(db, storage);

    // Anonymous
    let req = test::TestRequest::get().uri("/api/users/me/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown token
    let req = test::TestRequest::get()
        .uri("/api/users/me/")
        .insert_header(token_header("0123456789012345678901234567890123456789"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong password
    let req = test::TestRequest::post()
        .uri("/api/auth/token/login/")
        .set_json(json!({ "email": user.email, "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("non_field_errors").is_some());

    // Malformed JSON
    let req = test::TestRequest::post()
        .uri("/api/auth/token/login/")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_logout_revokes_token() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let user = create_test_user(&db, "chef", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, user.id).await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri("/api/auth/token/logout/")
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/users/me/")
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_set_password_requires_current_password() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let user = create_test_user(&db, "chef", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, user.id).await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri("/api/users/set_password/")
        .insert_header(token_header(&token))
        .set_json(json!({ "current_password": "not-it", "new_password": "new-password-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("current_password").is_some());

    let req = test::TestRequest::post()
        .uri("/api/users/set_password/")
        .insert_header(token_header(&token))
        .set_json(json!({ "current_password": "password123", "new_password": "new-password-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri("/api/auth/token/login/")
        .set_json(json!({ "email": user.email, "password": "new-password-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_recipe_lifecycle_over_http() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let author = create_test_user(&db, "chef", "password123").await.unwrap();
    let other = create_test_user(&db, "critic", "password123").await.unwrap();
    let author_token = foodgram::auth::issue_token(&db, author.id).await.unwrap();
    let other_token = foodgram::auth::issue_token(&db, other.id).await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let eggs = create_test_ingredient(&db, "eggs", "pcs").await.unwrap();
    let breakfast = create_test_tag(&db, "Breakfast", "breakfast").await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(token_header(&author_token))
        .set_json(json!({
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 20,
            "image": PNG_DATA_URI,
            "ingredients": [{ "id": flour.id, "amount": 200 }, { "id": eggs.id, "amount": 2 }],
            "tags": [breakfast.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let recipe_id = body["id"].as_i64().unwrap();
    assert_eq!(body["author"]["username"], "chef");
    assert_eq!(body["ingredients"][0]["name"], "flour");
    assert_eq!(body["ingredients"][0]["amount"], 200);
    assert_eq!(body["tags"][0]["slug"], "breakfast");
    assert_eq!(body["is_favorited"], false);
    let image_url = body["image"].as_str().unwrap().to_owned();

    // The image is served from the media route
    let image_path = image_url.trim_start_matches("http://localhost:8080");
    let req = test::TestRequest::get().uri(image_path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");

    // Anonymous list
    let req = test::TestRequest::get().uri("/api/recipes/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["results"][0]["id"], recipe_id);

    // Non-author update is forbidden
    let req = test::TestRequest::patch()
        .uri(&format!("/api/recipes/{}/", recipe_id))
        .insert_header(token_header(&other_token))
        .set_json(json!({
            "name": "Stolen",
            "text": "Mine now.",
            "cooking_time": 5,
            "ingredients": [{ "id": flour.id, "amount": 1 }],
            "tags": [breakfast.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Duplicate ingredient on update is a validation error
    let req = test::TestRequest::patch()
        .uri(&format!("/api/recipes/{}/", recipe_id))
        .insert_header(token_header(&author_token))
        .set_json(json!({
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 20,
            "ingredients": [{ "id": flour.id, "amount": 1 }, { "id": flour.id, "amount": 2 }],
            "tags": [breakfast.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("ingredients").is_some());

    // Favorite, then filter by it
    let req = test::TestRequest::post()
        .uri(&format!("/api/recipes/{}/favorite/", recipe_id))
        .insert_header(token_header(&other_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["cooking_time"], 20);

    let req = test::TestRequest::get()
        .uri("/api/recipes/?is_favorited=1")
        .insert_header(token_header(&other_token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["is_favorited"], true);

    let req = test::TestRequest::get()
        .uri("/api/recipes/?is_favorited=1")
        .insert_header(token_header(&author_token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 0);

    let req = test::TestRequest::get()
        .uri("/api/recipes/?tags=lunch")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 0);

    // Author deletes
    let req = test::TestRequest::delete()
        .uri(&format!("/api/recipes/{}/", recipe_id))
        .insert_header(token_header(&author_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/recipes/{}/", recipe_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_recipe_pagination_links() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let author = create_test_user(&db, "chef", "password123").await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let tag = create_test_tag(&db, "Baking", "baking").await.unwrap();
    for i in 0..5 {
        create_test_recipe(&db, author.id, &format!("Bread {}", i), &[(flour.id, 100)], &[tag.id])
            .await
            .unwrap();
    }
    let app = init_app!(db, storage);

    let req = test::TestRequest::get()
        .uri("/api/recipes/?limit=2&offset=2&tags=baking")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 5);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    let next = body["next"].as_str().unwrap();
    assert!(next.contains("limit=2"));
    assert!(next.contains("offset=4"));
    assert!(next.contains("tags=baking"));
    let previous = body["previous"].as_str().unwrap();
    assert!(!previous.contains("offset"));
}

#[actix_rt::test]
async fn test_malformed_window_parameters() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let reader = create_test_user(&db, "reader", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, reader.id).await.unwrap();
    let app = init_app!(db, storage);

    for uri in [
        "/api/recipes/?limit=abc",
        "/api/users/?offset=-1",
        "/api/users/subscriptions/?recipes_limit=many",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(token_header(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["non_field_errors"].is_array(), "{}: {}", uri, body);
    }
}

#[actix_rt::test]
async fn test_extreme_window_parameters() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let reader = create_test_user(&db, "reader", "password123").await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, reader.id).await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let tag = create_test_tag(&db, "Baking", "baking").await.unwrap();
    create_test_recipe(&db, author.id, "Bread", &[(flour.id, 100)], &[tag.id])
        .await
        .unwrap();
    foodgram::subscriptions::subscribe(&db, reader.id, author.id)
        .await
        .unwrap();
    let app = init_app!(db, storage);

    let uri = format!("/api/users/?offset={}", u64::MAX);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 2);
    assert!(body["results"].as_array().unwrap().is_empty());
    assert!(body["next"].is_null());

    let uri = format!("/api/recipes/?limit={}&offset={}", u64::MAX, u64::MAX);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert!(body["results"].as_array().unwrap().is_empty());

    // Oversized limits fall back to the cap
    let req = test::TestRequest::get().uri("/api/users/?limit=100000").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let uri = format!(
        "/api/users/subscriptions/?recipes_limit={}&recipe_offset={}",
        u64::MAX,
        u64::MAX
    );
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["recipes_count"], 1);
    assert!(body["results"][0]["recipes"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_shopping_cart_download() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let author = create_test_user(&db, "chef", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, author.id).await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let tag = create_test_tag(&db, "Baking", "baking").await.unwrap();
    let bread = create_test_recipe(&db, author.id, "Bread", &[(flour.id, 200)], &[tag.id])
        .await
        .unwrap();
    let cake = create_test_recipe(&db, author.id, "Cake", &[(flour.id, 100)], &[tag.id])
        .await
        .unwrap();
    let app = init_app!(db, storage);

    for recipe_id in [bread.id, cake.id] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/recipes/{}/shopping_cart/", recipe_id))
            .insert_header(token_header(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/")
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("shopping_list.txt"));
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"flour - 300 g.\n");

    // Anonymous clients have no cart
    let req = test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_short_link_round_trip() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let author = create_test_user(&db, "chef", "password123").await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let tag = create_test_tag(&db, "Baking", "baking").await.unwrap();
    let bread = create_test_recipe(&db, author.id, "Bread", &[(flour.id, 200)], &[tag.id])
        .await
        .unwrap();
    let app = init_app!(db, storage);

    let uri = format!("/api/recipes/{}/get-link/", bread.id);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let first: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let req = test::TestRequest::get().uri(&uri).to_request();
    let second: Value = test::read_body_json(test::call_service(&app, req).await).await;

    let link = first["short-link"].as_str().unwrap().to_owned();
    assert_eq!(first, second);
    assert!(link.starts_with("http://localhost:8080/s/"));

    let path = link.trim_start_matches("http://localhost:8080");
    let req = test::TestRequest::get().uri(path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        format!("http://localhost:8080/recipes/{}/", bread.id).as_str()
    );

    let req = test::TestRequest::get().uri("/s/nope/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_subscriptions_over_http() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let reader = create_test_user(&db, "reader", "password123").await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, reader.id).await.unwrap();
    let flour = create_test_ingredient(&db, "flour", "g").await.unwrap();
    let tag = create_test_tag(&db, "Baking", "baking").await.unwrap();
    for name in ["Bread", "Cake", "Pie"] {
        create_test_recipe(&db, author.id, name, &[(flour.id, 100)], &[tag.id])
            .await
            .unwrap();
    }
    let app = init_app!(db, storage);

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/subscribe/", reader.id))
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/subscribe/?recipes_limit=1", author.id))
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "author");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 3);
    assert_eq!(body["recipes"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/users/subscriptions/")
        .insert_header(token_header(&token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["recipes"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}/", author.id))
        .insert_header(token_header(&token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["is_subscribed"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}/subscribe/", author.id))
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_catalogue_endpoints() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    create_test_ingredient(&db, "Sugar", "g").await.unwrap();
    create_test_ingredient(&db, "salt", "g").await.unwrap();
    create_test_ingredient(&db, "butter", "g").await.unwrap();
    let tag = create_test_tag(&db, "Dinner", "dinner").await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::get().uri("/api/ingredients/?name=S").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Sugar"));
    assert!(names.contains(&"salt"));

    let req = test::TestRequest::get().uri("/api/tags/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body[0]["slug"], "dinner");

    let req = test::TestRequest::get()
        .uri(&format!("/api/tags/{}/", tag.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/ingredients/9999/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_avatar_set_and_clear() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    let (storage, _dir) = create_test_storage();
    let user = create_test_user(&db, "chef", "password123").await.unwrap();
    let token = foodgram::auth::issue_token(&db, user.id).await.unwrap();
    let app = init_app!(db, storage);

    let req = test::TestRequest::put()
        .uri("/api/users/me/avatar/")
        .insert_header(token_header(&token))
        .set_json(json!({ "avatar": PNG_DATA_URI }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["avatar"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:8080/media/users/images/"));

    let req = test::TestRequest::put()
        .uri("/api/users/me/avatar/")
        .insert_header(token_header(&token))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri("/api/users/me/avatar/")
        .insert_header(token_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/users/me/")
        .insert_header(token_header(&token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["avatar"], Value::Null);
}
