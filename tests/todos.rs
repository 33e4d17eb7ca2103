mod common;

use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{rt, test, App, HttpServer};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::net::TcpListener;
use tickbox::auth::TokenService;
use tickbox::models::Todo;
use tickbox::routes;

use common::{json_body, register_and_login_user, test_state, TEST_SECRET};

#[actix_rt::test]
async fn test_todos_require_authentication_over_http() {
    let state = test_state().await;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let server_handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/todos", port))
        .json(&json!({ "item": "Unauthorized Todo" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(
        body,
        json!({ "error": "Authorization header missing or invalid" })
    );

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.stop(false).await;
}

#[actix_rt::test]
async fn test_rejected_tokens() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes::config)).await;

    let user = register_and_login_user(&app, "guarded@example.com", "guarded", "Password123!")
        .await
        .unwrap();

    let expired = state
        .tokens
        .issue_at(user.id, Utc::now() - Duration::hours(25))
        .unwrap();
    let foreign = TokenService::new("not_the_server_secret")
        .unwrap()
        .issue(user.id)
        .unwrap();
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let other_algorithm = encode(
        &Header::new(Algorithm::HS512),
        &json!({ "sub": user.id, "exp": exp }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    let string_subject = encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "guarded", "exp": exp }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let cases = vec![
        (None, "Authorization header missing or invalid", "no header"),
        (
            Some(format!("Basic {}", user.token)),
            "Authorization header missing or invalid",
            "wrong scheme",
        ),
        (Some(format!("Bearer {}", expired)), "Token expired", "expired"),
        (Some(format!("Bearer {}", foreign)), "Invalid token", "other secret"),
        (
            Some(format!("Bearer {}", other_algorithm)),
            "Invalid token",
            "other algorithm",
        ),
        (
            Some(format!("Bearer {}", string_subject)),
            "Invalid token claims",
            "malformed claims",
        ),
    ];

    for (authorization, message, description) in cases {
        let mut req = test::TestRequest::get().uri("/todos");
        if let Some(value) = authorization {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body = json_body(&test::read_body(resp).await);

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", description);
        assert_eq!(body, json!({ "error": message }), "{}", description);
    }

    // The valid token still works.
    let req = test::TestRequest::get()
        .uri("/todos")
        .insert_header(user.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_todo_crud_flow() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    let test_user = register_and_login_user(&app, "crud_user@example.com", "crud_user", "PasswordCrud123!")
        .await
        .expect("Failed to register/login test user for CRUD flow");

    // 1. Create
    let req_create = test::TestRequest::post()
        .uri("/todos")
        .insert_header(test_user.bearer())
        .set_json(json!({ "item": "Buy groceries" }))
        .to_request();
    let resp_create = test::call_service(&app, req_create).await;
    assert_eq!(resp_create.status(), StatusCode::CREATED);
    let created: Todo = test::read_body_json(resp_create).await;
    assert_eq!(created.item, "Buy groceries");
    assert!(!created.completed);
    assert_eq!(created.user_id, test_user.id);

    // 2. Get by id
    let req_get = test::TestRequest::get()
        .uri(&format!("/todos/{}", created.id))
        .insert_header(test_user.bearer())
        .to_request();
    let resp_get = test::call_service(&app, req_get).await;
    assert_eq!(resp_get.status(), StatusCode::OK);
    let fetched: Todo = test::read_body_json(resp_get).await;
    assert_eq!(fetched, created);

    // 3. List
    let req_list = test::TestRequest::get()
        .uri("/todos")
        .insert_header(test_user.bearer())
        .to_request();
    let listed: Vec<Todo> = test::call_and_read_body_json(&app, req_list).await;
    assert_eq!(listed, vec![created.clone()]);

    // 4. Update
    let req_update = test::TestRequest::patch()
        .uri(&format!("/todos/{}", created.id))
        .insert_header(test_user.bearer())
        .set_json(json!({ "item": "Buy groceries and milk", "completed": true }))
        .to_request();
    let resp_update = test::call_service(&app, req_update).await;
    assert_eq!(resp_update.status(), StatusCode::OK);
    let updated: Todo = test::read_body_json(resp_update).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.item, "Buy groceries and milk");
    assert!(updated.completed);

    // 5. Delete
    let req_delete = test::TestRequest::delete()
        .uri(&format!("/todos/{}", created.id))
        .insert_header(test_user.bearer())
        .to_request();
    let resp_delete = test::call_service(&app, req_delete).await;
    assert_eq!(resp_delete.status(), StatusCode::NO_CONTENT);

    // 6. Gone from get and list
    let req_get = test::TestRequest::get()
        .uri(&format!("/todos/{}", created.id))
        .insert_header(test_user.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req_get).await.status(),
        StatusCode::NOT_FOUND
    );

    let req_list = test::TestRequest::get()
        .uri("/todos")
        .insert_header(test_user.bearer())
        .to_request();
    let listed: Vec<Todo> = test::call_and_read_body_json(&app, req_list).await;
    assert!(listed.is_empty());

    // Deleting twice is a miss.
    let req_delete = test::TestRequest::delete()
        .uri(&format!("/todos/{}", created.id))
        .insert_header(test_user.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req_delete).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_completed_flag_on_create() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = register_and_login_user(&app, "flags@example.com", "flags", "Password123!")
        .await
        .unwrap();

    let cases = vec![
        (json!({ "item": "omitted" }), false),
        (json!({ "item": "explicit false", "completed": false }), false),
        (json!({ "item": "explicit true", "completed": true }), true),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/todos")
            .insert_header(user.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "{}", payload);
        let todo: Todo = test::read_body_json(resp).await;
        assert_eq!(todo.completed, expected, "{}", payload);
    }

    let invalid = vec![
        json!({}),
        json!({ "item": "" }),
        json!({ "item": "x", "completed": "yes" }),
    ];
    for payload in invalid {
        let req = test::TestRequest::post()
            .uri("/todos")
            .insert_header(user.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);
    }
}

#[actix_rt::test]
async fn test_partial_update_semantics() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = register_and_login_user(&app, "patch@example.com", "patcher", "Password123!")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/todos")
        .insert_header(user.bearer())
        .set_json(json!({ "item": "original", "completed": true }))
        .to_request();
    let todo: Todo = test::call_and_read_body_json(&app, req).await;

    let patch = |payload: serde_json::Value| {
        test::TestRequest::patch()
            .uri(&format!("/todos/{}", todo.id))
            .insert_header(user.bearer())
            .set_json(payload)
            .to_request()
    };

    // Empty item and no completed flag: nothing changes.
    let after: Todo = test::call_and_read_body_json(&app, patch(json!({ "item": "" }))).await;
    assert_eq!(after.item, "original");
    assert!(after.completed);

    // Explicit false overwrites; item untouched.
    let after: Todo =
        test::call_and_read_body_json(&app, patch(json!({ "completed": false }))).await;
    assert_eq!(after.item, "original");
    assert!(!after.completed);

    // Non-empty item replaces; completed untouched.
    let after: Todo =
        test::call_and_read_body_json(&app, patch(json!({ "item": "renamed" }))).await;
    assert_eq!(after.item, "renamed");
    assert!(!after.completed);

    // Empty body is a no-op.
    let after: Todo = test::call_and_read_body_json(&app, patch(json!({}))).await;
    assert_eq!(after.item, "renamed");
    assert!(!after.completed);
}

#[test_log::test(actix_rt::test)]
async fn test_other_users_todos_are_invisible() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let alice = register_and_login_user(&app, "alice@example.com", "alice", "Password123!")
        .await
        .unwrap();
    let bob = register_and_login_user(&app, "bob@example.com", "bob", "Password123!")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/todos")
        .insert_header(alice.bearer())
        .set_json(json!({ "item": "alice only" }))
        .to_request();
    let alices_todo: Todo = test::call_and_read_body_json(&app, req).await;
    let missing_id = alices_todo.id + 1000;

    // Bob's list never shows Alice's todo.
    let req = test::TestRequest::get()
        .uri("/todos")
        .insert_header(bob.bearer())
        .to_request();
    let bobs_list: Vec<Todo> = test::call_and_read_body_json(&app, req).await;
    assert!(bobs_list.is_empty());

    // GET / PATCH / DELETE on Alice's id look exactly like a nonexistent id.
    for method in ["GET", "PATCH", "DELETE"] {
        let mut responses = Vec::new();
        for id in [alices_todo.id, missing_id] {
            let uri = format!("/todos/{}", id);
            let req = match method {
                "GET" => test::TestRequest::get().uri(&uri),
                "PATCH" => test::TestRequest::patch()
                    .uri(&uri)
                    .set_json(json!({ "item": "hijacked", "completed": true })),
                _ => test::TestRequest::delete().uri(&uri),
            }
            .insert_header(bob.bearer())
            .to_request();
            let resp = test::call_service(&app, req).await;
            let status = resp.status();
            responses.push((status, test::read_body(resp).await));
        }

        assert_eq!(responses[0].0, StatusCode::NOT_FOUND, "{}", method);
        assert_eq!(responses[0], responses[1], "{} leaks existence", method);
        assert_eq!(
            json_body(&responses[0].1),
            json!({ "error": "Todo not found" })
        );
    }

    // Alice's todo survived Bob's attempts untouched.
    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", alices_todo.id))
        .insert_header(alice.bearer())
        .to_request();
    let still_there: Todo = test::call_and_read_body_json(&app, req).await;
    assert_eq!(still_there, alices_todo);
}

#[actix_rt::test]
async fn test_invalid_todo_id_is_a_bad_request() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = register_and_login_user(&app, "ids@example.com", "ids", "Password123!")
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/todos/not-a-number")
        .insert_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_collection_accepts_trailing_slash() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = register_and_login_user(&app, "slash@example.com", "slash", "Password123!")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/todos/")
        .insert_header(user.bearer())
        .set_json(json!({ "item": "with slash" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = test::read_body_json(resp).await;

    for uri in ["/todos", "/todos/"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(user.bearer())
            .to_request();
        let listed: Vec<Todo> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed, vec![created.clone()], "{}", uri);
    }

    let req = test::TestRequest::get().uri("/todos/").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
