//! HTTP-level integration tests for projects, labels and collaborators.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_project, create_text, create_user, delete, get, post_json,
    project_url, put_json,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_project_returns_201_with_default_labels(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/projects",
        &alice.token,
        serde_json::json!({ "name": "  Corpus A ", "description": "first" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let project = body_json(response).await["data"].clone();
    assert_eq!(project["name"], "Corpus A");
    assert_eq!(project["user_project_id"], 1);
    assert_eq!(project["owner_id"], alice.id);

    let labels = body_json(
        get(
            build_test_app(pool),
            &project_url(alice.id, 1, "/labels"),
            &alice.token,
        )
        .await,
    )
    .await;
    let labels = labels["data"].as_array().unwrap();
    assert_eq!(labels.len(), 13);
    assert!(labels.iter().all(|l| l["is_static"] == true));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_project_name_is_rejected(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let response = post_json(
        build_test_app(pool),
        "/api/v1/projects",
        &alice.token,
        serde_json::json!({ "name": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn project_numbers_are_per_owner(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    assert_eq!(create_project(&pool, &alice, "A1").await["user_project_id"], 1);
    assert_eq!(create_project(&pool, &alice, "A2").await["user_project_id"], 2);
    assert_eq!(create_project(&pool, &bob, "B1").await["user_project_id"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_a_project_renumbers_the_rest(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "first").await;
    create_project(&pool, &alice, "second").await;
    create_project(&pool, &alice, "third").await;

    let response = delete(
        build_test_app(pool.clone()),
        &project_url(alice.id, 2, ""),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        build_test_app(pool.clone()),
        &project_url(alice.id, 2, ""),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["project"]["name"], "third");

    let response = get(
        build_test_app(pool.clone()),
        &project_url(alice.id, 3, ""),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The next project continues from the compacted numbering.
    assert_eq!(create_project(&pool, &alice, "fourth").await["user_project_id"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_project_returns_404(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let response = get(
        build_test_app(pool),
        &project_url(alice.id, 99, ""),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn outsiders_are_forbidden(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    create_project(&pool, &alice, "private").await;

    let response = get(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, ""),
        &mallory.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json(
        build_test_app(pool),
        &project_url(alice.id, 1, ""),
        &mallory.token,
        serde_json::json!({ "name": "mine now" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn detail_pages_texts_and_renders_overlay(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "paged").await;
    for (id, content) in [("t1", "one"), ("t2", "two"), ("t3", "<three>")] {
        create_text(&pool, &alice, 1, id, content).await;
    }

    let json = body_json(
        get(
            build_test_app(pool.clone()),
            &project_url(alice.id, 1, "?page=2"),
            &alice.token,
        )
        .await,
    )
    .await;
    let data = &json["data"];
    assert_eq!(data["total_texts"], 3);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["page"], 2);
    assert_eq!(data["is_owner"], true);
    let texts = data["texts"].as_array().unwrap();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0]["text_id"], "t3");
    assert_eq!(texts[0]["rendered_html"], "&lt;three&gt;");

    // Out-of-range pages clamp to the last page.
    let json = body_json(
        get(
            build_test_app(pool),
            &project_url(alice.id, 1, "?page=50"),
            &alice.token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["page"], 2);
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn collaborator_gains_member_access_but_not_owner_rights(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    create_project(&pool, &alice, "shared").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, "/collaborators"),
        &alice.token,
        serde_json::json!({ "username": "bob" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["username"], "bob");

    // Adding twice is a no-op.
    let response = post_json(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, "/collaborators"),
        &alice.token,
        serde_json::json!({ "username": "bob" }),
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, ""),
        &bob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_owner"], false);

    let listed = body_json(get(build_test_app(pool.clone()), "/api/v1/projects", &bob.token).await).await;
    assert_eq!(listed["data"][0]["owner_username"], "alice");
    assert_eq!(listed["data"][0]["is_owner"], false);

    let response = delete(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, ""),
        &bob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, &format!("/collaborators/{}", bob.id)),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        build_test_app(pool),
        &project_url(alice.id, 1, ""),
        &bob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn adding_unknown_user_or_owner_is_rejected(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "solo").await;

    for username in ["nobody", "alice"] {
        let response = post_json(
            build_test_app(pool.clone()),
            &project_url(alice.id, 1, "/collaborators"),
            &alice.token,
            serde_json::json!({ "username": username }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{username}");
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn label_names_are_unique_per_project(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "labels").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, "/labels"),
        &alice.token,
        serde_json::json!({ "name": "COLOUR", "color": "#123abc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let label = body_json(response).await["data"].clone();
    assert_eq!(label["color"], "#123abc");
    assert_eq!(label["is_static"], false);

    let response = post_json(
        build_test_app(pool),
        &project_url(alice.id, 1, "/labels"),
        &alice.token,
        serde_json::json!({ "name": "COLOUR" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn label_colour_must_be_hex(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "labels").await;

    let response = post_json(
        build_test_app(pool),
        &project_url(alice.id, 1, "/labels"),
        &alice.token,
        serde_json::json!({ "name": "BAD", "color": "red" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn labels_can_be_renamed_and_deleted(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    create_project(&pool, &alice, "labels").await;
    let label = body_json(
        post_json(
            build_test_app(pool.clone()),
            &project_url(alice.id, 1, "/labels"),
            &alice.token,
            serde_json::json!({ "name": "OLD" }),
        )
        .await,
    )
    .await["data"]
        .clone();
    let label_id = label["id"].as_i64().unwrap();
    assert_eq!(label["color"], "#000000");

    let response = put_json(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, &format!("/labels/{label_id}")),
        &alice.token,
        serde_json::json!({ "name": "NEW", "color": "#FF0000" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "NEW");

    let response = delete(
        build_test_app(pool.clone()),
        &project_url(alice.id, 1, &format!("/labels/{label_id}")),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(
        build_test_app(pool),
        &project_url(alice.id, 1, &format!("/labels/{label_id}")),
        &alice.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
