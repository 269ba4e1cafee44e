use serde_json::Value;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn creator_becomes_owner_and_sole_member() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("fresh").await;

    let resp = app
        .auth_get(
            &format!("/api/workspaces/{}", ws.workspace_id),
            &ws.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["owner_id"], ws.owner.id);
    assert_eq!(json["color"], "#4F46E5");

    let members = json["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], ws.owner.id);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["email"], ws.owner.email);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("blank@example.test", "Blank", "Secret123!")
        .await;

    let resp = app
        .auth_post("/api/workspaces", &user.access_token)
        .json(&serde_json::json!({ "name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn listing_shows_only_own_workspaces() {
    let app = TestApp::spawn().await;
    let mine = app.seed_workspace("mine").await;
    let theirs = app.seed_workspace("theirs").await;

    let resp = app
        .auth_get("/api/workspaces", &mine.owner.access_token)
        .send()
        .await
        .unwrap();
    let list: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], mine.workspace_id);

    // Joining the other workspace makes it show up.
    app.join_workspace(
        &theirs.workspace_id,
        &theirs.owner.access_token,
        &mine.owner,
        "member",
    )
    .await;

    let resp = app
        .auth_get("/api/workspaces", &mine.owner.access_token)
        .send()
        .await
        .unwrap();
    let list: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(list.len(), 2);
}

#[tokio::test]
async fn non_members_are_forbidden() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("private").await;

    let outsider = app
        .register_user("peeker@example.test", "Peeker", "Secret123!")
        .await;

    let resp = app
        .auth_get(
            &format!("/api/workspaces/{}", ws.workspace_id),
            &outsider.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn only_the_owner_may_update() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("locked").await;

    let admin = app
        .register_user("editor@example.test", "Editor", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &admin, "admin")
        .await;

    let path = format!("/api/workspaces/{}", ws.workspace_id);

    let resp = app
        .auth_put(&path, &admin.access_token)
        .json(&serde_json::json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&path, &ws.owner.access_token)
        .json(&serde_json::json!({ "name": "Renamed", "color": "#FF0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["name"], "Renamed");
    assert_eq!(json["color"], "#FF0000");
}

#[tokio::test]
async fn update_with_empty_name_is_rejected() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("noblank").await;

    let resp = app
        .auth_put(
            &format!("/api/workspaces/{}", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn stats_reflect_projects_tasks_and_members() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("stats").await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/projects", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "name": "Rollout" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let project: Value = resp.json().await.unwrap();
    let project_id = project["id"].as_str().unwrap();

    let resp = app
        .auth_put(
            &format!(
                "/api/workspaces/{}/projects/{}",
                ws.workspace_id, project_id
            ),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_post(
            &format!(
                "/api/workspaces/{}/projects/{}/tasks",
                ws.workspace_id, project_id
            ),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "title": "Ship it" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = app
        .auth_get(
            &format!("/api/workspaces/{}/stats", ws.workspace_id),
            &ws.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let stats: Value = resp.json().await.unwrap();
    assert_eq!(stats["projects"]["total"], 1);
    assert_eq!(stats["projects"]["active"], 1);
    assert_eq!(stats["tasks"]["total"], 1);
    assert_eq!(stats["tasks"]["todo"], 1);
    assert_eq!(stats["members"], 1);
}
