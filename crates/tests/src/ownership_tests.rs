use bson::{Document, doc, oid::ObjectId};
use serde_json::Value;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn transfer_swaps_roles_and_owner_id() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("handoff").await;

    let successor = app
        .register_user("successor@example.test", "Successor", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &successor, "member")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "new_owner_id": successor.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["owner_id"], successor.id);

    let roles = app.member_roles(&ws.workspace_id, &successor.access_token).await;
    let old = roles.iter().find(|(id, _)| id == &ws.owner.id).unwrap();
    let new = roles.iter().find(|(id, _)| id == &successor.id).unwrap();
    assert_eq!(old.1, "admin");
    assert_eq!(new.1, "owner");
}

#[tokio::test]
async fn transfer_to_non_member_conflicts_and_changes_nothing() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("stranger").await;

    let outsider = app
        .register_user("outsider@example.test", "Outsider", "Secret123!")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "new_owner_id": outsider.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "invalid_target");

    let resp = app
        .auth_get(
            &format!("/api/workspaces/{}", ws.workspace_id),
            &ws.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["owner_id"], ws.owner.id);
}

#[tokio::test]
async fn only_the_owner_may_transfer() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("usurper").await;

    let admin = app
        .register_user("pretender@example.test", "Pretender", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &admin, "admin")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "new_owner_id": admin.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn self_transfer_conflicts() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("selfie").await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "new_owner_id": ws.owner.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn camel_case_body_is_accepted() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("camel").await;

    let successor = app
        .register_user("camel@example.test", "Camel", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &successor, "member")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "newOwnerId": successor.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn owner_id_is_authoritative_for_member_roles() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("midswap").await;

    let heir = app
        .register_user("heir@example.test", "Heir", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &heir, "member")
        .await;

    // Move the owner reference directly, leaving both member records
    // stale, like a transfer interrupted between the swap and the
    // reconciling role writes.
    let ws_oid = ObjectId::parse_str(&ws.workspace_id).unwrap();
    let heir_oid = ObjectId::parse_str(&heir.id).unwrap();
    app.db
        .collection::<Document>("workspaces")
        .update_one(
            doc! { "_id": ws_oid },
            doc! { "$set": { "owner_id": heir_oid } },
        )
        .await
        .unwrap();

    // Member reads derive from owner_id: exactly one owner, the stale
    // owner record shows as admin.
    let roles = app.member_roles(&ws.workspace_id, &heir.access_token).await;
    let owners = roles.iter().filter(|(_, role)| role == "owner").count();
    assert_eq!(owners, 1);
    assert_eq!(
        roles.iter().find(|(id, _)| id == &heir.id).unwrap().1,
        "owner"
    );
    assert_eq!(
        roles.iter().find(|(id, _)| id == &ws.owner.id).unwrap().1,
        "admin"
    );

    // Authorization follows the derived role too.
    let path = format!("/api/workspaces/{}", ws.workspace_id);
    let resp = app
        .auth_delete(&path, &ws.owner.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_delete(&path, &heir.access_token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn concurrent_transfers_leave_exactly_one_owner() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("split").await;

    let left = app
        .register_user("left@example.test", "Left", "Secret123!")
        .await;
    let right = app
        .register_user("right@example.test", "Right", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &left, "member")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &right, "member")
        .await;

    let path = format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id);
    let to_left = app
        .auth_post(&path, &ws.owner.access_token)
        .json(&serde_json::json!({ "new_owner_id": left.id }))
        .send();
    let to_right = app
        .auth_post(&path, &ws.owner.access_token)
        .json(&serde_json::json!({ "new_owner_id": right.id }))
        .send();

    let (rl, rr) = tokio::join!(to_left, to_right);
    let statuses = [rl.unwrap().status().as_u16(), rr.unwrap().status().as_u16()];
    let wins = statuses.iter().filter(|s| **s == 200).count();
    assert!(wins <= 1, "at most one transfer may win: {:?}", statuses);

    // Whatever happened, the member list holds exactly one owner.
    let roles = app.member_roles(&ws.workspace_id, &left.access_token).await;
    let owners = roles.iter().filter(|(_, role)| role == "owner").count();
    assert_eq!(owners, 1);
}
