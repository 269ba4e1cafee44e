use bson::{Document, doc, oid::ObjectId};
use serde_json::Value;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn direct_invite_sends_email_and_grants_role() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("acme").await;

    let invitee = app
        .register_user("bianca@example.test", "Bianca", "Secret123!")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "email": "bianca@example.test", "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["email_sent"], true);
    let token = json["token"].as_str().unwrap().to_string();

    // The invite email went to the target and carries the token link.
    let sent = app.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bianca@example.test");
    assert!(sent[0].body.contains(&token));

    let resp = app
        .auth_post("/api/workspaces/accept-invite-token", &invitee.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], ws.workspace_id);

    let roles = app.member_roles(&ws.workspace_id, &ws.owner.access_token).await;
    assert_eq!(roles.len(), 2);
    let invitee_role = roles.iter().find(|(id, _)| id == &invitee.id).unwrap();
    assert_eq!(invitee_role.1, "member");

    // Handing the workspace over to the new member completes the flow.
    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/transfer-ownership", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "new_owner_id": invitee.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let roles = app.member_roles(&ws.workspace_id, &invitee.access_token).await;
    let old = roles.iter().find(|(id, _)| id == &ws.owner.id).unwrap();
    let new = roles.iter().find(|(id, _)| id == &invitee.id).unwrap();
    assert_eq!(old.1, "admin");
    assert_eq!(new.1, "owner");
}

#[tokio::test]
async fn consumed_invite_cannot_be_reused() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("reuse").await;

    let first = app
        .register_user("first@example.test", "First", "Secret123!")
        .await;
    let token = app
        .join_workspace(&ws.workspace_id, &ws.owner.access_token, &first, "member")
        .await;

    // Same token again, even by a different user, is gone.
    let second = app
        .register_user("second@example.test", "Second", "Secret123!")
        .await;
    let resp = app
        .auth_post("/api/workspaces/accept-invite-token", &second.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 410);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "already_consumed");

    let roles = app.member_roles(&ws.workspace_id, &ws.owner.access_token).await;
    assert_eq!(roles.len(), 2);
}

#[tokio::test]
async fn inviting_an_existing_member_conflicts() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("conflict").await;

    let member = app
        .register_user("already@example.test", "Already", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &member, "member")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "email": "already@example.test", "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "already_member");
}

#[tokio::test]
async fn plain_member_cannot_invite() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("perms").await;

    let member = app
        .register_user("member@example.test", "Member", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &member, "member")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &member.access_token,
        )
        .json(&serde_json::json!({ "email": "third@example.test", "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_can_invite() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("admin").await;

    let admin = app
        .register_user("admin@example.test", "Admin", "Secret123!")
        .await;
    app.join_workspace(&ws.workspace_id, &ws.owner.access_token, &admin, "admin")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "email": "newbie@example.test", "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
}

#[tokio::test]
async fn cannot_invite_at_owner_role() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("noowner").await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "email": "x@example.test", "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn expired_invite_is_gone_and_grants_nothing() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("expiry").await;

    let invitee = app
        .register_user("late@example.test", "Late", "Secret123!")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/invite-member", ws.workspace_id),
            &ws.owner.access_token,
        )
        .json(&serde_json::json!({ "email": "late@example.test", "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let json: Value = resp.json().await.unwrap();
    let token = json["token"].as_str().unwrap().to_string();

    // Age the invite past its expiry behind the API's back.
    let past = bson::DateTime::from_millis(bson::DateTime::now().timestamp_millis() - 86_400_000);
    app.db
        .collection::<Document>("invites")
        .update_one(doc! { "token": &token }, doc! { "$set": { "expires_at": past } })
        .await
        .unwrap();

    let resp = app
        .auth_post("/api/workspaces/accept-invite-token", &invitee.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 410);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "expired_token");

    let roles = app.member_roles(&ws.workspace_id, &ws.owner.access_token).await;
    assert_eq!(roles.len(), 1, "expired invite must not add members");
}

#[tokio::test]
async fn unknown_token_is_bad_request() {
    let app = TestApp::spawn().await;
    app.seed_workspace("unknown").await;

    let user = app
        .register_user("guess@example.test", "Guess", "Secret123!")
        .await;

    let resp = app
        .auth_post("/api/workspaces/accept-invite-token", &user.access_token)
        .json(&serde_json::json!({ "token": "not-a-real-token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "invalid_token");
}

#[tokio::test]
async fn generated_link_is_reused_until_consumed() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("genlink").await;

    let path = format!("/api/workspaces/{}/accept-generate-invite", ws.workspace_id);

    let resp = app.auth_post(&path, &ws.owner.access_token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let first: Value = resp.json().await.unwrap();

    let resp = app.auth_post(&path, &ws.owner.access_token).send().await.unwrap();
    let second: Value = resp.json().await.unwrap();
    assert_eq!(first["token"], second["token"]);

    // A generated link joins at the default member role.
    let joiner = app
        .register_user("viaLink@example.test", "Via Link", "Secret123!")
        .await;
    let resp = app
        .auth_post("/api/workspaces/accept-invite-token", &joiner.access_token)
        .json(&serde_json::json!({ "token": first["token"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let roles = app.member_roles(&ws.workspace_id, &ws.owner.access_token).await;
    let joined = roles.iter().find(|(id, _)| id == &joiner.id).unwrap();
    assert_eq!(joined.1, "member");

    // After consumption a fresh generate issues a new token.
    let resp = app.auth_post(&path, &ws.owner.access_token).send().await.unwrap();
    let third: Value = resp.json().await.unwrap();
    assert_ne!(first["token"], third["token"]);
}

#[tokio::test]
async fn concurrent_accepts_consume_the_token_exactly_once() {
    let app = TestApp::spawn().await;
    let ws = app.seed_workspace("race").await;

    let resp = app
        .auth_post(
            &format!("/api/workspaces/{}/accept-generate-invite", ws.workspace_id),
            &ws.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let token = json["token"].as_str().unwrap().to_string();

    let a = app
        .register_user("racer-a@example.test", "Racer A", "Secret123!")
        .await;
    let b = app
        .register_user("racer-b@example.test", "Racer B", "Secret123!")
        .await;

    let accept_a = app
        .auth_post("/api/workspaces/accept-invite-token", &a.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send();
    let accept_b = app
        .auth_post("/api/workspaces/accept-invite-token", &b.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send();

    let (ra, rb) = tokio::join!(accept_a, accept_b);
    let statuses = [ra.unwrap().status().as_u16(), rb.unwrap().status().as_u16()];

    let wins = statuses.iter().filter(|s| **s == 200).count();
    let gone = statuses.iter().filter(|s| **s == 410).count();
    assert_eq!(wins, 1, "exactly one accept may win: {:?}", statuses);
    assert_eq!(gone, 1, "the loser must see 410: {:?}", statuses);

    // Owner plus the single winner.
    let roles = app.member_roles(&ws.workspace_id, &ws.owner.access_token).await;
    assert_eq!(roles.len(), 2);

    let ws_oid = ObjectId::parse_str(&ws.workspace_id).unwrap();
    let members = app
        .db
        .collection::<Document>("workspace_members")
        .count_documents(doc! { "workspace_id": ws_oid })
        .await
        .unwrap();
    assert_eq!(members, 2);
}
