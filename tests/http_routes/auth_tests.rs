//! Anonymous access and owner isolation over HTTP.

use super::helpers::{OWNER_HEADER, TestApp, app, body_text, owner, redirect_location};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rstest::rstest;
use taskly::task::domain::OwnerId;

#[rstest]
#[case("/", "/accounts/login/?next=/")]
#[case("/done-tasks/", "/accounts/login/?next=/done-tasks/")]
#[case("/add/", "/accounts/login/?next=/add/")]
#[case("/1-x/detail/", "/accounts/login/?next=/1-x/detail/")]
#[case("/1-x/delete/", "/accounts/login/?next=/1-x/delete/")]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_pages_redirect_to_login(
    app: TestApp,
    #[case] path: &str,
    #[case] expected: &str,
) {
    let response = app.get(path, None).await;

    assert_eq!(redirect_location(&response), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_owner_header_counts_as_anonymous(app: TestApp) {
    let request = Request::get("/")
        .header(OWNER_HEADER, "not-a-uuid")
        .body(Body::empty())
        .expect("request should build");

    let response = app.send(request).await;

    assert_eq!(redirect_location(&response), "/accounts/login/?next=/");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_tasks_return_not_found(app: TestApp, owner: OwnerId) {
    let task = app.seed(owner, "Private", 1).await;
    let stranger = Some(OwnerId::new());

    for path in [
        task.absolute_url(),
        task.update_url(),
        task.do_url(),
        task.undo_url(),
        task.delete_url(),
    ] {
        let response = app.get(&path, stranger).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let untouched = app
        .service()
        .find(owner, task.slug().as_str())
        .await
        .expect("owner's task should survive");
    assert_eq!(untouched, task);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lists_show_only_own_tasks(app: TestApp, owner: OwnerId) {
    app.seed(owner, "Mine", 1).await;
    app.seed(OwnerId::new(), "Someone else's", 1).await;

    let page = body_text(app.get("/", Some(owner)).await).await;

    assert!(page.contains("Mine"));
    assert!(!page.contains("Someone else"));
}
