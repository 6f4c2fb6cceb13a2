use mockito::Matcher;
use std::collections::HashMap;

use crate::{
    client::{
        tests::common::*, traits::BitbucketApi, types::SaveContentRequest,
    },
    error::BitbucketError,
};

#[test_log::test(tokio::test)]
async fn test_get_repo_normalizes_workspace_to_project() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/")
        .match_header("authorization", FIXTURE_AUTH)
        .with_status(200)
        .with_body(
            r#"{"slug": "demo", "name": "Demo",
                "workspace": {"slug": "acme", "name": "Acme Inc"},
                "mainbranch": {"name": "main"}}"#,
        )
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let repo = api.get_repo("acme", "demo").await.unwrap();
    assert_eq!(repo.slug, "demo");
    assert_eq!(repo.project.key, "acme");
    assert_eq!(repo.project.name, "Acme Inc");
}

#[test_log::test(tokio::test)]
async fn test_list_repos_normalizes_cursor_envelope() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/2.0/repositories/acme")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("pagelen".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"pagelen": 2, "page": 2,
                "next": "https://api.bitbucket.org/2.0/repositories/acme?page=3",
                "values": [
                    {"slug": "a", "name": "A", "workspace": {"slug": "acme", "name": "Acme"}},
                    {"slug": "b", "name": "B", "workspace": {"slug": "acme", "name": "Acme"}}
                ]}"#,
        )
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let page = api.list_repos("acme", 2, 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.start, 2);
    assert_eq!(page.size, 2);
    assert!(!page.is_last_page);
    assert_eq!(page.next_page_start, Some(4));
}

#[test_log::test(tokio::test)]
async fn test_get_branch_maps_name_to_qualified_ref() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/refs/branches/main")
        .with_status(200)
        .with_body(r#"{"name": "main", "target": {"hash": "c3"}}"#)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let branch = api.get_branch("acme", "demo", "main").await.unwrap().unwrap();
    assert_eq!(branch.id, "refs/heads/main");
    assert_eq!(branch.display_id, "main");
    assert_eq!(branch.latest_commit, "c3");
}

#[test_log::test(tokio::test)]
async fn test_get_branch_404_is_absent_not_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/refs/branches/missing")
        .with_status(404)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let branch = api.get_branch("acme", "demo", "missing").await.unwrap();
    assert!(branch.is_none());
}

#[test_log::test(tokio::test)]
async fn test_default_branch_absent_when_mainbranch_is_null() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/fresh/")
        .with_status(200)
        .with_body(
            r#"{"slug": "fresh", "name": "Fresh",
                "workspace": {"slug": "acme", "name": "Acme"},
                "mainbranch": null}"#,
        )
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    assert!(api.get_default_branch("acme", "fresh").await.unwrap().is_none());
    assert!(api.is_empty_repo("acme", "fresh").await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_default_branch_resolves_tip_through_refs() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/")
        .with_status(200)
        .with_body(
            r#"{"slug": "demo", "name": "Demo",
                "workspace": {"slug": "acme", "name": "Acme"},
                "mainbranch": {"name": "trunk"}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/refs/branches/trunk")
        .with_status(200)
        .with_body(r#"{"name": "trunk", "target": {"hash": "t1"}}"#)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let branch = api.get_default_branch("acme", "demo").await.unwrap().unwrap();
    assert_eq!(branch.id, "refs/heads/trunk");
    assert_eq!(branch.latest_commit, "t1");
}

#[test_log::test(tokio::test)]
async fn test_get_content_reads_raw_file_in_one_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/2.0/repositories/acme/demo/src/c3/Jenkinsfile")
        .with_status(200)
        .with_body("pipeline {\n  agent any\n}")
        .expect(1)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let content = api
        .get_content("acme", "demo", "Jenkinsfile", "c3")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(content, "pipeline {\n  agent any\n}");
}

#[test_log::test(tokio::test)]
async fn test_save_content_reads_new_tip_from_branch() {
    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/2.0/repositories/acme/demo/src")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".into()),
        )
        .with_status(201)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/refs/branches/main")
        .with_status(200)
        .with_body(r#"{"name": "main", "target": {"hash": "new1"}}"#)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let saved = api
        .save_content(
            "acme",
            "demo",
            SaveContentRequest {
                path: "Jenkinsfile".into(),
                content: "pipeline {}".into(),
                message: "update".into(),
                branch: "main".into(),
                source_commit_id: None,
            },
        )
        .await
        .unwrap();

    post.assert_async().await;
    assert_eq!(saved.commit_id, "new1");
    assert_eq!(saved.branch, "main");
}

#[test_log::test(tokio::test)]
async fn test_file_exists_probes_meta_endpoint() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/2.0/repositories/acme/demo/src/main/Jenkinsfile")
        .match_query(Matcher::UrlEncoded("format".into(), "meta".into()))
        .with_status(200)
        .create_async()
        .await;

    let api = cloud_client(&server.url());
    let exists = api
        .file_exists("acme", "demo", "Jenkinsfile", Some("main"))
        .await
        .unwrap();
    assert!(exists);
}

#[test_log::test(tokio::test)]
async fn test_create_branch_requires_start_point() {
    let api = cloud_client("http://127.0.0.1:1/");
    let payload =
        HashMap::from([("name".to_string(), "feature/x".to_string())]);
    let err = api.create_branch("acme", "demo", payload).await.unwrap_err();
    assert!(matches!(err, BitbucketError::InvalidInput(_)));
}
