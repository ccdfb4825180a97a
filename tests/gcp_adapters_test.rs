use httpmock::prelude::*;
use quota_comparer::core::{ProjectDirectory, ProjectRef, QuotaSource};
use quota_comparer::{
    ComputeQuotaSource, GcpHttpClient, QuotaComparerError, ResourceManagerDirectory, RetryPolicy,
};
use serde_json::json;
use std::time::Duration;

fn client(max_retries: u32, token: Option<&str>) -> GcpHttpClient {
    let retry = RetryPolicy {
        max_retries,
        retry_statuses: vec![503],
        jitter_base: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
    };
    GcpHttpClient::new(Duration::from_secs(5), token.map(str::to_string), retry).unwrap()
}

#[tokio::test]
async fn test_list_projects_filters_active_and_follows_pages() {
    let server = MockServer::start();

    // the more specific page is registered first so it wins for the second request
    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/projects")
            .query_param("filter", "lifecycleState:ACTIVE labels.env:staging")
            .query_param("pageToken", "page-2");
        then.status(200).json_body(json!({
            "projects": [
                {"projectId": "prj-staging-search-gh78", "name": "search", "lifecycleState": "ACTIVE"}
            ]
        }));
    });
    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/projects")
            .query_param("filter", "lifecycleState:ACTIVE labels.env:staging")
            .header("authorization", "Bearer ya29.test");
        then.status(200).json_body(json!({
            "projects": [
                {"projectId": "prj-staging-billing-cd34", "name": "billing", "lifecycleState": "ACTIVE"}
            ],
            "nextPageToken": "page-2"
        }));
    });

    let directory = ResourceManagerDirectory::new(client(0, Some("ya29.test")), &server.base_url());
    let projects = directory.list_projects("labels.env:staging").await.unwrap();

    first_page.assert();
    second_page.assert();
    assert_eq!(
        projects,
        vec![
            ProjectRef::new("prj-staging-billing-cd34", "billing"),
            ProjectRef::new("prj-staging-search-gh78", "search"),
        ]
    );
}

#[tokio::test]
async fn test_list_projects_failure_is_directory_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/projects");
        then.status(400).body("invalid filter");
    });

    let directory = ResourceManagerDirectory::new(client(0, None), &server.base_url());
    let err = directory.list_projects("labels.env=").await.unwrap_err();

    mock.assert();
    match err {
        QuotaComparerError::DirectoryError { filter, message } => {
            assert_eq!(filter, "lifecycleState:ACTIVE labels.env=");
            assert!(message.contains("400"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_project_quotas_reads_project_and_regions() {
    let server = MockServer::start();
    let project_mock = server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12");
        then.status(200).json_body(json!({
            "name": "prj-dev-billing-ab12",
            "quotas": [
                {"metric": "CPUS", "limit": 24.0, "usage": 3.0},
                {"metric": "FIREWALLS", "limit": -1.0, "usage": 0.0}
            ]
        }));
    });
    let regions_mock = server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12/regions");
        then.status(200).json_body(json!({
            "items": [
                {"name": "us-east1", "quotas": [{"metric": "DISKS_TOTAL_GB", "limit": 500.0, "usage": 10.0}]},
                {"name": "europe-west1", "quotas": []}
            ]
        }));
    });

    let source = ComputeQuotaSource::new(client(0, None), &server.base_url());
    let snapshot = source
        .project_quotas(&ProjectRef::new("prj-dev-billing-ab12", "billing"))
        .await
        .unwrap()
        .expect("snapshot");

    project_mock.assert();
    regions_mock.assert();
    assert_eq!(snapshot.project_quotas.len(), 2);
    assert_eq!(snapshot.project_quotas[0].metric, "CPUS");
    assert_eq!(snapshot.project_quotas[0].limit, 24.0);
    assert_eq!(snapshot.project_quotas[1].limit, -1.0);

    let regions = snapshot.region_quotas.as_ref().expect("regions");
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].region, "us-east1");
    assert_eq!(regions[0].quotas[0].limit, 500.0);
}

#[tokio::test]
async fn test_region_failure_degrades_to_missing_regions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12");
        then.status(200)
            .json_body(json!({"quotas": [{"metric": "CPUS", "limit": 24.0}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12/regions");
        then.status(500);
    });

    let source = ComputeQuotaSource::new(client(0, None), &server.base_url());
    let snapshot = source
        .project_quotas(&ProjectRef::new("prj-dev-billing-ab12", "billing"))
        .await
        .unwrap()
        .expect("snapshot");

    assert_eq!(snapshot.project_quotas.len(), 1);
    assert!(snapshot.region_quotas.is_none());
}

#[tokio::test]
async fn test_project_failure_is_absent_after_retries() {
    let server = MockServer::start();
    let project_mock = server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12");
        then.status(503);
    });
    let regions_mock = server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12/regions");
        then.status(200).json_body(json!({"items": []}));
    });

    let source = ComputeQuotaSource::new(client(2, None), &server.base_url());
    let snapshot = source
        .project_quotas(&ProjectRef::new("prj-dev-billing-ab12", "billing"))
        .await
        .unwrap();

    assert!(snapshot.is_none());
    project_mock.assert_hits(3);
    regions_mock.assert_hits(0);
}

#[tokio::test]
async fn test_transient_unavailable_recovers_on_retry() {
    let server = MockServer::start_async().await;
    let path = "/compute/v1/projects/prj-dev-billing-ab12";
    let mut unavailable = server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(503);
        })
        .await;

    let retry = RetryPolicy {
        max_retries: 5,
        retry_statuses: vec![503],
        jitter_base: Duration::from_millis(20),
        max_backoff: Duration::from_millis(200),
    };
    let client = GcpHttpClient::new(Duration::from_secs(5), None, retry).unwrap();

    let recover = async {
        while unavailable.hits_async().await == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        unavailable.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).json_body(json!({"quotas": [{"metric": "CPUS", "limit": 24.0}]}));
            })
            .await
    };
    let url = server.url(path);
    let (body, recovered) = tokio::join!(
        client.get_json::<serde_json::Value>(&url, &[]),
        recover
    );

    let body = body.unwrap();
    assert_eq!(body["quotas"][0]["metric"], "CPUS");
    recovered.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_non_retryable_status_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/compute/v1/projects/prj-dev-billing-ab12");
        then.status(403).body("forbidden");
    });

    let err = client(3, None)
        .get_json::<serde_json::Value>(&server.url("/compute/v1/projects/prj-dev-billing-ab12"), &[])
        .await
        .unwrap_err();

    mock.assert_hits(1);
    assert!(matches!(err, QuotaComparerError::ApiStatus { status: 403, .. }));
}
