use chrono::NaiveDate;
use secrecy::SecretString;
use wellness_report_core::SourceError;
use wellness_report_core::http_source::RestMentalHealthSource;
use wellness_report_core::model::Identity;
use wellness_report_core::source::{FetchRequest, RecordSource};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(identity: Option<&Identity>) -> FetchRequest<'_> {
    FetchRequest {
        identity,
        limit: 5,
        today: NaiveDate::from_ymd_opt(2026, 3, 10).expect("date"),
    }
}

#[tokio::test]
async fn fetch_uses_row_store_query_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/mental_health_analyses"))
        .and(query_param("select", "*,recommendations(text)"))
        .and(query_param("user_id", "eq.user-42"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "5"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 2,
                "user_id": "user-42",
                "created_at": "2026-03-09T21:15:00.123+00:00",
                "emotional_state": "Tired",
                "stress_level": 55,
                "recommendations": [{"text": "Go to bed earlier"}]
            },
            {
                "id": 1,
                "user_id": "user-42",
                "created_at": "2026-03-07T08:00:00+00:00",
                "emotional_state": "Content",
                "stress_level": 20,
                "recommendations": []
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source =
        RestMentalHealthSource::new(&mock_server.uri(), SecretString::new("anon-key".into()));
    let user = Identity::new("user-42");
    let records = source.fetch_recent(&request(Some(&user))).await.expect("fetch");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].emotional_state, "Tired");
    assert_eq!(records[0].stress_level, 55.0);
    assert_eq!(records[0].recommendations, vec!["Go to bed earlier"]);
    assert_eq!(
        records[1].date,
        NaiveDate::from_ymd_opt(2026, 3, 7).expect("date")
    );
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/mental_health_analyses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let source = RestMentalHealthSource::new(&mock_server.uri(), SecretString::new("bad".into()));
    let user = Identity::new("user-42");
    let err = source.fetch_recent(&request(Some(&user))).await.unwrap_err();
    match err {
        SourceError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_payload_is_malformed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/mental_health_analyses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "oops"})),
        )
        .mount(&mock_server)
        .await;

    let source = RestMentalHealthSource::new(&mock_server.uri(), SecretString::new("k".into()));
    let user = Identity::new("user-42");
    let err = source.fetch_recent(&request(Some(&user))).await.unwrap_err();
    assert!(matches!(err, SourceError::Malformed(_)));
}

#[tokio::test]
async fn no_identity_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let source = RestMentalHealthSource::new(&mock_server.uri(), SecretString::new("k".into()));
    assert!(source.requires_identity());
    let records = source.fetch_recent(&request(None)).await.expect("fetch");
    assert!(records.is_empty());
}
