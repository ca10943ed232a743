//! HTTP clients against a local mock server

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{logging, test_data};
use stock_dashboard::api::{
    fetch_series, KrxListingClient, ListingSource, NaverChartClient, OpenAiClient, QuestionAnswerer, Symbol,
};
use stock_dashboard::DashboardError;

fn openai_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new("sk-test", server.uri(), "gpt-4o-mini", 5).unwrap()
}

#[test(tokio::test)]
async fn test_completion_success() {
    logging::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 900
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "  최고가는 70,500원입니다.\n"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 3);
    let answer = openai_client(&server).answer("최고가는?", &rows).await.unwrap();
    assert_eq!(answer, "최고가는 70,500원입니다.");
}

#[test(tokio::test)]
async fn test_completion_prompt_embeds_rows_and_question() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 2);
    openai_client(&server).answer("추세는?", &rows).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();

    assert_eq!(body["messages"][0]["content"], "You are a helpful assistant.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(prompt.starts_with("주식 데이터: "));
    assert!(prompt.contains("2024-01-02"));
    assert!(prompt.ends_with("질문: 추세는?\n답변:"));
}

#[test(tokio::test)]
async fn test_completion_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = openai_client(&server).answer("q", &[]).await.unwrap_err();
    assert_matches!(err, DashboardError::Completion { status: 500, ref body } if body == "upstream down");
}

#[test(tokio::test)]
async fn test_completion_without_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = openai_client(&server).answer("q", &[]).await.unwrap_err();
    assert_matches!(err, DashboardError::MalformedCompletion(_));
}

#[test(tokio::test)]
async fn test_naver_chart_inclusive_window() {
    let server = MockServer::start().await;

    let body = r#"[['날짜', '시가', '고가', '저가', '종가', '거래량', '외국인소진율'],
["20240102", 78200, 79800, 78200, 79600, 17142847, 53.6],
["20240103", 78500, 78800, 77000, 77000, 21753644, 53.58],
["20240104", 76100, 77300, 76000, 76600, 15324439, 53.6]
]"#;

    Mock::given(method("GET"))
        .and(path("/siseJson.naver"))
        .and(query_param("symbol", "005930"))
        .and(query_param("startTime", "20240102"))
        .and(query_param("endTime", "20240103"))
        .and(query_param("timeframe", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = NaverChartClient::with_api_base(server.uri(), 5).unwrap();
    let symbol = Symbol::parse("KRX:005930").unwrap();
    let rows = fetch_series(&client, &symbol, test_data::date(2024, 1, 2), test_data::date(2024, 1, 3))
        .await
        .unwrap();

    // The extra day the server returned is clipped away
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![test_data::date(2024, 1, 2), test_data::date(2024, 1, 3)]);
    assert_eq!(rows[1].close, 77000.0);
}

#[test(tokio::test)]
async fn test_naver_chart_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = NaverChartClient::with_api_base(server.uri(), 5).unwrap();
    let symbol = Symbol::new("KRX", "005930");
    let err = fetch_series(&client, &symbol, test_data::date(2024, 1, 2), test_data::date(2024, 1, 3))
        .await
        .unwrap_err();
    assert_matches!(err, DashboardError::Provider(_));
}

#[test(tokio::test)]
async fn test_krx_listing_download() {
    let server = MockServer::start().await;

    let html = r#"<html><body><table>
        <tr><th>회사명</th><th>시장구분</th><th>종목코드</th></tr>
        <tr><td>삼성전자</td><td>유가</td><td>005930</td></tr>
        <tr><td>카카오</td><td>유가</td><td>35720</td></tr>
        </table></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/corpList.do"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html; charset=utf-8"))
        .expect(1)
        .mount(&server)
        .await;

    let client = KrxListingClient::with_url(format!("{}/corpList.do", server.uri()), 5).unwrap();
    let listing = client.fetch_listing().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing.resolve_ticker("카카오").unwrap(), "035720");
}
