//! Stock page and question page flows end to end, with the remote services
//! replaced by in-memory fakes

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::time::Duration;
use test_log::test;

use crate::common::fakes::{CountingAnswerer, FakeProvider};
use crate::common::{database, logging, test_data};
use stock_dashboard::dashboard::{Dashboard, QuestionOutcome};
use stock_dashboard::models::DateRange;
use stock_dashboard::session::Session;
use stock_dashboard::DashboardError;

async fn build(provider: FakeProvider, answerer: CountingAnswerer) -> Dashboard {
    Dashboard::new(
        database::init_memory_store().await,
        test_data::sample_listing(),
        Box::new(provider),
        Box::new(answerer),
    )
}

#[test(tokio::test)]
async fn test_fetch_then_query_same_range() {
    logging::init_test_logging();
    logging::log_test_step("Fetch a window, then read it back");

    let result = tokio::time::timeout(Duration::from_secs(30), async {
        let series = test_data::create_trading_rows(test_data::date(2023, 12, 1), 90);
        let provider = FakeProvider::new(series);
        let dashboard = build(provider.clone(), CountingAnswerer::default()).await;

        let range = DateRange::new(test_data::date(2024, 1, 2), test_data::date(2024, 1, 31)).unwrap();
        let outcome = dashboard.fetch_and_store("삼성전자", range).await.unwrap();
        logging::log_test_data("Fetched rows", &outcome.rows.len());

        // End bound is inclusive, so the provider sees the day after
        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.to_string(), "KRX:005930");
        assert_eq!(calls[0].2, test_data::date(2024, 2, 1));

        let stored = dashboard.stored_rows("삼성전자", range).await.unwrap();
        assert_eq!(stored.len(), outcome.rows.len());
        assert!(stored.iter().all(|row| range.contains(row.date)));
        assert_eq!(stored.last().unwrap().date, test_data::date(2024, 1, 31));
    })
    .await;

    assert!(result.is_ok(), "Test timed out");
}

#[test(tokio::test)]
async fn test_refetch_replaces_previous_window() {
    let series = test_data::create_trading_rows(test_data::date(2024, 1, 1), 60);
    let dashboard = build(FakeProvider::new(series), CountingAnswerer::default()).await;

    let january = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 31)).unwrap();
    let week = DateRange::new(test_data::date(2024, 2, 5), test_data::date(2024, 2, 9)).unwrap();

    dashboard.fetch_and_store("SK하이닉스", january).await.unwrap();
    dashboard.fetch_and_store("SK하이닉스", week).await.unwrap();

    assert!(dashboard.stored_rows("SK하이닉스", january).await.unwrap().is_empty());
    assert_eq!(dashboard.stored_rows("SK하이닉스", week).await.unwrap().len(), 5);
}

#[test(tokio::test)]
async fn test_company_with_quotes_round_trips() {
    let series = test_data::create_trading_rows(test_data::date(2024, 1, 1), 10);
    let dashboard = build(FakeProvider::new(series), CountingAnswerer::default()).await;
    let range = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 10)).unwrap();

    let outcome = dashboard.fetch_and_store("O'Brien `Holdings`", range).await.unwrap();
    assert_eq!(outcome.table, "table_O'Brien `Holdings`");
    assert_eq!(
        dashboard.stored_rows("O'Brien `Holdings`", range).await.unwrap(),
        outcome.rows
    );
}

#[test(tokio::test)]
async fn test_unknown_and_ambiguous_companies() {
    let provider = FakeProvider::new(Vec::new());
    let dashboard = build(provider.clone(), CountingAnswerer::default()).await;
    let range = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 10)).unwrap();

    let err = dashboard.fetch_and_store("애플", range).await.unwrap_err();
    assert_matches!(err, DashboardError::TickerNotFound { .. });

    let err = dashboard.fetch_and_store("동명기업", range).await.unwrap_err();
    assert_matches!(err, DashboardError::AmbiguousTicker { ref codes, .. } if codes.len() == 2);

    assert_eq!(provider.call_count(), 0);
}

#[test(tokio::test)]
async fn test_empty_provider_window_is_reported() {
    let dashboard = build(FakeProvider::new(Vec::new()), CountingAnswerer::default()).await;
    let range = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 10)).unwrap();

    let err = dashboard.fetch_and_store("삼성전자", range).await.unwrap_err();
    assert_matches!(err, DashboardError::EmptySeries { .. });
}

#[test(tokio::test)]
async fn test_question_without_snapshot() {
    let answerer = CountingAnswerer::default();
    let dashboard = build(FakeProvider::new(Vec::new()), answerer.clone()).await;

    let outcome = dashboard.ask(&Session::new(), "최고가는?").await.unwrap();
    assert_eq!(outcome, QuestionOutcome::MissingSelection);
    assert_eq!(answerer.call_count(), 0);
}

#[test(tokio::test)]
async fn test_question_over_window_without_rows() {
    let series = test_data::create_trading_rows(test_data::date(2024, 1, 1), 10);
    let answerer = CountingAnswerer::default();
    let dashboard = build(FakeProvider::new(series), answerer.clone()).await;

    let stored = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 10)).unwrap();
    dashboard.fetch_and_store("삼성전자", stored).await.unwrap();

    let mut session = Session::new();
    session.go_to_question(
        Some("삼성전자".to_string()),
        Some(test_data::date(2024, 6, 1)),
        Some(test_data::date(2024, 6, 30)),
    );

    let outcome = dashboard.ask(&session, "최고가는?").await.unwrap();
    assert_matches!(outcome, QuestionOutcome::NoData { .. });
    assert_eq!(answerer.call_count(), 0);

    // A company that was never fetched reads the same way
    session.go_to_question(
        Some("SK하이닉스".to_string()),
        Some(test_data::date(2024, 1, 1)),
        Some(test_data::date(2024, 1, 10)),
    );
    let outcome = dashboard.ask(&session, "최고가는?").await.unwrap();
    assert_matches!(outcome, QuestionOutcome::NoData { .. });
}

#[test(tokio::test)]
async fn test_question_sees_only_the_snapshot_window() {
    let series = test_data::create_trading_rows(test_data::date(2024, 1, 1), 31);
    let answerer = CountingAnswerer::default();
    let dashboard = build(FakeProvider::new(series), answerer.clone()).await;

    let month = DateRange::new(test_data::date(2024, 1, 1), test_data::date(2024, 1, 31)).unwrap();
    dashboard.fetch_and_store("삼성전자", month).await.unwrap();

    let mut session = Session::new();
    session.go_to_question(
        Some("삼성전자".to_string()),
        Some(test_data::date(2024, 1, 8)),
        Some(test_data::date(2024, 1, 12)),
    );

    let outcome = dashboard.ask(&session, "추세는?").await.unwrap();
    assert_eq!(
        outcome,
        QuestionOutcome::Answered {
            question: "추세는?".to_string(),
            answer: "추세는?: 5 rows".to_string(),
        }
    );
    assert_eq!(answerer.call_count(), 1);
}
