//! Price store tests against in-memory SQLite

use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::{database, logging, test_data};
use stock_dashboard::database::PriceStore;

#[test(tokio::test)]
async fn test_query_range_is_inclusive_and_ordered() {
    logging::init_test_logging();
    logging::log_test_step("Query a sub-window of a stored series");

    let rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 31);
    let store = database::init_store_with_rows("table_삼성전자", &rows).await;

    let start = test_data::date(2024, 1, 8);
    let end = test_data::date(2024, 1, 12);
    let window = store.query_range("table_삼성전자", start, end).await.unwrap();

    assert_eq!(window.len(), 5);
    assert_eq!(window.first().unwrap().date, start);
    assert_eq!(window.last().unwrap().date, end);
    assert!(window.windows(2).all(|w| w[0].date < w[1].date));

    let expected: Vec<_> = rows.iter().filter(|r| r.date >= start && r.date <= end).cloned().collect();
    assert_eq!(window, expected);
}

#[test(tokio::test)]
async fn test_replace_twice_keeps_same_row_set() {
    let rows = test_data::create_trading_rows(test_data::date(2024, 2, 1), 10);
    let store = database::init_memory_store().await;
    let table = PriceStore::table_name("SK하이닉스");
    store.ensure_table(&table).await.unwrap();

    assert_eq!(store.replace_rows(&table, &rows).await.unwrap(), rows.len());
    assert_eq!(store.replace_rows(&table, &rows).await.unwrap(), rows.len());

    assert_eq!(store.count_rows(&table).await.unwrap(), rows.len() as i64);
    let stored = store
        .query_range(&table, test_data::date(2024, 1, 1), test_data::date(2024, 12, 31))
        .await
        .unwrap();
    assert_eq!(stored, rows);
}

#[test(tokio::test)]
async fn test_replace_drops_rows_outside_new_series() {
    let store = database::init_memory_store().await;
    let table = "table_카카오";
    store.ensure_table(table).await.unwrap();

    let january = test_data::create_trading_rows(test_data::date(2024, 1, 1), 31);
    let march = test_data::create_trading_rows(test_data::date(2024, 3, 1), 5);
    store.replace_rows(table, &january).await.unwrap();
    store.replace_rows(table, &march).await.unwrap();

    let all = store
        .query_range(table, test_data::date(2024, 1, 1), test_data::date(2024, 12, 31))
        .await
        .unwrap();
    assert_eq!(all, march);
}

#[test(tokio::test)]
async fn test_names_with_quotes_and_backticks_are_safe() {
    logging::log_test_step("Store a company whose name carries quote characters");

    let store = database::init_memory_store().await;
    let hostile = PriceStore::table_name("O'Brien `x`; DROP TABLE other; --");
    let bystander = PriceStore::table_name("other");

    let rows = test_data::create_trading_rows(test_data::date(2024, 4, 1), 7);
    store.ensure_table(&bystander).await.unwrap();
    store.replace_rows(&bystander, &rows).await.unwrap();

    store.ensure_table(&hostile).await.unwrap();
    store.replace_rows(&hostile, &rows[..2]).await.unwrap();

    assert_eq!(store.count_rows(&hostile).await.unwrap(), 2);
    assert_eq!(store.count_rows(&bystander).await.unwrap(), rows.len() as i64);
}

#[test(tokio::test)]
async fn test_ensure_table_is_idempotent() {
    let store = database::init_memory_store().await;
    store.ensure_table("table_x").await.unwrap();
    store.ensure_table("table_x").await.unwrap();

    assert_eq!(store.count_rows("table_x").await.unwrap(), 0);
}

#[test(tokio::test)]
async fn test_query_missing_table_is_an_error() {
    let store = database::init_memory_store().await;
    let result = store
        .query_range("table_nope", test_data::date(2024, 1, 1), test_data::date(2024, 1, 2))
        .await;
    assert!(result.is_err());
}

#[test(tokio::test)]
async fn test_failed_replace_rolls_back() {
    let rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 8);
    let store = database::init_store_with_rows("table_삼성전자", &rows).await;

    // The repeated date violates the primary key on the fourth insert
    let mut batch = test_data::create_trading_rows(test_data::date(2024, 5, 1), 3);
    batch.push(batch[0].clone());
    assert!(store.replace_rows("table_삼성전자", &batch).await.is_err());

    assert_eq!(store.count_rows("table_삼성전자").await.unwrap(), 8);
    let stored = store
        .query_range("table_삼성전자", test_data::date(2024, 1, 1), test_data::date(2024, 12, 31))
        .await
        .unwrap();
    assert_eq!(stored, rows);
}
