mod query;
mod recording;
mod relations;
mod schema;
mod transaction;
mod unit_of_work;
mod values;

use crate::{
    query::query, relations::relations, schema::schema, transaction::transaction,
    unit_of_work::unit_of_work, values::values,
};
use log::LevelFilter;
use rook_core::Connection;
use std::env;

pub use recording::*;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite against `connection`, tables are dropped and recreated as needed.
pub async fn execute_tests<C: Connection>(mut connection: C) {
    schema(&mut connection).await;
    query(&mut connection).await;
    unit_of_work(&mut connection).await;
    relations(&mut connection).await;
    transaction(&mut connection).await;
    values(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
