mod converter;
mod invoices;
mod people;
mod samples;
mod transactions;
mod uniques;

pub use converter::*;
pub use invoices::*;
pub use people::*;
pub use samples::*;
pub use transactions::*;
pub use uniques::*;

use log::LevelFilter;
use rowbind::{Dialect, Executor};
use std::env;

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

/// Runs the whole suite on `executor`, every test registers its own tables
/// with a mapper built from `dialect`.
pub async fn execute_tests<E: Executor, D: Dialect + Clone + 'static>(
    executor: &mut E,
    dialect: D,
) {
    invoices(executor, dialect.clone()).await;
    people(executor, dialect.clone()).await;
    samples(executor, dialect.clone()).await;
    uniques(executor, dialect.clone()).await;
    transactions(executor, dialect.clone()).await;
    converter(executor, dialect).await;
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
