#![doc(test(attr(deny(warnings))))]

//! NITP Portal offers the application-intake wizards, review back-office, and
//! local persistence that power the NITP Abuja Chapter membership portal.

pub mod applications;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod review;
pub mod roles;
pub mod storage;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("NITP portal tracing initialized.");
    });
}
