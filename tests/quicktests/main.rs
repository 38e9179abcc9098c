#[macro_use]
extern crate quickcheck_macros;

#[path = "../../src/test/quick.rs"]
mod quick;

mod heap;
mod mutable;
mod persistent;

pub(crate) use quick::Op;

use tracing_subscriber::EnvFilter;

/// Prints the crate's `trace!` events for failing cases when `RUST_LOG` asks for them.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
