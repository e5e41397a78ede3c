//! tracing output to the browser console

use std::sync::Once;
use tracing::Level;
use tracing_wasm::WASMLayerConfigBuilder;

static INIT: Once = Once::new();

/// Max level for a build: debug builds log everything down to `DEBUG`
fn max_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the console subscriber. Safe to call more than once.
pub fn init() {
    INIT.call_once(|| {
        let config = WASMLayerConfigBuilder::new()
            .set_max_level(max_level())
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}
