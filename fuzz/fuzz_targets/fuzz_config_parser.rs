//! Fuzz target for `iacguard.toml` parsing and resolution.
//!
//! Goal: parsing and resolving arbitrary text should **never panic**. Errors are fine.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 64 * 1024 {
        return;
    }

    if let Ok(cfg) = iacguard_settings::parse_config_toml(text) {
        let _ = iacguard_settings::resolve_config(cfg, iacguard_settings::Overrides::default());
    }
});
