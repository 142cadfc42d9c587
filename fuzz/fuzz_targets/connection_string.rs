#![no_main]

use libfuzzer_sys::fuzz_target;
use pgmock_client::PoolConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = PoolConfig::from_connection_string(s);
        let _ = pgmock_client::config::parse_duration(s);
    }
});
