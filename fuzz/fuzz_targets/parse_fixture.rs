#![no_main]

use libfuzzer_sys::fuzz_target;
use pgmock_client::Rows;
use pgmock_testing::MockRows;
use pgmock_testing::csv::Records;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // The reader must terminate and report at most one error.
    let errors = Records::new(text).filter(Result::is_err).count();
    assert!(errors <= 1);

    let fixture = MockRows::new(["a", "b", "c"]).from_csv_string(text);
    assert!(fixture.rows().iter().all(|row| row.len() == 3));

    let mut rows = fixture.compose();
    while rows.next() {
        let (mut a, mut b, mut c) = (String::new(), None::<i64>, 0f64);
        let _ = rows.scan(&mut [&mut a, &mut b, &mut c]);
    }
});
