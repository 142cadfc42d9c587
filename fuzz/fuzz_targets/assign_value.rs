#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pgmock_types::{SqlValue, assign};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<FuzzValue> for SqlValue {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => SqlValue::Null,
            FuzzValue::Bool(v) => SqlValue::Bool(v),
            FuzzValue::Int16(v) => SqlValue::Int16(v),
            FuzzValue::Int32(v) => SqlValue::Int32(v),
            FuzzValue::Int64(v) => SqlValue::Int64(v),
            FuzzValue::UInt32(v) => SqlValue::UInt32(v),
            FuzzValue::UInt64(v) => SqlValue::UInt64(v),
            FuzzValue::Float64(v) => SqlValue::Float64(v),
            FuzzValue::Text(v) => SqlValue::Text(v),
            FuzzValue::Bytes(v) => SqlValue::from(v),
        }
    }
}

fuzz_target!(|input: FuzzValue| {
    let value = SqlValue::from(input);

    // Every destination must either accept the value or return an error.
    let _ = assign(&mut 0u8, &value, "u8");
    let _ = assign(&mut 0i32, &value, "i32");
    let _ = assign(&mut 0u64, &value, "u64");
    let _ = assign(&mut 0f32, &value, "f32");
    let _ = assign(&mut false, &value, "bool");
    let _ = assign(&mut String::new(), &value, "string");
    let _ = assign(&mut Vec::<u8>::new(), &value, "bytes");
    let _ = assign(&mut None::<i64>, &value, "optional");
    let _ = assign(&mut rust_decimal::Decimal::ZERO, &value, "decimal");
    let _ = assign(&mut uuid::Uuid::nil(), &value, "uuid");
    let _ = assign(&mut chrono::NaiveDateTime::default(), &value, "timestamp");
});
