//! Shared fixtures for the record type suites.

use std::sync::Arc;

use record_rs::{
    records::{Record, RecordType},
    value::Value,
};

pub fn point_type() -> Arc<RecordType> {
    RecordType::builder()
        .named("point")
        .fields(["x", "y"])
        .build()
        .unwrap()
}

pub fn point(ty: &Arc<RecordType>, x: i64, y: i64) -> Record {
    ty.instantiate(vec![Value::from(x), Value::from(y)])
        .unwrap()
}
