//! Static records against the in-memory driver
//!
//! Every test registers host variables, executes one scripted statement and checks what
//! the variables hold after each fetch.

use odbc_record::constant::{CDataType, SqlDataType};
use odbc_record::gate::Status;
use odbc_record::memory::{Datum, MemoryDriver, MemoryResultSet};
use odbc_record::value::{DateStruct, NumericStruct, TimestampStruct};
use odbc_record::{Error, HostVar, Record, Statement, StatementOpts, StaticRecord};
use pretty_assertions::assert_eq;

const PEOPLE: &str = "SELECT id, name FROM people";

fn people(rows: &[(Datum, Datum)]) -> MemoryDriver {
    let mut rs = MemoryResultSet::new()
        .column("id", SqlDataType::INTEGER, 10, 0)
        .column("name", SqlDataType::VARCHAR, 10, 0);
    for (id, name) in rows {
        rs = rs.row([id.clone(), name.clone()]);
    }
    MemoryDriver::new().with_result_set(PEOPLE, rs)
}

#[test]
fn binds_by_name() {
    let mut stmt = Statement::new(people(&[(42.into(), "hello".into())]));
    let id = HostVar::new(0i32);
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();
    rec.bind_string("name", &name, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(id.get(), 42);
    assert_eq!(name.get(), "hello");
    assert!(rec.is_bound());
    assert_eq!(rec.skipped_columns(), &[] as &[u16]);
}

#[test]
fn null_sets_flag_and_clears_string() {
    let mut stmt = Statement::new(people(&[
        (1.into(), "first".into()),
        (2.into(), Datum::Null),
    ]));
    let name = HostVar::new(String::new());
    let name_is_null = HostVar::new(true);
    let mut rec = StaticRecord::new();
    rec.bind_string("name", &name, Some(&name_is_null)).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(name.get(), "first");
    assert!(!name_is_null.get());

    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(name.get(), "");
    assert!(name_is_null.get());
}

#[test]
fn end_of_data_leaves_last_row_in_place() {
    let mut stmt = Statement::new(people(&[
        (1.into(), "one".into()),
        (2.into(), "two".into()),
    ]));
    let id = HostVar::new(0i32);
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();
    rec.bind_string("name", &name, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!((id.get(), name.get()), (1, "one".to_string()));
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!((id.get(), name.get()), (2, "two".to_string()));
    assert!(!stmt.fetch(&mut rec).unwrap());
    assert_eq!((id.get(), name.get()), (2, "two".to_string()));
}

#[test]
fn values_round_trip() {
    let sql = "SELECT label, big, ratio, amount FROM samples";
    let amount = NumericStruct::new(-1_234_567, 10, 2);
    let driver = MemoryDriver::new().with_result_set(
        sql,
        MemoryResultSet::new()
            .column("label", SqlDataType::VARCHAR, 32, 0)
            .column("big", SqlDataType::BIGINT, 19, 0)
            .column("ratio", SqlDataType::DOUBLE, 15, 0)
            .column("amount", SqlDataType::NUMERIC, 10, 2)
            .row([
                Datum::from("r\u{e9}sum\u{e9}"),
                Datum::from(i64::MIN + 1),
                Datum::from(0.125),
                Datum::from(amount),
            ]),
    );
    let mut stmt = Statement::new(driver);

    let label = HostVar::new(String::new());
    let big = HostVar::new(0i64);
    let ratio = HostVar::new(0f64);
    let value = HostVar::new(NumericStruct::default());
    let mut rec = StaticRecord::new();
    rec.bind_string("label", &label, None).unwrap();
    rec.bind("big", &big, None).unwrap();
    rec.bind("ratio", &ratio, None).unwrap();
    rec.bind("amount", &value, None).unwrap();

    stmt.execute(sql).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(label.get(), "r\u{e9}sum\u{e9}");
    assert_eq!(big.get(), i64::MIN + 1);
    assert_eq!(ratio.get().to_bits(), 0.125f64.to_bits());
    assert_eq!(value.get(), amount);
    assert_eq!(value.get().to_string(), "-12345.67");
}

#[test]
fn temporal_columns_land_in_structs() {
    let sql = "SELECT born, created FROM events";
    let created = TimestampStruct {
        year: 2011,
        month: 6,
        day: 30,
        hour: 23,
        minute: 59,
        second: 58,
        fraction: 0,
    };
    let driver = MemoryDriver::new().with_result_set(
        sql,
        MemoryResultSet::new()
            .column("born", SqlDataType::TYPE_DATE, 10, 0)
            .column("created", SqlDataType::TYPE_TIMESTAMP, 19, 0)
            .row([Datum::from(DateStruct::new(1980, 1, 2)), Datum::from(created)]),
    );
    let mut stmt = Statement::new(driver);
    let born = HostVar::new(DateStruct::default());
    let ts = HostVar::new(TimestampStruct::default());
    let mut rec = StaticRecord::new();
    rec.bind("born", &born, None).unwrap();
    rec.bind("created", &ts, None).unwrap();

    stmt.execute(sql).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(born.get(), DateStruct::new(1980, 1, 2));
    assert_eq!(ts.get(), created);
}

#[test]
fn index_registration_wins_over_name() {
    let mut stmt = Statement::new(people(&[(7.into(), "seven".into())]));
    let by_index = HostVar::new(String::new());
    let by_name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind_string(2u16, &by_index, None).unwrap();
    rec.bind_string("name", &by_name, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(by_index.get(), "seven");
    assert_eq!(by_name.get(), "");
    assert_eq!(rec.skipped_columns(), &[1]);
}

#[test]
fn unmatched_columns_are_skipped() {
    let mut stmt = Statement::new(people(&[(7.into(), "seven".into())]));
    let id = HostVar::new(0i32);
    let missing = HostVar::new(0i32);
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();
    rec.bind("age", &missing, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(id.get(), 7);
    assert_eq!(missing.get(), 0);
    assert_eq!(rec.skipped_columns(), &[2]);
    assert_eq!(rec.bound_columns().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn record_without_registrations_drops_every_column() {
    let mut stmt = Statement::new(people(&[(1.into(), "x".into())]));
    let mut rec = StaticRecord::new();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(rec.skipped_columns(), &[1, 2]);
    assert!(stmt.driver().bindings().is_empty());
    assert!(!stmt.fetch(&mut rec).unwrap());
}

#[test]
fn reserved_capacity_truncates_with_info() {
    let mut stmt = Statement::new(people(&[(1.into(), "hello".into())]));
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind_string_with_capacity("name", &name, 3, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(name.get(), "hel");
    assert_eq!(stmt.driver().bindings()[&2], (CDataType::CHAR, 4));
    assert_eq!(stmt.diagnostic().records()[0].sql_state, "01004");
}

#[test]
fn end_of_data_clears_the_last_warning() {
    let mut stmt = Statement::new(people(&[(1.into(), "hello".into())]));
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind_string_with_capacity("name", &name, 3, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(stmt.diagnostic().len(), 1);
    assert!(!stmt.fetch(&mut rec).unwrap());
    assert!(stmt.diagnostic().is_empty());
    assert_eq!(name.get(), "hel");
}

#[test]
fn unbounded_text_uses_string_capacity() {
    let sql = "SELECT body FROM notes";
    let driver = MemoryDriver::new().with_result_set(
        sql,
        MemoryResultSet::new()
            .column("body", SqlDataType::LONGVARCHAR, 0, 0)
            .row(["abcdefgh"]),
    );
    let opts = StatementOpts {
        string_capacity: 4,
        ..Default::default()
    };
    let mut stmt = Statement::with_opts(driver, opts);
    let body = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind_string("body", &body, None).unwrap();

    stmt.execute(sql).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(body.get(), "abcd");
    assert_eq!(stmt.driver().bindings()[&1], (CDataType::CHAR, 5));
}

#[test]
fn wide_strings_decode_utf16() {
    let sql = "SELECT greeting FROM intl";
    let driver = MemoryDriver::new().with_result_set(
        sql,
        MemoryResultSet::new()
            .column("greeting", SqlDataType::WVARCHAR, 10, 0)
            .row(["gr\u{fc}\u{df}e \u{1F600}"]),
    );
    let mut stmt = Statement::new(driver);
    let greeting = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind_wide_string("greeting", &greeting, None).unwrap();

    stmt.execute(sql).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(greeting.get(), "gr\u{fc}\u{df}e \u{1F600}");
    assert_eq!(stmt.driver().bindings()[&1], (CDataType::WCHAR, 22));
}

#[test]
fn binary_is_truncated_to_registered_size() {
    let sql = "SELECT digest FROM blobs";
    let driver = MemoryDriver::new().with_result_set(
        sql,
        MemoryResultSet::new()
            .column("digest", SqlDataType::VARBINARY, 6, 0)
            .row([vec![1u8, 2, 3, 4, 5, 6]])
            .row([vec![9u8]]),
    );
    let mut stmt = Statement::new(driver);
    let digest = HostVar::new(Vec::new());
    let mut rec = StaticRecord::new();
    rec.bind_binary("digest", &digest, 4, None).unwrap();

    stmt.execute(sql).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(digest.get(), vec![1, 2, 3, 4]);
    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(digest.get(), vec![9]);
}

#[test]
fn bind_failure_leaves_record_unbound() {
    let driver = people(&[(1.into(), "x".into())]).reject_c_type(CDataType::CHAR);
    let mut stmt = Statement::new(driver);
    let id = HostVar::new(0i32);
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();
    rec.bind_string("name", &name, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    let err = stmt.fetch(&mut rec).unwrap_err();
    let Error::DriverError(diag) = err else {
        panic!("expected a driver error");
    };
    assert_eq!(diag.records()[0].sql_state, "HY003");
    assert!(!rec.is_bound());
    assert!(stmt.driver().bindings().is_empty());
    // the release of the partial binding went through the gate and succeeded
    assert!(stmt.diagnostic().is_empty());

    let mut ids_only = StaticRecord::new();
    ids_only.bind("id", &id, None).unwrap();
    assert!(stmt.fetch(&mut ids_only).unwrap());
    assert_eq!(id.get(), 1);
}

#[test]
fn registration_while_bound_is_rejected() {
    let mut stmt = Statement::new(people(&[(1.into(), "x".into())]));
    let id = HostVar::new(0i32);
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());
    let name = HostVar::new(String::new());
    assert!(matches!(
        rec.bind_string("name", &name, None),
        Err(Error::IncorrectUse(_))
    ));

    stmt.unbind(&mut rec).unwrap();
    rec.bind_string("name", &name, None).unwrap();
    assert_eq!(stmt.close_cursor().unwrap(), Status::Success);
}

#[test]
fn borrowed_variable_fails_the_fetch_without_losing_the_row() {
    let mut stmt = Statement::new(people(&[
        (1.into(), "one".into()),
        (2.into(), "two".into()),
    ]));
    let id = HostVar::new(0i32);
    let name = HostVar::new(String::new());
    let mut rec = StaticRecord::new();
    rec.bind("id", &id, None).unwrap();
    rec.bind_string("name", &name, None).unwrap();

    stmt.execute(PEOPLE).unwrap();
    assert!(stmt.fetch(&mut rec).unwrap());

    let held = name.borrow();
    let err = stmt.fetch(&mut rec).unwrap_err();
    assert!(matches!(err, Error::IncorrectUse(_)));
    assert_eq!(*held, "one");
    drop(held);

    let held = id.borrow();
    assert!(matches!(stmt.fetch(&mut rec), Err(Error::IncorrectUse(_))));
    drop(held);

    assert!(stmt.fetch(&mut rec).unwrap());
    assert_eq!(id.get(), 2);
    assert_eq!(name.get(), "two");
    assert!(!stmt.fetch(&mut rec).unwrap());
}
