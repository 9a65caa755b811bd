mod common;

use cypher_runtime::operations::functions::{
    abs, distance, full_slice, head, last, length, range_with_step, right, round, round_with_mode,
    round_with_precision, size, split, substring_with_length, tail, to_integer, to_integer_or_null,
};
use cypher_runtime::operations::math::{add, divide, divide_check_for_null, modulo, multiply, pow, subtract};
use cypher_runtime::values::{DurationValue, PointValue};
use cypher_runtime::Value;
use time::macros::date;

#[test]
fn addition_dispatches_in_rule_order() {
    common::init_tracing();
    let list = Value::list([Value::Integer(1)]);
    assert_eq!(
        add(&list, &Value::list([Value::Integer(2)])).unwrap(),
        Value::list([Value::Integer(1), Value::Integer(2)])
    );
    assert_eq!(
        add(&Value::text("x"), &list).unwrap(),
        Value::list([Value::text("x"), Value::Integer(1)])
    );
    assert_eq!(add(&Value::text("n="), &Value::Integer(4)).unwrap(), Value::text("n=4"));
    assert_eq!(add(&Value::Integer(1), &Value::Float(0.5)).unwrap(), Value::Float(1.5));
    assert_eq!(add(&Value::Undefined, &Value::Integer(1)).unwrap(), Value::Undefined);
    let err = add(&Value::Boolean(true), &Value::Integer(1)).unwrap_err();
    assert_eq!(err.code(), "TypeError");
}

#[test]
fn temporal_arithmetic_with_durations() {
    let d = DurationValue::new(1, 10, 0, 0).unwrap();
    let start = Value::Date(date!(2024 - 01 - 15));
    let shifted = add(&start, &Value::Duration(d)).unwrap();
    assert_eq!(shifted, Value::Date(date!(2024 - 02 - 25)));
    assert_eq!(add(&Value::Duration(d), &start).unwrap(), shifted);
    assert_eq!(subtract(&shifted, &Value::Duration(d)).unwrap(), start);
    let doubled = multiply(&Value::Integer(2), &Value::Duration(d)).unwrap();
    assert_eq!(doubled, Value::Duration(DurationValue::new(2, 20, 0, 0).unwrap()));
}

#[test]
fn division_by_integer_zero_precedes_undefined() {
    assert_eq!(divide(&Value::Undefined, &Value::Integer(0)).unwrap_err().code(), "ArithmeticError");
    assert!(divide_check_for_null(&Value::Undefined, &Value::Integer(0)).is_err());
    assert!(divide_check_for_null(&Value::Undefined, &Value::Integer(2)).unwrap());
    assert!(!divide_check_for_null(&Value::Integer(1), &Value::Integer(2)).unwrap());
    assert_eq!(divide(&Value::Integer(-7), &Value::Integer(2)).unwrap(), Value::Integer(-3));
    let Value::Float(inf) = divide(&Value::Float(1.0), &Value::Integer(0)).unwrap() else {
        panic!("expected a float");
    };
    assert!(inf.is_infinite());
}

#[test]
fn modulo_and_power_result_types() {
    assert_eq!(modulo(&Value::Integer(7), &Value::Integer(3)).unwrap(), Value::Integer(1));
    assert_eq!(modulo(&Value::Float(7.5), &Value::Integer(2)).unwrap(), Value::Float(1.5));
    assert_eq!(pow(&Value::Integer(2), &Value::Integer(10)).unwrap(), Value::Float(1024.0));
    assert_eq!(multiply(&Value::Integer(i64::MAX), &Value::Integer(2)).unwrap_err().code(), "ArithmeticError");
}

#[test]
fn rounding_modes() {
    assert_eq!(round(&Value::Float(2.5)).unwrap(), Value::Float(3.0));
    assert_eq!(round(&Value::Float(-2.5)).unwrap(), Value::Float(-2.0));
    assert_eq!(round(&Value::Float(0.49999999999999994)).unwrap(), Value::Float(0.0));
    assert_eq!(round(&Value::Float(f64::NAN)).unwrap(), Value::Float(0.0));
    assert_eq!(round(&Value::Float(f64::INFINITY)).unwrap(), Value::Float(i64::MAX as f64));
    assert_eq!(round_with_precision(&Value::Float(1.235), &Value::Integer(2)).unwrap(), Value::Float(1.24));
    assert_eq!(
        round_with_mode(&Value::Float(1.25), &Value::Integer(1), &Value::text("HALF_EVEN")).unwrap(),
        Value::Float(1.2)
    );
    let err = round_with_mode(&Value::Float(1.25), &Value::Integer(1), &Value::text("UNNECESSARY")).unwrap_err();
    assert_eq!(err.code(), "ArithmeticError");
    assert_eq!(
        round_with_mode(&Value::Float(1.5), &Value::Integer(3), &Value::text("UNNECESSARY")).unwrap(),
        Value::Float(1.5)
    );
    assert!(round_with_mode(&Value::Float(1.0), &Value::Integer(0), &Value::text("SIDEWAYS")).is_err());
}

#[test]
fn sequence_functions() {
    let r = range_with_step(&Value::Integer(10), &Value::Integer(1), &Value::Integer(-3)).unwrap();
    assert_eq!(r, Value::list([10, 7, 4, 1].map(Value::Integer)));
    assert_eq!(range_with_step(&Value::Integer(0), &Value::Integer(1), &Value::Integer(0)).unwrap_err().code(), "InvalidArgument");
    assert_eq!(head(&Value::list([])).unwrap(), Value::Undefined);
    assert_eq!(last(&r).unwrap(), Value::Integer(1));
    assert_eq!(tail(&Value::Integer(1)), Value::list([]));
    assert_eq!(size(&Value::text("héllo")).unwrap(), Value::Integer(5));
    assert_eq!(size(&Value::Integer(42)).unwrap(), Value::Integer(1));
    assert_eq!(length(&Value::Boolean(true)).unwrap(), Value::Integer(1));
    assert_eq!(
        full_slice(&r, &Value::Integer(-3), &Value::Integer(-1)).unwrap(),
        Value::list([7, 4].map(Value::Integer))
    );
    assert_eq!(abs(&Value::Integer(-3)).unwrap(), Value::Integer(3));
}

#[test]
fn text_functions() {
    assert_eq!(right(&Value::text("hello"), &Value::Integer(3)).unwrap(), Value::text("llo"));
    assert_eq!(right(&Value::text("hello"), &Value::Integer(-1)).unwrap_err().code(), "InvalidArgument");
    assert_eq!(
        substring_with_length(&Value::text("hello"), &Value::Integer(1), &Value::Integer(3)).unwrap(),
        Value::text("ell")
    );
    assert_eq!(
        split(&Value::text("a,b;c"), &Value::list([Value::text(","), Value::text(";")])).unwrap(),
        Value::list(["a", "b", "c"].map(Value::text))
    );
    assert_eq!(right(&Value::Integer(1), &Value::Integer(1)).unwrap_err().code(), "TypeError");
}

#[test]
fn integer_casts_fall_back_to_decimal_parsing() {
    assert_eq!(to_integer(&Value::text("42")).unwrap(), Value::Integer(42));
    assert_eq!(to_integer(&Value::text("4.9e1")).unwrap(), Value::Integer(49));
    assert_eq!(to_integer(&Value::text("not a number")).unwrap(), Value::Undefined);
    assert!(to_integer(&Value::text("1e40")).is_err());
    assert_eq!(to_integer(&Value::text("-12.99")).unwrap(), Value::Integer(-12));
    assert_eq!(to_integer(&Value::text("1e-100000000")).unwrap(), Value::Integer(0));
    assert_eq!(to_integer_or_null(&Value::list([])), Value::Undefined);
    assert!(to_integer(&Value::list([])).is_err());
}

#[test]
fn to_integer_rejects_text_past_the_integer_range() {
    assert_eq!(
        to_integer(&Value::text("9223372036854775807.0")).unwrap(),
        Value::Integer(i64::MAX)
    );
    assert_eq!(
        to_integer(&Value::text("-9223372036854775808.9e0")).unwrap_err().code(),
        "TypeError"
    );
    let err = to_integer(&Value::text("9223372036854775807.5")).unwrap_err();
    assert_eq!(err.code(), "TypeError");

    let started = std::time::Instant::now();
    let err = to_integer(&Value::text("1e100000000")).unwrap_err();
    assert_eq!(err.code(), "TypeError");
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}

#[test]
fn distance_requires_matching_crs() {
    let a = Value::Point(PointValue::cartesian(0.0, 0.0));
    let b = Value::Point(PointValue::cartesian(3.0, 4.0));
    assert_eq!(distance(&a, &b), Value::Float(5.0));
    assert_eq!(distance(&a, &Value::Integer(1)), Value::Undefined);
}
