//! Requirement combinator tests

use objmap_core::{Comparison, FieldValue, Requirement};

fn int(n: i64) -> FieldValue {
    FieldValue::Integer(n)
}

#[test]
fn test_exists() {
    let exists = Requirement::exists();
    assert!(exists.evaluate(Some(&int(0))));
    assert!(exists.evaluate(Some(&FieldValue::from(""))));
    assert!(!exists.evaluate(Some(&FieldValue::Null)));
    assert!(!exists.evaluate(None));
}

#[test]
fn test_comparisons() {
    let cases = [
        (Requirement::greater_than(3), [false, false, true]),
        (Requirement::greater_than_or_equal_to(3), [false, true, true]),
        (Requirement::equal_to(3), [false, true, false]),
        (Requirement::less_than(3), [true, false, false]),
        (Requirement::less_than_or_equal_to(3), [true, true, false]),
    ];
    for (requirement, expected) in cases {
        let actual = [2, 3, 4].map(|n| requirement.evaluate(Some(&int(n))));
        assert_eq!(actual, expected, "{}", requirement);
    }

    // floats compare against the same threshold
    assert!(Requirement::greater_than(3).evaluate(Some(&FieldValue::Float(3.5))));
    // non-numeric and missing values never satisfy a comparison
    assert!(!Requirement::less_than(3).evaluate(Some(&FieldValue::from("1"))));
    assert!(!Requirement::less_than(3).evaluate(None));
    assert!(!Requirement::compare(Comparison::LessThan, 3).evaluate(Some(&FieldValue::Null)));
}

#[test]
fn test_all_and_any() {
    let range: Requirement = vec![
        Requirement::greater_than_or_equal_to(0),
        Requirement::less_than(10),
    ]
    .into();
    assert!(range.evaluate(Some(&int(5))));
    assert!(!range.evaluate(Some(&int(10))));

    let outside = Requirement::either(Requirement::less_than(0), Requirement::greater_than(10));
    assert!(outside.evaluate(Some(&int(-1))));
    assert!(outside.evaluate(Some(&int(11))));
    assert!(!outside.evaluate(Some(&int(5))));
}

#[test]
fn test_not_negates_the_whole_group() {
    // fails only when both members pass
    let not_small_positive = Requirement::not(vec![
        Requirement::greater_than(0),
        Requirement::less_than(10),
    ]);
    assert!(!not_small_positive.evaluate(Some(&int(5))));
    assert!(not_small_positive.evaluate(Some(&int(-5))));
    assert!(not_small_positive.evaluate(Some(&int(50))));

    let absent = Requirement::not(Requirement::exists());
    assert!(absent.evaluate(None));
    assert!(absent.evaluate(Some(&FieldValue::Null)));
    assert!(!absent.evaluate(Some(&int(1))));
}

#[test]
fn test_optional_but_bounded() {
    let requirement = Requirement::either(
        Requirement::not(Requirement::exists()),
        vec![Requirement::greater_than(0), Requirement::less_than(100)],
    );
    assert!(requirement.evaluate(None));
    assert!(requirement.evaluate(Some(&int(42))));
    assert!(!requirement.evaluate(Some(&int(420))));
}

#[test]
fn test_any_of_flattens() {
    let nested = Requirement::any_of([
        Requirement::either(Requirement::equal_to(1), Requirement::equal_to(2)),
        Requirement::equal_to(3),
    ]);
    match &nested {
        Requirement::Any(members) => assert_eq!(members.len(), 3),
        other => panic!("unexpected {:?}", other),
    }
    assert!([1, 2, 3].iter().all(|n| nested.evaluate(Some(&int(*n)))));
    assert!(!nested.evaluate(Some(&int(4))));
}

#[test]
fn test_custom_predicates() {
    let even = Requirement::passes(|value| value.and_then(FieldValue::as_i64).is_some_and(|n| n % 2 == 0));
    assert!(even.evaluate(Some(&int(4))));
    assert!(!even.evaluate(Some(&int(5))));
    assert!(!even.evaluate(None));

    let code = Requirement::matches(r"^[A-Z]{3}$").unwrap();
    assert!(code.evaluate(Some(&FieldValue::from("EUR"))));
    assert!(!code.evaluate(Some(&FieldValue::from("euro"))));
    assert!(!code.evaluate(Some(&int(3))));

    assert!(Requirement::matches("(unclosed").is_err());
}

#[test]
fn test_display() {
    assert_eq!(Requirement::exists().to_string(), "exists");
    assert_eq!(Requirement::greater_than(3).to_string(), "> 3");
    assert_eq!(Requirement::less_than_or_equal_to(2.5).to_string(), "<= 2.5");
}
