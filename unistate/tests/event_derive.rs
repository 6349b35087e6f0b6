//! Tests for #[derive(Event)] macro

use unistate::testing::in_category;
use unistate::{Event, EventCategory, EventSummary};

#[derive(Event, Clone, Debug, PartialEq)]
enum PlainEvent {
    Appeared,
    Loaded(u32),
    Moved { x: i32, y: i32 },
}

#[derive(Event, Clone, Debug, PartialEq)]
#[event(infer_categories, summary)]
enum CheckoutEvent {
    SubmitTapped,
    PaymentSubmit,
    PaymentDidSucceed(u64),
    PaymentDidFail(String),
    ErrorDismissed,
    DetailsEntered { name: String },
    #[event(category = "lifecycle")]
    Appeared,
    #[event(skip_category)]
    ErrorCleared,
    DidTimeout,
}

#[test]
fn test_name_for_all_variant_shapes() {
    assert_eq!(PlainEvent::Appeared.name(), "Appeared");
    assert_eq!(PlainEvent::Loaded(3).name(), "Loaded");
    assert_eq!(PlainEvent::Moved { x: 1, y: 2 }.name(), "Moved");
}

#[test]
fn test_inferred_categories() {
    assert_eq!(CheckoutEvent::PaymentSubmit.category(), Some("payment"));
    assert_eq!(CheckoutEvent::PaymentDidSucceed(1).category(), Some("payment"));
    assert_eq!(
        CheckoutEvent::PaymentDidFail("card declined".into()).category(),
        Some("payment")
    );
    assert_eq!(CheckoutEvent::ErrorDismissed.category(), Some("error"));
    assert_eq!(
        CheckoutEvent::DetailsEntered { name: "Ada".into() }.category(),
        Some("details")
    );
    assert_eq!(CheckoutEvent::DidTimeout.category(), Some("async_result"));
}

#[test]
fn test_uncategorized_and_overrides() {
    assert_eq!(CheckoutEvent::SubmitTapped.category(), None);
    assert_eq!(CheckoutEvent::Appeared.category(), Some("lifecycle"));
    assert_eq!(CheckoutEvent::ErrorCleared.category(), None);
    assert_eq!(
        CheckoutEvent::SubmitTapped.category_enum(),
        CheckoutEventCategory::Uncategorized
    );
}

#[test]
fn test_category_enum() {
    assert_eq!(
        CheckoutEvent::PaymentDidFail(String::new()).category_enum(),
        CheckoutEventCategory::Payment
    );
    assert_eq!(CheckoutEventCategory::Payment.name(), "payment");
    assert_eq!(CheckoutEventCategory::Uncategorized.name(), "uncategorized");

    let names: Vec<_> = CheckoutEventCategory::all().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["async_result", "details", "error", "lifecycle", "payment", "uncategorized"]
    );
}

#[test]
fn test_predicates() {
    let failed = CheckoutEvent::PaymentDidFail("card declined".into());
    assert!(failed.is_payment());
    assert!(!failed.is_error());
    assert!(CheckoutEvent::ErrorDismissed.is_error());
    assert!(!CheckoutEvent::ErrorCleared.is_error());
}

#[test]
fn test_trait_impls() {
    fn category_of<E: EventCategory>(event: &E) -> Option<&'static str> {
        event.category()
    }
    fn summary_of<E: EventSummary>(event: &E) -> String {
        event.summary()
    }

    let event = CheckoutEvent::PaymentDidSucceed(42);
    assert_eq!(category_of(&event), Some("payment"));
    assert_eq!(summary_of(&event), "PaymentDidSucceed(42)");
}

#[test]
fn test_filter_by_category() {
    let events = vec![
        CheckoutEvent::SubmitTapped,
        CheckoutEvent::PaymentDidSucceed(7),
        CheckoutEvent::ErrorDismissed,
        CheckoutEvent::PaymentDidFail("expired".into()),
    ];

    let payment = in_category(&events, "payment");
    assert_eq!(
        payment,
        vec![
            CheckoutEvent::PaymentDidSucceed(7),
            CheckoutEvent::PaymentDidFail("expired".into()),
        ]
    );
}
