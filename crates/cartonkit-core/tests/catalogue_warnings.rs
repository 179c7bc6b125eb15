use cartonkit_core::FluteCatalogue;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Default)]
struct WarnCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}

fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let layer = WarnCapture::default();
    let messages = layer.messages.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let warnings = messages.lock().unwrap().clone();
    (out, warnings)
}

#[test]
fn test_dropped_and_duplicate_rows_are_reported() {
    let blob = json!([
        {"flute": "B", "thickness": 3},
        {"thickness": 4},
        {"flute": "C", "thickness": -1},
        {"flute": "b", "thickness": 3.2}
    ]);
    let (cat, warnings) = capture_warnings(|| FluteCatalogue::from_value(&blob));

    assert_eq!(cat.len(), 1);
    assert_eq!(cat.thickness_for("B"), Some(3.2));
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].contains("without a code"));
    assert!(warnings[1].starts_with("Dropping flute row 'C'"));
    assert!(warnings[2].contains("Duplicate flute B"));
}

#[test]
fn test_clean_catalogue_is_quiet() {
    let blob = serde_json::to_value(FluteCatalogue::standard()).unwrap();
    let (cat, warnings) = capture_warnings(|| FluteCatalogue::from_value(&blob));
    assert_eq!(cat, FluteCatalogue::standard());
    assert!(warnings.is_empty());
}

#[test]
fn test_non_array_falls_back_with_warning() {
    let (cat, warnings) = capture_warnings(|| FluteCatalogue::from_value(&json!("flutes")));
    assert_eq!(cat, FluteCatalogue::standard());
    assert_eq!(warnings.len(), 1);
}
