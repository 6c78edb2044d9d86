use criterion::{criterion_group, criterion_main, Criterion};
use fjson::{from_str, to_string, Described, NamingConvention, TypeDescription, TypeDescriptionBuilder, Value};

#[derive(Debug, Clone, PartialEq)]
struct Event {
    id: i64,
    kind: String,
    score: f64,
    tags: Vec<String>,
}

impl Described for Event {
    fn describe(convention: NamingConvention) -> TypeDescription<Event> {
        TypeDescriptionBuilder::new(convention)
            .member(
                "Id",
                |e: &Event| Value::from(e.id),
                |e: &mut Event, v| {
                    if let Value::Number(n) = v {
                        e.id = n.as_f64() as i64;
                    }
                },
            )
            .member(
                "Kind",
                |e: &Event| Value::from(e.kind.as_str()),
                |e: &mut Event, v| {
                    if let Value::String(s) = v {
                        e.kind = s;
                    }
                },
            )
            .member(
                "Score",
                |e: &Event| Value::from(e.score),
                |e: &mut Event, v| {
                    if let Value::Number(n) = v {
                        e.score = n.as_f64();
                    }
                },
            )
            .member(
                "Tags",
                |e: &Event| Value::Array(e.tags.iter().map(|t| Value::from(t.as_str())).collect()),
                |e: &mut Event, v| {
                    if let Value::Array(items) = v {
                        e.tags = items.into_iter().filter_map(|i| i.as_str().map(str::to_string)).collect();
                    }
                },
            )
            .default_constructor(|| Event { id: 0, kind: String::new(), score: 0.0, tags: Vec::new() })
            .build()
    }
}

fn sample_events(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| Event {
            id: i as i64,
            kind: "page_view".to_string(),
            score: i as f64 * 0.5,
            tags: vec!["a".to_string(), "b".to_string()],
        })
        .collect()
}

pub fn serialize_events(c: &mut Criterion) {
    let events = sample_events(1000);
    c.bench_function("serialize_1000_events", |b| {
        b.iter(|| {
            for e in &events {
                let _ = to_string(e).unwrap();
            }
        })
    });
}

pub fn deserialize_events(c: &mut Criterion) {
    let events = sample_events(1000);
    let docs: Vec<String> = events.iter().map(|e| to_string(e).unwrap()).collect();
    c.bench_function("deserialize_1000_events", |b| {
        b.iter(|| {
            for doc in &docs {
                let _: Event = from_str(doc).unwrap();
            }
        })
    });
}

criterion_group!(benches, serialize_events, deserialize_events);
criterion_main!(benches);
