//! # Fanout Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | `chunk` over 10k followers | < 1ms |
//! | Fanout to 1k followers (in-memory store, 3 chunks) | < 50ms |
//! | Redelivered fanout (all writes unchanged) | faster than first run |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sg_01_document_store::InMemoryDocumentStore;
use sg_03_relationships::{EdgeSource, FollowEdge, RelationshipStore};
use sg_05_post_fanout::{chunk, FanoutConfig, FanoutEngine, PostFanout, PostRecord};
use serde_json::json;
use shared_types::{Clock, ManualClock, PostId, UserId};
use tokio::runtime::Runtime;

fn bench_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("sg-05-chunk");
    for size in [1_000usize, 10_000, 100_000] {
        let ids: Vec<u64> = (0..size as u64).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("chunk_450", size), &ids, |b, ids| {
            b.iter(|| black_box(chunk(ids, 450).len()))
        });
    }
    group.finish();
}

fn engine_with_followers(rt: &Runtime, followers: usize) -> (FanoutEngine, PostRecord) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
    let relationships = Arc::new(RelationshipStore::new(store.clone(), clock.clone()));

    rt.block_on(async {
        for i in 0..followers {
            let edge = FollowEdge::new(
                UserId::new(format!("F{i}")).expect("id"),
                UserId::new("A").expect("id"),
            )
            .expect("edge");
            relationships
                .create_pair(&edge, EdgeSource::Direct)
                .await
                .expect("edge pair");
        }
    });

    let engine = FanoutEngine::new(store, relationships, clock, FanoutConfig::default()).expect("engine");
    let raw = match json!({ "authorId": "A", "title": "Bench", "status": "published" }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let post = PostRecord::normalize(PostId::new("P1").expect("id"), &raw).expect("post");
    (engine, post)
}

fn bench_fanout(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("sg-05-fanout");
    group.measurement_time(Duration::from_secs(10));

    for followers in [100usize, 1_000] {
        let (engine, post) = engine_with_followers(&rt, followers);
        group.throughput(Throughput::Elements(followers as u64));
        // After the first iteration every write is unchanged, which is the
        // redelivery path.
        group.bench_with_input(BenchmarkId::new("fanout", followers), &post, |b, post| {
            b.iter(|| rt.block_on(engine.fanout(post)).expect("fanout"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chunk, bench_fanout);
criterion_main!(benches);
