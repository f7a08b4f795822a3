use std::{sync::Arc, time::Duration};

use stats::{runtime::runtime_from_context, Context, DebuggingStats};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let stats = Arc::new(DebuggingStats::new());
    let snapshotter = stats.snapshotter();
    let ctx = Context::background().with_stats(stats).with_cancel();

    let sampler = tokio::spawn({
        let ctx = ctx.clone();
        async move { runtime_from_context(&ctx, Duration::from_millis(250)).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    ctx.cancel();
    sampler.await.expect("sampler task panicked");

    for metric in snapshotter.snapshot() {
        println!("{} = {:?}", metric.name(), metric.value());
    }
}
