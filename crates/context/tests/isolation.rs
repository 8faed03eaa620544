use std::time::Duration;

use ctxlog_context::{Context, current, run, spawn};
use serde_json::{Value, json};
use tokio::sync::Barrier;

fn request_id() -> Option<Value> {
    current().and_then(|ctx| ctx.get("requestId").cloned())
}

async fn observe(barrier: &Barrier) -> Vec<Option<Value>> {
    let mut seen = vec![request_id()];
    barrier.wait().await;
    seen.push(request_id());
    tokio::task::yield_now().await;
    seen.push(request_id());
    tokio::time::sleep(Duration::from_millis(2)).await;
    seen.push(request_id());
    barrier.wait().await;
    seen.push(request_id());
    seen
}

#[tokio::test(flavor = "current_thread")]
async fn interleaved_tasks_on_one_thread_stay_isolated() {
    let barrier = Barrier::new(2);
    let (x, y) = tokio::join!(
        run(json!({"requestId": "X"}), observe(&barrier)),
        run(json!({"requestId": "Y"}), observe(&barrier)),
    );

    assert!(x.iter().all(|v| v == &Some(json!("X"))), "{x:?}");
    assert!(y.iter().all(|v| v == &Some(json!("Y"))), "{y:?}");
    assert!(current().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_tasks_across_workers_stay_isolated() {
    let mut handles = Vec::new();
    for i in 0..32 {
        let ctx = Context::new().with("requestId", format!("req-{i}"));
        handles.push(tokio::spawn(run(ctx, async move {
            let mut mismatches = 0;
            for _ in 0..20 {
                tokio::task::yield_now().await;
                let nested = spawn(async { request_id() }).await.unwrap();
                if request_id() != Some(json!(format!("req-{i}"))) || nested != request_id() {
                    mismatches += 1;
                }
            }
            mismatches
        })));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 0);
    }
}

#[tokio::test(flavor = "current_thread")]
async fn nested_run_restores_outer_context() {
    run(json!({"requestId": "outer", "tenant": "acme"}), async {
        let inner = run(json!({"requestId": "inner"}), async {
            tokio::task::yield_now().await;
            current().unwrap()
        })
        .await;
        assert_eq!(inner.get("requestId"), Some(&json!("inner")));
        assert!(inner.get("tenant").is_none());
        assert_eq!(request_id(), Some(json!("outer")));
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn panicking_task_does_not_leak_context() {
    let fail = true;
    let result = tokio::spawn(run(json!({"requestId": "doomed"}), async move {
        tokio::task::yield_now().await;
        if fail {
            panic!("handler failed");
        }
    }))
    .await;
    assert!(result.unwrap_err().is_panic());
    assert!(current().is_none());
    assert_eq!(ctxlog_context::depth(), 0);
}
