use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use muxr::{Request, Router};

fn zoo_router() -> Router {
    let mut zoo = Router::new();
    zoo.get("/zoo/animals", |_req, _res| {})
        .and_then(|r| r.post("/zoo/animals", |_req, _res| {}))
        .and_then(|r| r.get("/zoo/animals/{id}", |_req, _res| {}))
        .and_then(|r| r.put("/zoo/animals/{id}", |_req, _res| {}))
        .and_then(|r| r.patch("/zoo/animals/{id}", |_req, _res| {}))
        .and_then(|r| r.delete("/zoo/animals/{id}", |_req, _res| {}))
        .and_then(|r| r.get("/zoo/animals/{id}/toys/{toy_id}", |_req, _res| {}))
        .and_then(|r| {
            r.get(
                "/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}",
                |_req, _res| {},
            )
        })
        .and_then(|r| r.head("/zoo/health", |_req, _res| {}))
        .and_then(|r| r.options("/zoo/health", |_req, _res| {}))
        .and_then(|r| r.trace("/zoo/health", |_req, _res| {}))
        .expect("zoo routes");

    let mut router = Router::new();
    router
        .get("/", |_req, _res| {})
        .and_then(|r| {
            r.post(
                "/inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}",
                |_req, _res| {},
            )
        })
        .and_then(|r| r.get("/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}", |_req, _res| {}))
        .and_then(|r| r.get("/static/{path...}", |_req, _res| {}))
        .and_then(|r| r.mount("/zoo", zoo))
        .expect("root routes");
    router
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = zoo_router();
    let test_paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
        (Method::GET, "/static/css/site.css"),
    ];

    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in &test_paths {
                let res = router.route(method.clone(), path);
                black_box(&res);
            }
        })
    });

    c.bench_function("dispatch_not_found", |b| {
        b.iter(|| {
            let res = router.dispatch(Request::new(Method::GET, "/zoo/nothing/here"));
            black_box(res.status);
        })
    });

    c.bench_function("dispatch_method_not_allowed", |b| {
        b.iter(|| {
            let res = router.dispatch(Request::new(Method::DELETE, "/zoo/animals"));
            black_box(res.status);
        })
    });
}

criterion_group!(benches, bench_route_throughput);
criterion_main!(benches);
