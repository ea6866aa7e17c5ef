use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use http::{Method, StatusCode};
use muxr::method::STANDARD_METHODS;
use muxr::{Request, Response, RouteError, Router};

type BoxedHandler = Box<dyn Fn(&mut Request, &mut Response) + Send + Sync>;
type Register = fn(&mut Router, &str, BoxedHandler) -> Result<(), RouteError>;

fn counting(counter: &Arc<AtomicUsize>) -> BoxedHandler {
    let counter = Arc::clone(counter);
    Box::new(move |_req, _res| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

macro_rules! register {
    ($name:ident) => {
        (|router: &mut Router, pattern: &str, handler: BoxedHandler| {
            router.$name(pattern, move |req, res| handler(req, res)).map(|_| ())
        }) as Register
    };
}

fn verb_zoo() -> [(Method, Register, &'static str); 9] {
    [
        (Method::GET, register!(get), "/hello_get"),
        (Method::HEAD, register!(head), "/hello_head"),
        (Method::POST, register!(post), "/hello_post"),
        (Method::PUT, register!(put), "/hello_put"),
        (Method::PATCH, register!(patch), "/hello_patch"),
        (Method::DELETE, register!(delete), "/hello_delete"),
        (Method::CONNECT, register!(connect), "/hello_connect"),
        (Method::OPTIONS, register!(options), "/hello_options"),
        (Method::TRACE, register!(trace), "/hello_trace"),
    ]
}

#[test]
fn test_each_method_helper_serves_only_its_method() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    for (_, register, route) in verb_zoo() {
        register(&mut router, route, counting(&count)).unwrap();
    }

    for (method, _, route) in verb_zoo() {
        let res = router.dispatch(Request::new(method.clone(), route));
        assert_eq!(res.status, StatusCode::OK, "{method} {route}");
        assert_eq!(count.swap(0, Ordering::SeqCst), 1, "{method} {route}");

        for wrong in STANDARD_METHODS.iter().cloned() {
            if wrong == method || (wrong == Method::HEAD && method == Method::GET) {
                continue;
            }
            let res = router.dispatch(Request::new(wrong.clone(), route));
            assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED, "{wrong} {route}");
            assert_eq!(count.load(Ordering::SeqCst), 0, "{wrong} {route}");
        }
    }
}

#[test]
fn test_head_falls_back_to_get() {
    let mut router = Router::new();
    router
        .get("/doc", |_req, res| res.set_header("x-handler", "get"))
        .unwrap();

    let res = router.dispatch(Request::new(Method::HEAD, "/doc"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.get_header("x-handler"), Some("get"));
}

#[test]
fn test_explicit_head_wins_over_get() {
    let mut router = Router::new();
    router
        .get("/doc", |_req, res| res.set_header("x-handler", "get"))
        .unwrap()
        .head("/doc", |_req, res| res.set_header("x-handler", "head"))
        .unwrap();

    let res = router.dispatch(Request::new(Method::HEAD, "/doc"));
    assert_eq!(res.get_header("x-handler"), Some("head"));
    let res = router.dispatch(Request::new(Method::GET, "/doc"));
    assert_eq!(res.get_header("x-handler"), Some("get"));
}

#[test]
fn test_head_only_route_does_not_answer_get() {
    let mut router = Router::new();
    router.head("/ping", |_req, _res| {}).unwrap();

    let res = router.dispatch(Request::new(Method::GET, "/ping"));
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.get_header("allow"), Some("HEAD"));
}

#[test]
fn test_allow_header_unions_every_matching_route() {
    let mut router = Router::new();
    router
        .get("/items/{id}", |_req, _res| {})
        .unwrap()
        .put("/items/{id}", |_req, _res| {})
        .unwrap()
        .delete("/items/special", |_req, _res| {})
        .unwrap();

    let res = router.dispatch(Request::new(Method::POST, "/items/special"));
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.get_header("allow"), Some("GET, HEAD, PUT, DELETE"));
}

#[test]
fn test_less_specific_route_serves_method_the_specific_one_lacks() {
    let mut router = Router::new();
    router
        .get("/items/{id}", |_req, res| res.write(b"wildcard"))
        .unwrap()
        .delete("/items/special", |_req, res| res.write(b"literal"))
        .unwrap();

    let res = router.dispatch(Request::new(Method::GET, "/items/special"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body_text(), "wildcard");
    let res = router.dispatch(Request::new(Method::DELETE, "/items/special"));
    assert_eq!(res.body_text(), "literal");
}

#[test]
fn test_not_found_invokes_no_handler() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    let handler = counting(&count);
    router.get("/a/b", move |req, res| handler(req, res)).unwrap();

    for path in ["/a", "/a/b/c", "/b", "/a/bb"] {
        let res = router.dispatch(Request::new(Method::GET, path));
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{path}");
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_dispatch_is_idempotent() {
    let mut router = Router::new();
    router
        .get("/users/{id}", |req, res| {
            res.write(req.path_value("id").unwrap_or_default().as_bytes());
        })
        .unwrap();

    let first = router.dispatch(Request::new(Method::GET, "/users/9"));
    let second = router.dispatch(Request::new(Method::GET, "/users/9"));
    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);
    assert_eq!(
        router.route(Method::GET, "/users/9"),
        router.route(Method::GET, "/users/9")
    );
}

#[test]
fn test_query_string_is_ignored_for_routing() {
    let mut router = Router::new();
    router
        .get("/search", |req, res| {
            res.write(req.query_param("q").unwrap_or_default().as_bytes());
        })
        .unwrap();

    let res = router.dispatch(Request::new(Method::GET, "/search?q=rust+router"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body_text(), "rust router");
}

#[test]
fn test_specificity_is_left_to_right() {
    let mut router = Router::new();
    router
        .get("/{a}/b/c", |_req, _res| {})
        .unwrap()
        .get("/a/{b}/{c}", |_req, _res| {})
        .unwrap();

    let matched = router.route(Method::GET, "/a/b/c").unwrap();
    assert_eq!(&*matched.pattern, "/a/{b}/{c}");
}

#[test]
fn test_exact_route_beats_directory_route() {
    let mut router = Router::new();
    router
        .get("/static/", |_req, _res| {})
        .unwrap()
        .get("/static/app.js", |_req, _res| {})
        .unwrap();

    assert_eq!(
        &*router.route(Method::GET, "/static/app.js").unwrap().pattern,
        "/static/app.js"
    );
    assert_eq!(
        &*router.route(Method::GET, "/static/img/logo.png").unwrap().pattern,
        "/static/"
    );
}

#[test]
fn test_registration_errors() {
    let mut router = Router::new();
    for pattern in ["", "users", "/{}", "/{a}/{a}", "/{rest...}/x", "/x/{$}/y", "/a{b}"] {
        let err = router.get(pattern, |_req, _res| {}).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }), "{pattern}: {err}");
    }
    let err = router.handle_fn("FETCH!! /x", |_req, _res| {}).unwrap_err();
    assert!(matches!(err, RouteError::UnsupportedMethod { .. }));
    assert!(router.routes().is_empty());
}

#[test]
fn test_concurrent_dispatch() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    let handler = counting(&hits);
    router
        .get("/work/{id}", move |req, res| {
            handler(req, res);
            let id = req.path_value("id").unwrap_or_default().to_string();
            res.write(id.as_bytes());
        })
        .unwrap();

    thread::scope(|scope| {
        for worker in 0..8 {
            let router = &router;
            scope.spawn(move || {
                for i in 0..100 {
                    let id = format!("{worker}-{i}");
                    let res = router.dispatch(Request::new(Method::GET, &format!("/work/{id}")));
                    assert_eq!(res.body_text(), id);
                }
            });
        }
    });
    assert_eq!(hits.load(Ordering::SeqCst), 800);
}
