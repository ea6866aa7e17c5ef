//! `muxr-match`: build a router from the command line and report, as JSON
//! lines, which pattern each request would be routed to.
//!
//! ```text
//! muxr-match --route "GET /users/{id}" --route /static/ /users/7 /static/app.js /nope
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use http::Method;
use muxr::logging::{init_logging, LogConfig};
use muxr::{Handler, Request, Response, Router};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "muxr-match")]
#[command(about = "Show which route a request would be dispatched to", long_about = None)]
struct Cli {
    /// Route pattern to register, optionally prefixed by a method ("GET /a/{b}").
    /// Repeat for several routes; earlier routes win ties.
    #[arg(short, long = "route", required = true)]
    routes: Vec<String>,

    /// Request method used for every path
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Log level for router events (written to stderr)
    #[arg(long, env = "MUXR_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Request paths to resolve (query strings allowed)
    #[arg(required = true)]
    paths: Vec<String>,
}

#[derive(Serialize)]
struct MatchReport {
    method: String,
    path: String,
    status: u16,
    pattern: Option<String>,
    params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow: Option<String>,
}

#[derive(Serialize)]
struct Param {
    name: String,
    value: String,
}

fn build_router(routes: &[String]) -> Result<Router> {
    let mut router = Router::new();
    for route in routes {
        router
            .handle_fn(route, |_req, _res| {})
            .with_context(|| format!("cannot register route '{route}'"))?;
    }
    Ok(router)
}

fn resolve(router: &Router, method: &Method, target: &str) -> MatchReport {
    let mut req = Request::new(method.clone(), target);
    let mut res = Response::new();
    router.serve(&mut req, &mut res);

    MatchReport {
        method: method.to_string(),
        path: req.path.clone(),
        status: res.status.as_u16(),
        pattern: req.pattern().map(str::to_string),
        params: req
            .path_params
            .iter()
            .map(|(name, value)| Param {
                name: name.to_string(),
                value: value.clone(),
            })
            .collect(),
        allow: res.get_header("allow").map(str::to_string),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig {
        log_level: cli.log_level.clone(),
        ..LogConfig::from_env()
    })?;

    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{}'", cli.method))?;
    let router = build_router(&cli.routes)?;

    for path in &cli.paths {
        let report = resolve(&router, &method, path);
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
