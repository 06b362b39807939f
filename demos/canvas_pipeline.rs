//! Canvas pipeline demonstration.
//!
//! This example runs three requests through a pipeline built from config:
//! 1. A mocked canvas URL, signed and wrapped locally
//! 2. An unsigned request that the guard turns away
//! 3. A request carrying a signature made with the wrong secret
//!
//! Run with: `cargo run --example canvas_pipeline`

use marketplace_canvas::web::{guard, Handler, MarketRequest, MarketResponse, Pipeline};
use marketplace_canvas::{signature, MarketplaceConfig, MockSimulationConfig};

fn main() {
    println!("=== Canvas Pipeline Example ===\n");

    let config = MarketplaceConfig::with_secret("demo-secret")
        .mock(MockSimulationConfig::new("demo"));
    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Could not build pipeline: {}", e);
            return;
        }
    };
    println!("Layers: {:?}\n", pipeline.layer_names());

    let home = guard(|request: &MarketRequest| match request.marketplace() {
        Some(ctx) => MarketResponse::html(format!(
            "<body><p>Hello portal {}</p><a href=\"/reports\">Reports</a></body>",
            ctx.hub_id().unwrap_or_default()
        )),
        None => MarketResponse::new(500),
    });
    let router = |request: &MarketRequest| home.handle(request);

    // Scenario 1: the mock fills in a signed context for a local canvas URL
    println!("--- Scenario 1: Mocked Canvas Request ---");
    let mut request = MarketRequest::get("req-mock", "/market/42/canvas/demo/");
    let response = pipeline.handle(&mut request, &router);
    println!("Rewritten path: {}", request.path());
    println!("Auth state: {:?}", request.auth_state());
    println!("Status: {}", response.status());
    println!("Body:\n{}\n", response.text().unwrap_or("<binary>"));

    // Scenario 2: no signature at all
    println!("--- Scenario 2: Unsigned Request ---");
    let mut request = MarketRequest::get("req-unsigned", "/dashboard");
    let response = pipeline.handle(&mut request, &router);
    println!("Auth state: {:?}", request.auth_state());
    println!("Status: {} (handler never ran)\n", response.status());

    // Scenario 3: signed, but not with our secret
    println!("--- Scenario 3: Forged Signature ---");
    let forged = signature::sign(b"not-the-secret", b"payload");
    let mut request = MarketRequest::get("req-forged", "/dashboard")
        .with_query(&format!("hubspot.marketplace.signature={}", forged));
    let response = pipeline.handle(&mut request, &router);
    println!("Auth state: {:?}", request.auth_state());
    println!("Status: {}", response.status());

    println!("\n=== Example Complete ===");
}
