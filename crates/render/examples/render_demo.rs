//! Render demo - registering components, rendering a page, resolving a
//! deferred boundary.

use element::wire::BOUNDARY_ID_PROP;
use element::{ComponentFn, Element, ElementValue, LazyValue, Props};
use render::{ComponentKind, RenderEngine};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let engine = RenderEngine::default();

    // A server page component: a heading plus a deferred feed behind a
    // suspense boundary.
    engine.register_component(
        "app/pages/home#Home",
        ComponentFn::from_sync("Home", |mut props: Props| {
            let title = match props.remove("title") {
                Some(ElementValue::String(s)) => s,
                _ => "Home".to_string(),
            };

            let feed = Element::boundary(
                Props::new()
                    .with("fallback", "Loading feed...")
                    .with(BOUNDARY_ID_PROP, "home-feed"),
            )
            .with_children(ElementValue::Lazy(LazyValue::new(async {
                // Stands in for a slow data fetch.
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                Ok(ElementValue::from(
                    Element::host("ul", Props::new()).with_children(ElementValue::list([
                        Element::host("li", Props::new()).with_children("first entry").into(),
                        Element::host("li", Props::new()).with_children("second entry").into(),
                    ])),
                ))
            })));

            Ok(ElementValue::from(
                Element::host("div", Props::new().with("className", "page")).with_children(
                    ElementValue::list([
                        Element::host("h1", Props::new()).with_children(title).into(),
                        feed.into(),
                    ]),
                ),
            ))
        }),
        ComponentKind::Server,
    );

    // A client component: never invoked here, shipped as a reference.
    engine.register_client_component("app/widgets/chat#Chat");

    let wire = engine
        .render_page_wire("app/pages/home#Home", json!({"title": "Welcome"}))
        .await?;
    println!("wire: {wire}");

    // The client later asks for the deferred boundary content by id.
    let feed = engine.resolve_pending("home-feed").await?;
    println!("resolved boundary: {feed}");

    // Lightweight structural form, for layout composition.
    let structural = engine
        .render_page_element("app/pages/home#Home", json!({"title": "Welcome"}))
        .await?;
    println!("structural: {structural}");

    println!("stats: {}", serde_json::to_string(&engine.stats())?);

    engine.end_session();
    Ok(())
}
