//! The HTTP surface of the storefront.

use std::future::Future;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQLRequest;
use async_graphql_axum::GraphQLResponse;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::configuration;
use crate::graphql::StorefrontSchema;

/// The routes served for `schema`.
pub fn router(schema: StorefrontSchema, server: &configuration::Server) -> Router {
    let graphql = if server.graphiql {
        let page = GraphiQLSource::build().endpoint(&server.graphql_path).finish();
        get(move || {
            let page = page.clone();
            async move { Html(page) }
        })
        .post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    Router::new()
        .route(&server.graphql_path, graphql)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(schema)
}

async fn graphql_handler(
    State(schema): State<StorefrontSchema>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

/// Serves `schema` on the configured address until `shutdown` resolves.
pub async fn serve<F>(
    schema: StorefrontSchema,
    server: &configuration::Server,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server.listen).await?;
    tracing::info!(
        listen = %listener.local_addr()?,
        graphql_path = %server.graphql_path,
        "storefront is ready"
    );
    axum::serve(listener, router(schema, server))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("storefront stopped");
    Ok(())
}
