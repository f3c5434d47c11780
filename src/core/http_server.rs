use crate::communication::Notifier;
use crate::configuration::{Context, NotificationConfig};
use crate::core::service_manager::{Error as ServiceManagerError, Service};
use crate::database::Repository;
use crate::pricing::PricingProfile;
use crate::{delivery, inventory, orders, quotation};
use async_trait::async_trait;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method, StatusCode,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub notifier: Arc<dyn Notifier>,
    pub notifications: NotificationConfig,
    pub quotation_profile: Arc<PricingProfile>,
    pub order_profile: Arc<PricingProfile>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
        notifications: NotificationConfig,
        currency: &str,
    ) -> Self {
        Self {
            repository,
            notifier,
            notifications,
            quotation_profile: Arc::new(PricingProfile::quotation(currency)),
            order_profile: Arc::new(PricingProfile::order(currency)),
        }
    }

    pub fn from_context(context: &Context) -> Self {
        Self::new(
            context.repository.clone(),
            context.notifier.clone(),
            context.config.notifications.clone(),
            &context.config.pricing.currency,
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/quotation-calculator",
            post(quotation::calculate_quotation).options(preflight),
        )
        .route(
            "/pricing-calculator",
            post(orders::calculate_order_pricing).options(preflight),
        )
        .route(
            "/delivery-calculator",
            post(delivery::calculate_delivery).options(preflight),
        )
        .route(
            "/quotation-status-updater",
            post(quotation::update_quotation_status)
                .put(quotation::update_quotation_status)
                .options(preflight),
        )
        .route(
            "/order-status-updater",
            post(orders::update_order_status).options(preflight),
        )
        .route(
            "/inventory-tracker",
            post(inventory::track_inventory).options(preflight),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .max_age(Duration::from_secs(86400))
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub struct HttpService {
    port: u16,
    state: AppState,
}

#[async_trait]
impl Service for HttpService {
    type Context = Context;

    async fn new(context: Context) -> Self {
        Self {
            port: context.config.http.port,
            state: AppState::from_context(&context),
        }
    }

    async fn run(self) -> Result<(), ServiceManagerError> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.port))
            .await
            .map_err(|e| ServiceManagerError::new(&format!("Failed to bind port: {}", e)))?;

        info!("HTTP server running on port {}", self.port);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServiceManagerError::from)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{send, state};
    use super::*;
    use crate::communication::notifier::testing::FailingNotifier;
    use crate::database::memory::InMemoryRepository;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;

    fn test_state() -> AppState {
        state(Arc::new(InMemoryRepository::new()), Arc::new(FailingNotifier))
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/quotation-calculator")
            .header("origin", "https://woodex.example")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type,apikey")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("OPTIONS"));
        assert_eq!(headers["access-control-max-age"], "86400");
    }

    #[tokio::test]
    async fn test_plain_options_request() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/pricing-calculator")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_cors_headers_on_responses() {
        let request = Request::get("/health")
            .header("origin", "https://woodex.example")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send(test_state(), request).await;

        assert_eq!(headers["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::get("/create-payment-intent").body(Body::empty()).unwrap();
        let (status, _, _) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
