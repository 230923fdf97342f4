use axum::{http::Method, routing::get, Router};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::db::StatusStore;
use crate::web::routes::status_routes;

pub mod error;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StatusStore>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(store: Arc<dyn StatusStore>) -> Router {
    let app_state = Arc::new(AppState { store });

    // The dashboard polls /status from the browser, on its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(status_routes::create_status_router())
        .with_state(app_state)
        .layer(cors)
}

fn listen_on(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

/// Listens on every interface. The IPv6 wildcard also accepts IPv4
/// clients on dual-stack hosts; hosts without IPv6 get the IPv4 wildcard.
pub fn bind_listener(port: u16) -> io::Result<TcpListener> {
    match listen_on(SocketAddr::from((Ipv6Addr::UNSPECIFIED, port))) {
        Ok(listener) => Ok(listener),
        Err(e) => {
            warn!(error = %e, "Cannot listen on [::], falling back to 0.0.0.0.");
            listen_on(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_listener_accepts_ipv4_and_ipv6_clients() {
        let listener = bind_listener(0).unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_unspecified());

        TcpStream::connect((Ipv4Addr::LOCALHOST, addr.port()))
            .await
            .expect("IPv4 client should connect");
        if addr.is_ipv6() {
            TcpStream::connect((Ipv6Addr::LOCALHOST, addr.port()))
                .await
                .expect("IPv6 client should connect");
        }
    }
}
