//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//!
//! # Catalog
//! GET    /products?sector&min&max&neck        - Filtered product list
//! GET    /products/filters                    - Filter panel options
//! GET    /products/{id}                       - Product detail
//!
//! # Quote cart (session)
//! GET    /quote                               - Cart and quote form state
//! POST   /quote/items                         - Add product
//! POST   /quote/items/{id}                    - Set quantity (<= 0 removes)
//! DELETE /quote/items/{id}                    - Remove line
//! POST   /quote/clear | /quote/open | /quote/close
//! POST   /quote/request/open | /quote/request/close
//! POST   /quote/request                       - Send quote request
//!
//! # Admin
//! POST   /admin/login | /admin/logout | /admin/exit
//! GET    /admin/products                      - All records, custom marked
//! GET    /admin/editor                        - Editor state
//! POST   /admin/editor/draft                  - Merge draft fields
//! POST   /admin/editor/image                  - Multipart image upload
//! POST   /admin/editor/edit/{id}              - Edit existing record
//! POST   /admin/editor/reset                  - Back to create mode
//! POST   /admin/editor/submit                 - Create or update
//! POST   /admin/products/{id}/delete          - Request deletion
//! POST   /admin/products/{id}/delete/confirm  - Confirm or cancel
//! ```

pub mod admin;
pub mod products;
pub mod quote;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use preforma_core::ProductImage;

use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/filters", get(products::filters))
        .route("/{id}", get(products::show))
}

/// Create the quote cart routes router.
pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(quote::show))
        .route("/items", post(quote::add))
        .route("/items/{id}", post(quote::update).delete(quote::remove))
        .route("/clear", post(quote::clear))
        .route("/open", post(quote::open))
        .route("/close", post(quote::close))
        .route("/request", post(quote::submit))
        .route("/request/open", post(quote::open_request))
        .route("/request/close", post(quote::close_request))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/exit", post(admin::exit))
        .route("/products", get(admin::products))
        .route("/products/{id}/delete", post(admin::request_delete))
        .route("/products/{id}/delete/confirm", post(admin::confirm_delete))
        .route("/editor", get(admin::editor))
        .route("/editor/draft", post(admin::update_draft))
        .route(
            "/editor/image",
            post(admin::upload_image).layer(DefaultBodyLimit::max(
                ProductImage::MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route("/editor/edit/{id}", post(admin::start_edit))
        .route("/editor/reset", post(admin::reset))
        .route("/editor/submit", post(admin::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/quote", quote_routes())
        .nest("/admin", admin_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}
