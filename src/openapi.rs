//! OpenAPI document and the Swagger UI / ReDoc routers serving it.

use crate::handlers;
use crate::models::{
    AccessToken, Category, CategoryPayload, LoginPayload, Product, ProductPayload, RefreshPayload, RegisterPayload,
    RegisteredUser, TokenPair,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = r#"
Product and category catalog.

Reads are public. Writes require an access token from `POST /api/auth/login/`:

```
Authorization: Bearer <access token>
```
"#
    ),
    paths(
        handlers::category::list,
        handlers::category::create,
        handlers::category::read,
        handlers::category::update,
        handlers::category::partial_update,
        handlers::category::delete,
        handlers::product::list,
        handlers::product::create,
        handlers::product::read,
        handlers::product::update,
        handlers::product::partial_update,
        handlers::product::delete,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
    ),
    components(schemas(
        Category,
        CategoryPayload,
        Product,
        ProductPayload,
        RegisterPayload,
        RegisteredUser,
        LoginPayload,
        TokenPair,
        RefreshPayload,
        AccessToken,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "categories", description = "Product categories"),
        (name = "products", description = "Products with filtering, search, ordering and pagination"),
        (name = "auth", description = "Registration and JWT tokens")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger").url(OPENAPI_JSON, ApiDoc::openapi())
}

pub fn redoc() -> Redoc<utoipa::openapi::OpenApi> {
    Redoc::with_url("/redoc/", ApiDoc::openapi())
}
