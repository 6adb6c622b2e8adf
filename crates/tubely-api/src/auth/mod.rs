pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{get_bearer_token, JwtService, TOKEN_ISSUER};
pub use middleware::auth_middleware;
pub use models::{JwtClaims, UserContext};
