pub mod jwt;
pub mod scope;

pub use jwt::{extract_jwt_from_header, Claims, JwtVerifier, Principal};
pub use scope::{allow, RANKING_SCOPE};
