pub mod code;
pub mod jwt;

pub use code::RandomCodeGenerator;
pub use jwt::{verify_token, JwtConfig, MemberClaims};
