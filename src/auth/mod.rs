pub mod auth_dto;
pub mod auth_service;
pub mod jwt;

pub use auth_dto::{AuthResponse, LoginRequest, RegisterRequest, User};
pub use auth_service::AuthService;
pub use jwt::{expires_at, is_token_usable, Claims};
