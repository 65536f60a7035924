// storefront/src/services/mod.rs

pub mod avatar_storage;
pub mod jwt;
pub mod mercadopago;
pub mod payment_sandbox;

pub use avatar_storage::LocalDirStorage;
pub use jwt::JwtVerifier;
pub use mercadopago::MercadoPagoGateway;
pub use payment_sandbox::SandboxGateway;
