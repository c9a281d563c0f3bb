pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod logout;
pub use self::logout::logout;

pub mod me;
pub use self::me::me;

pub mod ping;
pub use self::ping::ping;

use axum::http::StatusCode;

// Unknown `/api` paths land here only after the security chain granted them
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
