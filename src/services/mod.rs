// Service exports
pub mod api;
pub mod session;
pub mod store;
pub mod swiper;

pub use api::{ApiClient, ApiError, DatingApi, FieldErrors};
pub use session::{AuthSession, AuthState, token_is_live};
pub use store::{SessionStore, FileSessionStore, MemorySessionStore, StoreError};
pub use swiper::{Swiper, SwipeReply};
