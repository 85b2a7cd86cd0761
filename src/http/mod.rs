//! HTTP surface of the toolkit.
//!
//! # Data Flow
//! ```text
//! SyntheticRequestBuilder
//!     → request.rs (validate, seed route values)
//!     → SyntheticRequest
//!         → resolution engine (route testing)
//!         → response.rs (dispatch through tower::Service, buffer body)
//!             → ProducedResponse → cookie.rs (Set-Cookie parsing)
//! ```

pub mod cookie;
pub mod request;
pub mod response;

pub use cookie::{CookieOptions, ResponseCookie, SameSite};
pub use request::{RequestBuildError, SyntheticRequest, SyntheticRequestBuilder};
pub use response::{capture_response, CaptureError, ProducedResponse, ResponseCapture};
