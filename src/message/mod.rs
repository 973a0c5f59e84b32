//! Request and response messages carried inside frames.

mod request;
mod response;

pub use request::{Query, Request, TEST_AUTH_TYPE};
pub use response::{Response, RevealPolicy, SessionView, MASK_TOKEN};
