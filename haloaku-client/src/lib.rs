//! A UI drives a load like this:
//!
//! ```no_run
//! # async fn load(
//! #     api: &haloaku_client::api::ApiClient,
//! #     state: &std::sync::Mutex<haloaku_client::state::FeedState>,
//! #     session: &haloaku_common::model::session::SessionId,
//! # ) {
//! let ticket = state.lock().unwrap().begin_load();
//! let result = api
//!     .fetch_feed(ticket.request(), ticket.query(), Some(session))
//!     .await;
//! state.lock().unwrap().finish_load(ticket, result);
//! # }
//! ```
//!
//! The lock is not held across the request, so a newer load can start while
//! an older one is in flight; the older result is then discarded.

pub mod api;
pub mod debounce;
pub mod session;
pub mod state;
