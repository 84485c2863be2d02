//! Application state shared across handlers.

use profilingpoll_common::TokenSigner;
use profilingpoll_core::{PollService, WalkthroughService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Poll catalog reads.
    pub poll_service: PollService,
    /// Walkthrough progression and result resolution.
    pub walkthrough_service: WalkthroughService,
    /// Signs result tokens and the session cookie.
    pub signer: TokenSigner,
    /// Session cookie name.
    pub session_cookie: String,
}
