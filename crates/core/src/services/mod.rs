//! Business services.

mod poll;
mod profile;
mod walkthrough;

pub use poll::{CreatePollInput, PollService};
pub use profile::ProfileService;
pub use walkthrough::{ClientInfo, WalkthroughService};
