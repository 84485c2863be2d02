//! Repository layer: thin async wrappers over the entities.

mod answer;
mod poll;
mod profile;
mod question;
mod walkthrough;

pub use answer::AnswerRepository;
pub use poll::PollRepository;
pub use profile::{AnswerProfileRepository, ProfileRepository};
pub use question::QuestionRepository;
pub use walkthrough::{WalkthroughProfileRepository, WalkthroughRepository};
