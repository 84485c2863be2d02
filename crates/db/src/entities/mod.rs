//! Database entities.

pub mod answer;
pub mod answer_profile;
pub mod poll;
pub mod profile;
pub mod question;
pub mod walkthrough;
pub mod walkthrough_answer;
pub mod walkthrough_profile;
pub mod walkthrough_question;

pub use answer::Entity as Answer;
pub use answer_profile::Entity as AnswerProfile;
pub use poll::Entity as Poll;
pub use profile::Entity as Profile;
pub use question::Entity as Question;
pub use walkthrough::Entity as Walkthrough;
pub use walkthrough_answer::Entity as WalkthroughAnswer;
pub use walkthrough_profile::Entity as WalkthroughProfile;
pub use walkthrough_question::Entity as WalkthroughQuestion;
