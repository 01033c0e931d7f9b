pub mod config;
pub mod domain;
pub mod errors;
pub mod submission;

pub use domain::agent::{Agent, AgentId, AgentListing, NewAgent, Pricing, PricingType};
pub use domain::dimension::{slugify, Category, DimensionId, DimensionKind, NewDimension, Tag};
pub use domain::review::{Rating, RatingSummary, Review, ReviewDraft};
pub use errors::{
    ApplicationError, DomainError, InterfaceError, PersistenceError, SubmissionError,
    ValidationError, SUBMISSION_RETRY_MESSAGE,
};
pub use submission::form::{FormEvent, FormStep, FormTransitionError, SubmissionForm};
pub use submission::normalizer::{
    normalize_submission, ListingWriter, ResolvedDimension, SubmissionReceipt,
};
pub use submission::{AgentSubmission, ValidatedSubmission};
