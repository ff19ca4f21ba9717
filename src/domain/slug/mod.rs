pub mod config;
pub mod scope;
pub mod services;

pub use config::{ScopeSpec, SlugConfig, SubjectSource};
pub use scope::{Constraint, Scope, SlugClaim, evaluate_scope};
pub use services::{Candidate, SlugOutcome, UniqueSlugService};
