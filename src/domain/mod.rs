//! Domain value objects and types.
//!
//! Type-safe wrappers for the identity of a test definition and the declared
//! type of its parameters. Both are validated at construction time.

pub mod errors;
pub mod param_type;
pub mod test_id;

pub use errors::ValidationError;
pub use param_type::ParamType;
pub use test_id::TestId;
