//! Rowbound-Common: shared types for the rowbound persistence layer.
//!
//! - **Error Handling**: the single typed error channel and result alias
//! - **Values**: the tagged scalar stored in an entity's property bag
//! - **Identifiers**: validation for table and column names
//!
//! # Examples
//!
//! ```
//! use rowbound_common::{ident::is_identifier, Error, Result, Value};
//!
//! let year = Value::from(1965);
//! assert_eq!(year.as_i64(), Some(1965));
//! assert!(is_identifier("books"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::validation("nothing to update"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ident;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;
