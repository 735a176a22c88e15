//! Larder DI is a string-keyed dependency-injection container with lazy,
//! cached resolution.
//!
//! Larder DI is split into three major parts:
//! 1. Entries: named values or factory definitions, resolved on demand
//! 2. Providers: units that bulk-register entries the first time one of
//!    their declared ids is requested
//! 3. The Container: the facade routing `get`/`make`/`has` between the two
//!
//! # Examples
//!
//! ```rust
//! use larder_di::{value, Container};
//!
//! let container = Container::new();
//! container.add_value("app.name", "demo");
//! container.add_definition("app.greeting", |_| {
//!     Ok(value(String::from("hello")))
//! });
//!
//! let name = container.get_as::<&str>("app.name").unwrap();
//! assert_eq!(*name, "demo");
//!
//! // Definitions are invoked once and cached afterwards
//! let greeting = container.get_as::<String>("app.greeting").unwrap();
//! assert_eq!(*greeting, "hello");
//! ```
//!
//! Larder DI consists of the following modules:
//!
//! 1. entry - a single named value-or-definition and its resolution state
//! 2. collection - ownership of entries and their aliases
//! 3. provider - the provider capability and its collection
//! 4. container - the facade tying entries and providers together
//! 5. errors - the error taxonomy
//! 6. types - opaque values, definition callables and helpers

pub mod collection;
pub mod container;
pub mod entry;
pub mod errors;
pub mod provider;
pub mod types;

pub use collection::EntryCollection;
pub use container::Container;
pub use entry::{Entry, Payload};
pub use errors::ContainerError;
pub use provider::{BootableEntryProvider, EntryProvider, ProviderCollection};
pub use types::{downcast, value, DefinitionFn, DynError, Injectable, Value};
