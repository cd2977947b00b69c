//! Error types for graph operations.
//!
//! Every error names the objects and fields involved and ends with a
//! hint, so a failed registration can be fixed without a debugger.

use std::fmt;

use tether_support::rendering::render_chain;
use tether_support::tag::TagError;

/// Boxed error returned by start callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A non-struct value was registered without a name.
    #[error("Name required: values of type {type_name} must be registered under a name")]
    NameRequired { type_name: &'static str },

    /// The name is already taken; the registry is append-only.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// An absent optional value was registered.
    #[error("Registered nil value: name={name}, type={type_name}")]
    NilRegistration {
        name: String,
        type_name: &'static str,
    },

    /// A dependency tag sits on a field the graph cannot write.
    #[error(
        "Invalid injection target: field `{field}` of {owner} is tagged but has no setter\n  Hint: tagged fields need a writable slot in the field table"
    )]
    InvalidInjectionTarget {
        field: &'static str,
        owner: &'static str,
    },

    /// Nothing satisfies a required dependency.
    #[error("{}", .0)]
    DependencyNotFound(DependencyNotFoundError),

    /// A found object cannot be assigned to the field.
    #[error(
        "Type mismatch: field `{field}` of {owner} ({expected}) cannot hold `{found_name}` ({found})"
    )]
    TypeMismatch {
        field: &'static str,
        owner: &'static str,
        expected: &'static str,
        found_name: String,
        found: &'static str,
    },

    /// The start callback returned an error; the object was not registered.
    #[error("Failed to start {name}: {source}")]
    StartFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Field metadata could not be parsed.
    #[error("Malformed tag on field `{field}` of {owner}: {source}")]
    TagParseFailure {
        field: &'static str,
        owner: &'static str,
        #[source]
        source: TagError,
    },

    /// Lazy auto-creation re-entered an object still being built.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),
}

/// Error when a name is already present in the registry.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub name: String,
    /// Type of the value that was rejected
    pub type_name: &'static str,
    /// Type of the object holding the name
    pub existing: &'static str,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Already registered: name={}, type={}, existing={}",
            self.name, self.type_name, self.existing,
        )?;
        write!(f, "\n  Hint: registration never overwrites; pick another name")
    }
}

/// Error when a required dependency cannot be found or created.
///
/// Includes registered keys that look like the tag, if any.
#[derive(Debug)]
pub struct DependencyNotFoundError {
    /// Field that needed the dependency
    pub field: &'static str,
    /// Lookup key from the tag (empty = by type)
    pub tag: String,
    /// Declared type of the field
    pub dependency_type: &'static str,
    /// Name the owner was being registered under
    pub owner_name: String,
    /// Type of the owner
    pub owner_type: &'static str,
    /// Similar registry keys ("did you mean?")
    pub suggestions: Vec<String>,
}

impl fmt::Display for DependencyNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dependency not found: field={}, tag={:?} in object {}:{}",
            self.field, self.tag, self.owner_name, self.owner_type,
        )?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        if self.tag.is_empty() {
            write!(
                f,
                "\n  Hint: register a singleton of type {} first, or mark the field nilable",
                self.dependency_type
            )
        } else {
            write!(
                f,
                "\n  Hint: register {:?} first, or mark the field nilable",
                self.tag
            )
        }
    }
}

/// Error when auto-creation loops back onto itself.
///
/// Shows the chain of names being built when the loop closed.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// Example: `["rec1", "rec2", "rec1"]`
    pub chain: Vec<String>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: register one side first with the other field nilable, or pre-fill it"
        )
    }
}

/// Convenient Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
