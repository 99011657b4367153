use thiserror::Error;

/// Errors raised while resolving fact names against a catalog.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("fact '{name}' does not exist in the catalog for product '{product}'")]
    FactNotFound { name: String, product: String },
}

/// Errors raised while making product-qualified fields product specific.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(
        "there is a product-qualified '{qualified_key}' item in {section}, but also an unqualified \
         '{field}' item and those two differ in value - '{qualified_value}' vs '{bare_value}' respectively"
    )]
    ConflictingOverride {
        section: String,
        field: String,
        qualified_key: String,
        qualified_value: String,
        bare_value: String,
    },

    #[error("'{field}' in {section} can not have multiple values, got '{value}'")]
    Multiplicity {
        section: String,
        field: String,
        value: String,
    },

    #[error(
        "the '{field}' reference can not be product-qualified, merge '{key}' into the unqualified reference"
    )]
    QualifiedGlobalReference { field: String, key: String },

    #[error("malformed product-qualified key '{key}' in {section}")]
    MalformedKey { section: String, key: String },
}

/// Errors raised by the priority reorderer.
#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("invalid priority pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors raised while building or loading a product fact catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("fact '{name}' is defined more than once")]
    DuplicateFact { name: String },

    #[error("custom fact '{name}' must define both bash_conditional and ansible_conditional")]
    IncompleteCustomFact { name: String },

    #[error("failed to read catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
