//! Shared constants for annotation metadata.

/// Root segment of every target path.
pub const DATA_ROOT: &str = "data";

/// Custom key listing the collections a rule belongs to.
pub const COLLECTIONS_KEY: &str = "collections";

/// Custom key holding the rule's stable short name.
pub const SHORT_NAME_KEY: &str = "short_name";

/// Reserved custom key carrying the owning package title of a collection rule.
pub const PACKAGE_TITLE_KEY: &str = "package_title";

/// Custom key with the message reported when a rule fails.
pub const FAILURE_MSG_KEY: &str = "failure_msg";

/// Custom key with remediation guidance for a rule.
pub const SOLUTION_KEY: &str = "solution";

/// Custom key with the date a rule starts being enforced.
pub const EFFECTIVE_ON_KEY: &str = "effective_on";

/// Collection name flagging rules that ship with the built-in rule set.
pub const BUILTIN_COLLECTION: &str = "builtin";

/// Package path segment marking a module that defines a collection.
pub const COLLECTION_MARKER: &str = ".collection.";

/// Custom key with the parameters a rule reads. A package annotation can
/// also carry one per rule, under `custom.<short_name>.rule_data`.
pub const RULE_DATA_KEY: &str = "rule_data";
