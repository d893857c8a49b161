//! Route access policy.
//!
//! An ordered list of `(pattern, access)` rules. The first rule whose pattern
//! matches the request path decides; a path no rule matches is protected.
//!
//! Patterns are absolute paths made of `/` separated segments:
//! - a literal segment matches itself
//! - `*` matches exactly one segment
//! - `**`, only as the last segment, matches any number of remaining segments,
//!   including none
//!
//! ```rust
//! use adventure_auth::web::policy::{Access, PolicyGate};
//!
//! let gate = PolicyGate::public_paths(["/api/auth/**", "/"]).unwrap();
//! assert_eq!(gate.access_for("/api/auth/login"), Access::Public);
//! assert_eq!(gate.access_for("/"), Access::Public);
//! assert_eq!(gate.access_for("/api/me"), Access::Protected);
//! ```

use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Reachable with or without a valid token.
    Public,
    /// Requires an authenticated identity.
    Protected,
}

/// A rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`
    Any,
    /// Trailing `**`
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(Error::InvalidConfig(format!(
                "Path pattern '{pattern}' must start with '/'"
            )));
        };

        let parts = split_segments(rest);
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Rest,
                "**" => {
                    return Err(Error::InvalidConfig(format!(
                        "'**' must be the last segment of '{pattern}'"
                    )));
                }
                "*" => Segment::Any,
                literal => Segment::Literal(literal.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let parts = split_segments(rest);

        let mut parts = parts.iter();
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.next() != Some(&literal.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.next().is_none()
    }
}

/// Splits the part of a path after its leading `/`, ignoring a trailing `/`.
fn split_segments(path: &str) -> Vec<&str> {
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub pattern: PathPattern,
    pub access: Access,
}

/// Decides which routes bypass authentication.
#[derive(Debug, Clone, Default)]
pub struct PolicyGate {
    rules: Vec<PolicyRule>,
}

impl PolicyGate {
    /// Creates a gate evaluating `rules` top-down.
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// Builds a gate from configured rules, keeping their order.
    ///
    /// # Arguments
    ///
    /// * `rules` - Rules as written in configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PolicyGate)` - The gate
    /// * `Err(Error::InvalidConfig)` - A pattern does not parse
    ///
    /// # Example
    ///
    /// ```rust
    /// use adventure_auth::web::policy::{Access, PolicyGate, RuleConfig};
    ///
    /// let gate = PolicyGate::from_config(&[
    ///     RuleConfig { pattern: "/api/auth/me".into(), access: Access::Protected },
    ///     RuleConfig { pattern: "/api/auth/**".into(), access: Access::Public },
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(gate.access_for("/api/auth/me"), Access::Protected);
    /// assert_eq!(gate.access_for("/api/auth/login"), Access::Public);
    /// ```
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(PolicyRule {
                    pattern: PathPattern::parse(&rule.pattern)?,
                    access: rule.access,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Builds a gate where every listed pattern is public and the rest protected.
    ///
    /// # Arguments
    ///
    /// * `paths` - Patterns in evaluation order
    ///
    /// # Returns
    ///
    /// * `Ok(PolicyGate)` - The gate
    /// * `Err(Error::InvalidConfig)` - A pattern does not parse
    pub fn public_paths<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = paths
            .into_iter()
            .map(|path| {
                Ok(PolicyRule {
                    pattern: PathPattern::parse(path.as_ref())?,
                    access: Access::Public,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Access level of `path`: the first matching rule, protected otherwise.
    pub fn access_for(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.access)
            .unwrap_or(Access::Protected)
    }
}
