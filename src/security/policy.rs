//! Route authorization policy.
//!
//! An ordered list of `(method, pattern, access)` rules evaluated top to bottom;
//! the first rule whose method and pattern match decides. Patterns are
//! ant-style: `*` matches within a single path segment, `**` matches any number
//! of segments and `?` matches one character.

use anyhow::{Context, Result};
use axum::http::Method;
use regex::Regex;

use super::principal::Principal;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

static UNMATCHED_ACCESS: Access = Access::Authenticated;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    PermitAll,
    Authenticated,
    HasAuthority(String),
    DenyAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Grant,
    Unauthenticated,
    Forbidden,
}

#[derive(Clone, Debug)]
pub struct Rule {
    method: Option<Method>,
    pattern: String,
    regex: Regex,
    access: Access,
    resolves_principal: bool,
}

impl Rule {
    /// # Errors
    /// Returns an error if the pattern cannot be compiled.
    pub fn new(pattern: &str, access: Access) -> Result<Self> {
        let regex = compile_pattern(pattern)?;
        Ok(Self {
            method: None,
            pattern: pattern.to_string(),
            regex,
            access,
            resolves_principal: true,
        })
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Matching requests reach the handler without the chain looking at the
    /// `Authorization` header or the session cookie.
    #[must_use]
    pub fn without_principal(mut self) -> Self {
        self.resolves_principal = false;
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub const fn access(&self) -> &Access {
        &self.access
    }

    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.regex.is_match(path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Policy {
    rules: Vec<Rule>,
}

impl Policy {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules served by the API.
    ///
    /// # Errors
    /// Returns an error if a built-in pattern fails to compile.
    pub fn default_api() -> Result<Self> {
        Ok(Self::new(vec![
            Rule::new("/api/login", Access::PermitAll)?
                .with_method(Method::POST)
                .without_principal(),
            Rule::new("/api/logout", Access::PermitAll)?.without_principal(),
            Rule::new("/api/public/**", Access::PermitAll)?,
            Rule::new("/api/admin/**", Access::HasAuthority(ROLE_ADMIN.to_string()))?,
            Rule::new("/api/**", Access::Authenticated)?,
        ]))
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Access required for a request; unmatched requests need authentication.
    #[must_use]
    pub fn access_for(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(&UNMATCHED_ACCESS, Rule::access)
    }

    /// Whether the chain resolves a principal before deciding; unmatched
    /// requests always do.
    #[must_use]
    pub fn resolves_principal(&self, method: &Method, path: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(true, |rule| rule.resolves_principal)
    }

    #[must_use]
    pub fn decide(&self, method: &Method, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.access_for(method, path), principal) {
            (Access::PermitAll, _) => Decision::Grant,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Grant,
            (Access::HasAuthority(authority), Some(principal)) => {
                if principal.has_authority(authority) {
                    Decision::Grant
                } else {
                    Decision::Forbidden
                }
            }
            (Access::DenyAll, Some(_)) => Decision::Forbidden,
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut expr = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        let after = chars.get(i + 2).copied();
        match chars[i] {
            // `/**` as a whole segment also matches the bare parent path
            '/' if next == Some('*')
                && after == Some('*')
                && matches!(chars.get(i + 3).copied(), None | Some('/')) =>
            {
                expr.push_str("(?:/.*)?");
                i += 3;
            }
            '*' if next == Some('*') => {
                expr.push_str(".*");
                i += 2;
            }
            '*' => {
                expr.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                expr.push_str("[^/]");
                i += 1;
            }
            c => {
                expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                i += 1;
            }
        }
    }
    expr.push('$');
    Regex::new(&expr).with_context(|| format!("invalid route pattern: {pattern}"))
}
