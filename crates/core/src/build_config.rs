// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build requests and the deployment accounts they target.

pub const DEFAULT_TECH_STACK: &[&str] = &["React", "Tailwind", "Vite"];
pub const DEFAULT_DESIGN: &str = "minimal, clean, modern";

/// A deployment account a build can publish to.
///
/// `token` is handed to the agent process as `GITHUB_TOKEN`/`GH_TOKEN`
/// and is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Config key used for workspace paths (e.g. "personal")
    pub key: String,
    /// Identity name on the hosting service (e.g. "octocat")
    pub name: String,
    /// Display label (e.g. "Personal")
    pub label: String,
    pub token: String,
    /// RGB display color
    pub color: u32,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("label", &self.label)
            .field("token", &"<redacted>")
            .field("color", &format_args!("{:#08x}", self.color))
            .finish()
    }
}

/// Immutable description of one requested build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub app_name: String,
    /// URL-safe form of `app_name`, see [`slugify`]
    pub slug: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub design: String,
    pub features: Vec<String>,
    pub account: Account,
}

impl BuildConfig {
    /// Create a config with the default stack and design.
    pub fn new(app_name: impl Into<String>, description: impl Into<String>, account: Account) -> Self {
        let app_name = app_name.into();
        Self {
            slug: slugify(&app_name),
            app_name,
            description: description.into(),
            tech_stack: DEFAULT_TECH_STACK.iter().map(|s| s.to_string()).collect(),
            design: DEFAULT_DESIGN.to_string(),
            features: Vec::new(),
            account,
        }
    }

    crate::setters! {
        into {
            design: String,
        }
        set {
            tech_stack: Vec<String>,
            features: Vec<String>,
        }
    }

    /// Repository the agent is asked to create for this build
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}/{}", self.account.name, self.slug)
    }
}

/// Lower-case, turn whitespace runs into `-`, drop anything outside `[a-z0-9-]`.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut in_space = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// Split a comma-separated stack ("React, Tailwind"). Blank input yields the default stack.
pub fn parse_tech_stack(input: &str) -> Vec<String> {
    let stack: Vec<String> =
        input.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
    if stack.is_empty() {
        DEFAULT_TECH_STACK.iter().map(|s| s.to_string()).collect()
    } else {
        stack
    }
}

/// One feature per non-blank line.
pub fn parse_features(input: &str) -> Vec<String> {
    input.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect()
}

crate::builder! {
    pub struct BuildConfigBuilder => BuildConfig {
        into {
            app_name: String = "Budget Buddy",
            slug: String = "budget-buddy",
            description: String = "Track daily expenses",
            design: String = DEFAULT_DESIGN,
        }
        set {
            tech_stack: Vec<String> = vec!["React".to_string(), "Vite".to_string()],
            features: Vec<String> = vec!["Add expense".to_string()],
            account: Account = crate::test_support::account("personal"),
        }
    }
}

#[cfg(test)]
#[path = "build_config_tests.rs"]
mod tests;
