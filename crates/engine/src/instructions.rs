// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The instruction document written to the agent's stdin.

use crate::classify::{SENTINEL_END, SENTINEL_START};
use forge_core::BuildConfig;
use std::fmt::Write;
use std::path::Path;

/// Render the full instruction document for one build.
pub fn compose_instructions(config: &BuildConfig, project_dir: &Path) -> String {
    let stack = config.tech_stack.join(", ");
    let scaffold = config.tech_stack.first().map(String::as_str).unwrap_or("Vite");
    let features = if config.features.is_empty() {
        "- Core functionality as described above".to_string()
    } else {
        config
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}. {}", i + 1, f))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut doc = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        doc,
        r#"
# Project: {app}

## Deployment Target
- GitHub Account: {owner}
- Repository will be created at: github.com/{owner}/{slug}

## Constraints
- Building a modern web application
- Tech Stack: {stack}
- Design: {design}
- MUST deploy to GitHub Pages when complete
- MUST be functional on first deploy
- Answer your own questions - do not ask for clarification

## Description
{description}

## MVP Features
{features}

## Instructions
1. Create project directory: {project_dir}
2. Initialize with {scaffold} and appropriate tooling
3. Implement all MVP features with working functionality
4. Apply {design} design aesthetic
5. Ensure fully responsive
6. Add README.md with project overview
7. Initialize git repository
8. Create GitHub repo under {owner}: {slug}
9. Configure GitHub Pages (use gh-pages branch or GitHub Actions)
10. Build, commit, push, and verify deployment is live
11. Test the deployed URL loads correctly

## Self-Resolution Rules
- Design ambiguity -> Choose minimal/clean option
- Feature ambiguity -> Implement simpler interpretation
- Dependency issues -> Find alternative or skip non-critical
- Build errors -> Debug and fix, don't give up
- Document all assumptions in README

## CRITICAL: Output Format
When deployment is verified working, output EXACTLY this format on its own lines:

{start}
URL: [the deployed github pages url]
REPO: [the github repository url]
SUMMARY: [2-3 sentence summary of what was built and key features]
{end}
"#,
        app = config.app_name,
        owner = config.account.name,
        slug = config.slug,
        stack = stack,
        design = config.design,
        description = config.description,
        features = features,
        project_dir = project_dir.display(),
        scaffold = scaffold,
        start = SENTINEL_START,
        end = SENTINEL_END,
    );
    doc
}
