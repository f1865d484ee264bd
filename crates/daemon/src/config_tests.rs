// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

const FULL: &str = r#"
workspace_root = "/srv/forge/work"
log_dir = "/srv/forge/logs"

[agent]
command = "/usr/local/bin/claude"
args = ["--print"]
env_allow = ["PATH", "HOME"]

[identity]
uid = 1001
gid = 1001
user = "forge"
home = "/home/forge"

[accounts.personal]
name = "octocat"
label = "Personal"
color = 0x238636
token_env = "GH_PERSONAL"

[accounts.work]
name = "octo-org"
token_env = "GH_WORK"
"#;

fn parse(text: &str) -> ForgeConfig {
    ForgeConfig::parse(text, Path::new("forge.toml")).unwrap()
}

fn tokens(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn full_file_parses() {
    let config = parse(FULL);
    assert_eq!(config.workspace_root, PathBuf::from("/srv/forge/work"));
    assert_eq!(config.log_dir, PathBuf::from("/srv/forge/logs"));
    assert_eq!(config.agent.command, "/usr/local/bin/claude");
    assert_eq!(config.agent.args, vec!["--print"]);
    assert_eq!(config.identity.as_ref().map(|i| i.uid), Some(1001));
    assert_eq!(config.accounts.len(), 2);
    assert_eq!(config.accounts["personal"].color, Some(0x238636));
}

#[test]
fn empty_file_uses_defaults() {
    let config = parse("");
    assert_eq!(config, ForgeConfig::default());
    assert_eq!(config.agent.command, "claude");
    assert_eq!(config.agent.args, vec!["--print", "--dangerously-skip-permissions"]);
    assert_eq!(config.workspace_root, PathBuf::from("/workspace"));
    assert_eq!(config.log_dir, PathBuf::from("/logs"));
}

#[test]
fn partial_agent_section_keeps_other_defaults() {
    let config = parse("[agent]\ncommand = \"agent\"\n");
    assert_eq!(config.agent.command, "agent");
    assert_eq!(config.agent.args, AgentSection::default().args);
}

#[yare::parameterized(
    unknown_top_level = { "port = 8080\n" },
    account_without_token_env = { "[accounts.a]\nname = \"n\"\n" },
    wrong_type = { "workspace_root = 3\n" },
)]
fn invalid_file_is_rejected(text: &str) {
    let err = ForgeConfig::parse(text, Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ForgeConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert!(config.accounts.is_empty());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forge.toml");
    std::fs::write(&path, FULL).unwrap();
    assert_eq!(ForgeConfig::load(&path).unwrap(), parse(FULL));
}

#[test]
fn accounts_resolve_tokens_from_lookup() {
    let book = parse(FULL)
        .resolve_accounts(tokens(&[("GH_PERSONAL", "tok-1"), ("GH_WORK", "tok-2")]))
        .unwrap();
    let personal = book.get("personal").unwrap();
    assert_eq!(personal.name, "octocat");
    assert_eq!(personal.label, "Personal");
    assert_eq!(personal.token, "tok-1");

    let work = book.get("work").unwrap();
    assert_eq!(work.label, "work");
    assert_eq!(work.color, DEFAULT_COLOR);
    assert_eq!(book.keys().collect::<Vec<_>>(), vec!["personal", "work"]);
}

#[yare::parameterized(
    unset = { &[("GH_PERSONAL", "tok-1")] },
    empty = { &[("GH_PERSONAL", "tok-1"), ("GH_WORK", "")] },
)]
fn missing_token_is_an_error(env: &[(&str, &str)]) {
    let err = parse(FULL).resolve_accounts(tokens(env)).unwrap_err();
    let ConfigError::MissingToken { account, var } = err else {
        panic!("expected MissingToken, got {:?}", err);
    };
    assert_eq!(account, "work");
    assert_eq!(var, "GH_WORK");
}

#[test]
fn unknown_account_lookup_fails() {
    let book: AccountBook = vec![forge_core::test_support::account("personal")].into_iter().collect();
    assert!(book.get("personal").is_ok());
    let err = book.get("nope").unwrap_err();
    assert_eq!(err.to_string(), "unknown account 'nope'");
}

#[test]
fn supervisor_config_carries_agent_settings() {
    let supervisor = parse(FULL).supervisor_config();
    assert_eq!(supervisor.program, "/usr/local/bin/claude");
    assert_eq!(supervisor.args, vec!["--print"]);
    assert_eq!(supervisor.env_allow, vec!["PATH", "HOME"]);
    assert_eq!(supervisor.workspace_root, PathBuf::from("/srv/forge/work"));
    let identity = supervisor.identity.unwrap();
    assert_eq!((identity.uid, identity.gid), (1001, 1001));
    assert_eq!(identity.user, "forge");

    assert!(ForgeConfig::default().supervisor_config().identity.is_none());
}
