//! Argument construction for the workflow tool
//!
//! Every invocation gets its own [`CommandSpec`], built from a parameter bag by
//! looking each key up in a [`RuleTable`]. Keys the table does not know are
//! passed as `-p key=value` workflow parameters.
//!
//! Parameter values are caller-controlled and are not validated here; the tool
//! validates them. They only ever become individual entries of an argument
//! vector handed to `exec`, never part of a shell string.

use std::collections::HashMap;
use std::fmt;

use wfrelay_core::domain::parameters::{MANIFEST_KEY, NAME_KEY, NAMESPACE_KEY, ParameterBag};
use wfrelay_core::domain::workflow::OutputMode;

/// Tool subcommands the relay drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Submit,
    Watch,
    Get,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Submit => "submit",
            Subcommand::Watch => "watch",
            Subcommand::Get => "get",
        }
    }
}

/// How a single parameter turns into argument tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentRule {
    /// The value itself, as a bare positional token
    Positional,
    /// `-n <value>`
    Namespace,
    /// `-p <key>=<value>`
    Parameter,
}

/// Mapping from parameter key to its argument rule
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, ArgumentRule>,
    default: ArgumentRule,
}

impl RuleTable {
    /// Table with no explicit rules; every key uses `default`
    pub fn empty(default: ArgumentRule) -> Self {
        Self {
            rules: HashMap::new(),
            default,
        }
    }

    pub fn with_rule(mut self, key: impl Into<String>, rule: ArgumentRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    pub fn rule_for(&self, key: &str) -> ArgumentRule {
        self.rules.get(key).copied().unwrap_or(self.default)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        RuleTable::empty(ArgumentRule::Parameter)
            .with_rule(MANIFEST_KEY, ArgumentRule::Positional)
            .with_rule(NAME_KEY, ArgumentRule::Positional)
            .with_rule("workflow", ArgumentRule::Positional)
            .with_rule(NAMESPACE_KEY, ArgumentRule::Namespace)
    }
}

/// One invocation of the tool: program path followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        let mut tokens = vec![program.into()];
        tokens.extend(args);
        Self { tokens }
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Builds argument vectors for a fixed tool path
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    tool_path: String,
    rules: RuleTable,
}

impl ArgumentBuilder {
    pub fn new(tool_path: impl Into<String>) -> Self {
        Self::with_rules(tool_path, RuleTable::default())
    }

    pub fn with_rules(tool_path: impl Into<String>, rules: RuleTable) -> Self {
        Self {
            tool_path: tool_path.into(),
            rules,
        }
    }

    /// Builds `<tool> <subcommand> [positional..] [flags..] [output options]`
    ///
    /// Positional tokens and flags each keep the order their keys were
    /// supplied in; positional tokens always come first.
    pub fn build(
        &self,
        subcommand: Subcommand,
        params: &ParameterBag,
        output: OutputMode,
    ) -> CommandSpec {
        let mut positional = Vec::new();
        let mut flags = Vec::new();

        for (key, value) in params.iter() {
            match self.rules.rule_for(key) {
                ArgumentRule::Positional => positional.push(value.to_string()),
                ArgumentRule::Namespace => {
                    flags.push("-n".to_string());
                    flags.push(value.to_string());
                }
                ArgumentRule::Parameter => {
                    flags.push("-p".to_string());
                    flags.push(format!("{}={}", key, value));
                }
            }
        }

        let mut args = Vec::with_capacity(1 + positional.len() + flags.len() + 2);
        args.push(subcommand.as_str().to_string());
        args.extend(positional);
        args.extend(flags);
        if output == OutputMode::Json {
            args.push("-o".to_string());
            args.push("json".to_string());
        }

        CommandSpec::new(self.tool_path.clone(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfrelay_core::domain::workflow::WorkflowIdentity;

    fn tokens(spec: &CommandSpec) -> Vec<&str> {
        spec.tokens().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_submit_command_layout() {
        let params = ParameterBag::new()
            .with("message", "hello")
            .and_then(|b| b.with("namespace", "ns-a"))
            .and_then(|b| b.with("manifest", "/tmp/wf.yaml"))
            .unwrap();

        let spec = ArgumentBuilder::new("argo").build(Subcommand::Submit, &params, OutputMode::Json);

        assert_eq!(
            tokens(&spec),
            vec![
                "argo",
                "submit",
                "/tmp/wf.yaml",
                "-p",
                "message=hello",
                "-n",
                "ns-a",
                "-o",
                "json"
            ]
        );
    }

    #[test]
    fn test_unknown_keys_become_parameters() {
        let params = ParameterBag::new()
            .with("image", "alpine")
            .and_then(|b| b.with("count", "3"))
            .unwrap();

        let spec = ArgumentBuilder::new("argo").build(Subcommand::Submit, &params, OutputMode::Text);

        assert_eq!(
            tokens(&spec),
            vec!["argo", "submit", "-p", "image=alpine", "-p", "count=3"]
        );
    }

    #[test]
    fn test_text_mode_has_no_output_suffix() {
        let identity = WorkflowIdentity {
            name: "wf-1".to_string(),
            namespace: "ns-a".to_string(),
        };
        let spec = ArgumentBuilder::new("/usr/local/bin/argo").build(
            Subcommand::Watch,
            &ParameterBag::from(&identity),
            OutputMode::Text,
        );

        assert_eq!(
            tokens(&spec),
            vec!["/usr/local/bin/argo", "watch", "wf-1", "-n", "ns-a"]
        );
        assert_eq!(spec.program(), "/usr/local/bin/argo");
        assert_eq!(spec.args().len(), 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let params = ParameterBag::new()
            .with("b", "2")
            .and_then(|b| b.with("a", "1"))
            .and_then(|b| b.with("workflow", "wf"))
            .unwrap();
        let builder = ArgumentBuilder::new("argo");

        let first = builder.build(Subcommand::Get, &params, OutputMode::Json);
        let second = builder.build(Subcommand::Get, &params.clone(), OutputMode::Json);

        assert_eq!(first, second);
    }

    #[test]
    fn test_values_are_single_tokens() {
        let params = ParameterBag::new()
            .with("message", "hello; rm -rf / && echo $HOME")
            .unwrap();

        let spec = ArgumentBuilder::new("argo").build(Subcommand::Submit, &params, OutputMode::Text);

        assert_eq!(spec.args()[2], "message=hello; rm -rf / && echo $HOME");
        assert_eq!(spec.args().len(), 3);
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = RuleTable::empty(ArgumentRule::Parameter).with_rule("target", ArgumentRule::Positional);
        let params = ParameterBag::new()
            .with("namespace", "ns-a")
            .and_then(|b| b.with("target", "wf-2"))
            .unwrap();

        let spec =
            ArgumentBuilder::with_rules("argo", rules).build(Subcommand::Get, &params, OutputMode::Text);

        assert_eq!(
            tokens(&spec),
            vec!["argo", "get", "wf-2", "-p", "namespace=ns-a"]
        );
    }
}
