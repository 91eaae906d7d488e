//! In-memory representation of `quality.yml`.
//!
//! Hook groups and hook types are kept as ordered lists of named entries
//! rather than maps: declaration order decides execution order, and a
//! duplicated group name stays visible to the validator instead of being
//! silently collapsed.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// An external command-line utility the hooks depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default)]
    pub name: String,
    /// Command whose success means the tool is present.
    #[serde(default)]
    pub check_command: String,
    /// Command that installs the tool when the check fails.
    #[serde(default)]
    pub install_command: String,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        check_command: impl Into<String>,
        install_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            check_command: check_command.into(),
            install_command: install_command.into(),
        }
    }
}

/// When captured command output is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowOn {
    Always,
    Failure,
    Success,
}

impl ShowOn {
    /// Accepted spellings, in documentation order.
    pub const VALUES: [&'static str; 3] = ["always", "failure", "success"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShowOn::Always => "always",
            ShowOn::Failure => "failure",
            ShowOn::Success => "success",
        }
    }
}

impl fmt::Display for ShowOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ShowOn::Always),
            "failure" => Ok(ShowOn::Failure),
            "success" => Ok(ShowOn::Success),
            other => Err(format!("invalid show_on value: {other}")),
        }
    }
}

/// Output display policy for a hook.
///
/// `show_on` is kept as raw text so that an invalid value survives loading
/// and can be reported by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure_message: Option<String>,
}

impl OutputRules {
    pub fn is_empty(&self) -> bool {
        self.show_on.is_none() && self.on_failure_message.is_none()
    }
}

/// A named command bound to a hook type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_rules: Option<OutputRules>,
}

impl Hook {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_fix_command(mut self, fix_command: impl Into<String>) -> Self {
        self.fix_command = Some(fix_command.into());
        self
    }

    pub fn with_show_on(mut self, show_on: ShowOn) -> Self {
        self.output_rules.get_or_insert_with(OutputRules::default).show_on =
            Some(show_on.as_str().to_string());
        self
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.output_rules
            .get_or_insert_with(OutputRules::default)
            .on_failure_message = Some(message.into());
        self
    }

    /// The fix command, if one is declared and non-blank.
    pub fn fix(&self) -> Option<&str> {
        self.fix_command
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
    }

    /// The parsed display policy. `None` when absent or not a known value.
    pub fn show_on(&self) -> Option<ShowOn> {
        self.output_rules
            .as_ref()
            .and_then(|rules| rules.show_on.as_deref())
            .and_then(|value| value.parse().ok())
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.output_rules
            .as_ref()
            .and_then(|rules| rules.on_failure_message.as_deref())
            .filter(|msg| !msg.is_empty())
    }
}

/// Hooks registered for one hook type (`pre-commit`, `pre-push`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookStage {
    pub hook_type: String,
    pub hooks: Vec<Hook>,
}

/// A named collection of hooks, subdivided by hook type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookGroup {
    pub name: String,
    pub stages: Vec<HookStage>,
}

impl HookGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append hooks for a hook type, creating the stage if needed.
    pub fn with_hooks(mut self, hook_type: impl Into<String>, hooks: Vec<Hook>) -> Self {
        let hook_type = hook_type.into();
        match self.stages.iter_mut().find(|s| s.hook_type == hook_type) {
            Some(stage) => stage.hooks.extend(hooks),
            None => self.stages.push(HookStage { hook_type, hooks }),
        }
        self
    }

    /// Every hook declared under the exact hook type, in declaration order.
    ///
    /// A hook type repeated within the group contributes all of its entries.
    pub fn hooks_for(&self, hook_type: &str) -> Vec<&Hook> {
        self.stages
            .iter()
            .filter(|stage| stage.hook_type == hook_type)
            .flat_map(|stage| stage.hooks.iter())
            .collect()
    }
}

/// A loaded `quality.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_tools")]
    pub tools: Vec<Tool>,
    #[serde(default, deserialize_with = "deserialize_groups")]
    pub hooks: Vec<HookGroup>,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document is an empty configuration, not a parse error.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn group(&self, name: &str) -> Option<&HookGroup> {
        self.hooks.iter().find(|group| group.name == name)
    }

    /// Every hook type declared anywhere, in first-seen order.
    pub fn hook_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for stage in self.hooks.iter().flat_map(|g| g.stages.iter()) {
            if !types.contains(&stage.hook_type.as_str()) {
                types.push(&stage.hook_type);
            }
        }
        types
    }
}

// ---------------------------------------------------------------------------
// Ordered (de)serialization of the hooks section
// ---------------------------------------------------------------------------

fn deserialize_tools<'de, D>(deserializer: D) -> Result<Vec<Tool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Tool>>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_groups<'de, D>(deserializer: D) -> Result<Vec<HookGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let pairs = OrderedPairs::<OrderedPairs<Option<Vec<Hook>>>>::deserialize(deserializer)?;
    Ok(pairs
        .0
        .into_iter()
        .map(|(name, stages)| HookGroup {
            name,
            stages: stages
                .0
                .into_iter()
                .map(|(hook_type, hooks)| HookStage {
                    hook_type,
                    hooks: hooks.unwrap_or_default(),
                })
                .collect(),
        })
        .collect())
}

/// A YAML mapping read as a list of `(key, value)` pairs in document order.
struct OrderedPairs<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedPairs<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PairsVisitor(PhantomData))
    }
}

struct PairsVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for PairsVisitor<V> {
    type Value = OrderedPairs<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            pairs.push((key, value));
        }
        Ok(OrderedPairs(pairs))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedPairs(Vec::new()))
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Config", 2)?;
        state.serialize_field("tools", &self.tools)?;
        state.serialize_field("hooks", &GroupsRef(&self.hooks))?;
        state.end()
    }
}

struct GroupsRef<'a>(&'a [HookGroup]);

impl Serialize for GroupsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in self.0 {
            map.serialize_entry(&group.name, &StagesRef(&group.stages))?;
        }
        map.end()
    }
}

struct StagesRef<'a>(&'a [HookStage]);

impl Serialize for StagesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for stage in self.0 {
            map.serialize_entry(&stage.hook_type, &stage.hooks)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
tools:
  - name: Gitleaks
    check_command: gitleaks version
    install_command: go install github.com/gitleaks/gitleaks/v8@latest

hooks:
  security:
    pre-commit:
      - name: Secret Detection
        command: gitleaks detect --no-git --source .
        output_rules:
          show_on: failure
          on_failure_message: Secrets detected!
  python:
    pre-push:
      - name: Tests
        command: pytest
    pre-commit:
      - name: Format Check
        command: black --check .
        fix_command: black .
"#;

    #[test]
    fn test_parses_tools_and_groups() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.tools.len(), 1);
        assert_eq!(config.tools[0].name, "Gitleaks");
        assert_eq!(config.hooks.len(), 2);

        let security = config.group("security").unwrap();
        let hooks = security.hooks_for("pre-commit");
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].show_on(), Some(ShowOn::Failure));
        assert_eq!(hooks[0].failure_message(), Some("Secrets detected!"));
        assert!(hooks[0].fix().is_none());
    }

    #[test]
    fn test_preserves_declaration_order() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();

        let names: Vec<&str> = config.hooks.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["security", "python"]);

        let python = config.group("python").unwrap();
        let types: Vec<&str> = python.stages.iter().map(|s| s.hook_type.as_str()).collect();
        assert_eq!(types, vec!["pre-push", "pre-commit"]);
        assert_eq!(config.hook_types(), vec!["pre-commit", "pre-push"]);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_order() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        let yaml = config.to_yaml_string().unwrap();
        let back = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, back);
        assert!(yaml.find("security").unwrap() < yaml.find("python").unwrap());
    }

    #[test]
    fn test_empty_and_null_sections() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(config.tools.is_empty());
        assert!(config.hooks.is_empty());

        let config = Config::from_yaml_str("tools:\nhooks:\n").unwrap();
        assert!(config.tools.is_empty());
        assert!(config.hooks.is_empty());

        let config = Config::from_yaml_str("hooks:\n  backend:\n    pre-commit:\n").unwrap();
        assert_eq!(config.hooks[0].stages[0].hooks.len(), 0);
    }

    #[test]
    fn test_unknown_show_on_is_kept_raw() {
        let yaml = "hooks:\n  x:\n    pre-commit:\n      - name: a\n        command: b\n        output_rules:\n          show_on: sometimes\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        let hook = &config.hooks[0].stages[0].hooks[0];
        assert_eq!(
            hook.output_rules.as_ref().unwrap().show_on.as_deref(),
            Some("sometimes")
        );
        assert_eq!(hook.show_on(), None);
    }

    #[test]
    fn test_hook_builders() {
        let hook = Hook::new("Format", "cargo fmt -- --check")
            .with_fix_command("cargo fmt")
            .with_show_on(ShowOn::Always)
            .with_failure_message("run the fixer");
        assert_eq!(hook.fix(), Some("cargo fmt"));
        assert_eq!(hook.show_on(), Some(ShowOn::Always));
        assert_eq!(hook.failure_message(), Some("run the fixer"));

        let blank_fix = Hook::new("x", "y").with_fix_command("   ");
        assert!(blank_fix.fix().is_none());
    }

    #[test]
    fn test_repeated_hook_type_keeps_every_hook() {
        let yaml = "hooks:\n  security:\n    pre-commit:\n      - name: A\n        command: echo a\n    pre-commit:\n      - name: B\n        command: echo b\n";
        let config = Config::from_yaml_str(yaml).unwrap();

        let group = &config.hooks[0];
        assert_eq!(group.stages.len(), 2);
        let names: Vec<&str> = group
            .hooks_for("pre-commit")
            .into_iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(config.hook_types(), vec!["pre-commit"]);
    }

    #[test]
    fn test_group_with_hooks_merges_same_type() {
        let group = HookGroup::new("rust")
            .with_hooks("pre-commit", vec![Hook::new("a", "a")])
            .with_hooks("pre-commit", vec![Hook::new("b", "b")]);
        assert_eq!(group.stages.len(), 1);
        assert_eq!(group.hooks_for("pre-commit").len(), 2);
        assert!(group.hooks_for("pre-push").is_empty());
    }
}
