//! Module rules: the `module` statement, rule sub-sections and presets.

use crate::addressing::{self, ConfPath, ReadOptions, WriteOptions};
use crate::constants::{RES, TEST_CSS, TEST_IMGS, TEST_SASS, USE_CSS, USE_SASS, USE_STYLE};
use crate::error::{HelperError, PathError};
use crate::helper::Helper;
use crate::section::Section;
use crate::statement::{Statement, TopHandle};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

const RULES: &str = "rules";
const ONE_OF: &str = "oneOf";

/// A rule to add: either a bare test pattern or a full rule object
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    Test(String),
    Rule(Map<String, Value>),
}

impl RuleSpec {
    pub fn test(pattern: impl Into<String>) -> Self {
        RuleSpec::Test(pattern.into())
    }

    /// Accept a rule object or a pattern string
    pub fn from_value(value: Value) -> Result<Self, HelperError> {
        match value {
            Value::Object(rule) => Ok(RuleSpec::Rule(rule)),
            Value::String(pattern) => Ok(RuleSpec::Test(pattern)),
            other => Err(PathError::conflict(
                RULES,
                format!("a rule must be a mapping or a test pattern, not {}", other),
            )
            .into()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            RuleSpec::Test(pattern) => {
                let mut rule = Map::new();
                rule.insert("test".to_string(), Value::String(pattern));
                Value::Object(rule)
            }
            RuleSpec::Rule(rule) => Value::Object(rule),
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(pattern: &str) -> Self {
        RuleSpec::test(pattern)
    }
}

impl From<String> for RuleSpec {
    fn from(pattern: String) -> Self {
        RuleSpec::Test(pattern)
    }
}

impl From<Map<String, Value>> for RuleSpec {
    fn from(rule: Map<String, Value>) -> Self {
        RuleSpec::Rule(rule)
    }
}

/// Where a rule is added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Collection property, `rules` when unset
    pub prop: Option<String>,
    /// Add inside the current rule instead of next to it
    pub nested: Option<bool>,
}

impl RuleOptions {
    pub fn prop(mut self, prop: impl Into<String>) -> Self {
        self.prop = Some(prop.into());
        self
    }

    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = Some(nested);
        self
    }
}

/// Append `rule` to `<owner>.<prop>` and return a section for it
fn push_rule(
    top: &Helper,
    owner: &ConfPath,
    prop: &str,
    rule: RuleSpec,
) -> Result<ModuleRule, HelperError> {
    let collection = owner.child(prop);
    let value = rule.into_value();
    let test = value.get("test").cloned();
    let index = top.append_at(&collection, value)?;
    let anchor = collection.child(index.to_string());
    debug!(rule = %anchor, "Module rule added");
    Ok(ModuleRule {
        top: top.handle(),
        anchor,
        parent: owner.clone(),
        test: Arc::new(Mutex::new(test)),
    })
}

/// Statement writing under `module`
#[derive(Debug)]
pub struct ModuleStatement {
    top: TopHandle,
}

impl ModuleStatement {
    pub fn new(top: TopHandle) -> Self {
        Self { top }
    }

    /// Append to `module.rules`
    pub fn add(&self, rule: impl Into<RuleSpec>) -> Result<ModuleRule, HelperError> {
        self.add_with(rule, RuleOptions::default())
    }

    pub fn add_with(
        &self,
        rule: impl Into<RuleSpec>,
        options: RuleOptions,
    ) -> Result<ModuleRule, HelperError> {
        let prop = options.prop.as_deref().unwrap_or(RULES);
        push_rule(&self.top()?, &self.locate(&ConfPath::root()), prop, rule.into())
    }

    /// Append to `module.oneOf`
    pub fn one_of(&self, rule: impl Into<RuleSpec>) -> Result<ModuleRule, HelperError> {
        self.add_with(rule, RuleOptions::default().prop(ONE_OF))
    }

    pub fn no_parse(&self, value: impl Into<Value>) -> Result<&Self, HelperError> {
        self.set("noParse", value)
    }

    /// CSS files: injected through the style loader, or emitted as an asset
    /// resource named `outfile`
    pub fn css(&self, outfile: Option<&str>) -> Result<ModuleRule, HelperError> {
        let constants = self.constants()?;
        if let Some(outfile) = outfile {
            self.check_generator(outfile)?;
        }
        let rule = self.add(constants.require(TEST_CSS)?)?;
        match outfile {
            Some(outfile) => {
                rule.set_type(constants.require(RES)?)?;
                self.set("generator.filename", outfile)?;
            }
            None => {
                rule.use_loaders([constants.require(USE_STYLE)?, constants.require(USE_CSS)?])?;
            }
        }
        Ok(rule)
    }

    /// SASS/SCSS files, compiled by the sass loader
    pub fn sass(&self, outfile: Option<&str>) -> Result<ModuleRule, HelperError> {
        let constants = self.constants()?;
        if let Some(outfile) = outfile {
            self.check_generator(outfile)?;
        }
        let rule = self.add(constants.require(TEST_SASS)?)?;
        match outfile {
            Some(outfile) => {
                rule.set_type(constants.require(RES)?)?;
                self.set("generator.filename", outfile)?;
                rule.use_loaders([constants.require(USE_SASS)?])?;
            }
            None => {
                rule.use_loaders([
                    constants.require(USE_STYLE)?,
                    constants.require(USE_CSS)?,
                    constants.require(USE_SASS)?,
                ])?;
            }
        }
        Ok(rule)
    }

    /// `generator.filename` must be writable before any rule is added
    fn check_generator(&self, outfile: &str) -> Result<(), HelperError> {
        let top = self.top()?;
        let location = self.locate(&ConfPath::parse("generator.filename"));
        let value = Value::from(outfile);
        top.read_tree(|tree| addressing::check(tree, &location, &value, &WriteOptions::merge()))?;
        Ok(())
    }

    /// Common image formats, left to the bundler's default handling
    pub fn images(&self) -> Result<ModuleRule, HelperError> {
        let constants = self.constants()?;
        self.add(constants.require(TEST_IMGS)?)
    }

    /// Common image formats, emitted as separate asset files
    pub fn extract_images(&self) -> Result<ModuleRule, HelperError> {
        let rule = self.images()?;
        rule.set_type(self.constants()?.require(RES)?)?;
        Ok(rule)
    }
}

impl Section for ModuleStatement {
    fn top(&self) -> Result<Helper, HelperError> {
        self.top.upgrade()
    }

    fn namespace(&self) -> Option<&str> {
        Some("module")
    }
}

impl Statement for ModuleStatement {
    fn handle(&self) -> &TopHandle {
        &self.top
    }
}

/// One rule object inside a rule collection.
///
/// The rule's subtree is its own conf: `get`/`set` paths are relative to the
/// rule object, with no namespace.
#[derive(Debug, Clone)]
pub struct ModuleRule {
    top: TopHandle,
    anchor: ConfPath,
    parent: ConfPath,
    // `test` of the rule this handle was created for, shared between clones
    test: Arc<Mutex<Option<Value>>>,
}

impl ModuleRule {
    /// Location of the rule object in the tree
    pub fn location(&self) -> &ConfPath {
        &self.anchor
    }

    /// Add a sibling rule, or a nested one when `options.nested` is set
    pub fn add_with(
        &self,
        rule: impl Into<RuleSpec>,
        options: RuleOptions,
    ) -> Result<ModuleRule, HelperError> {
        let top = self.top()?;
        let owner = if options.nested.unwrap_or(false) {
            top.read_tree(|tree| self.verify(tree))?;
            &self.anchor
        } else {
            &self.parent
        };
        let prop = options.prop.as_deref().unwrap_or(RULES);
        push_rule(&top, owner, prop, rule.into())
    }

    /// Sibling rule in the same collection
    pub fn add(&self, rule: impl Into<RuleSpec>) -> Result<ModuleRule, HelperError> {
        self.add_with(rule, RuleOptions::default())
    }

    /// Rule in this rule's own `rules`
    pub fn nested(&self, rule: impl Into<RuleSpec>) -> Result<ModuleRule, HelperError> {
        self.add_with(rule, RuleOptions::default().nested(true))
    }

    /// Rule in this rule's own `oneOf`
    pub fn one_of(&self, rule: impl Into<RuleSpec>) -> Result<ModuleRule, HelperError> {
        self.add_with(rule, RuleOptions::default().prop(ONE_OF).nested(true))
    }

    /// Append loaders to the rule's `use` list
    pub fn use_loaders<I, V>(&self, loaders: I) -> Result<&Self, HelperError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let path = ConfPath::parse("use");
        for loader in loaders {
            self.append_at(&path, loader.into())?;
        }
        Ok(self)
    }

    /// Set `use` to a single value; an existing `use` is a conflict
    pub fn use_value(&self, value: impl Into<Value>) -> Result<&Self, HelperError> {
        if let Some(existing) = self.get("use")? {
            if !existing.is_null() {
                return Err(PathError::conflict(
                    self.anchor.child("use").to_string(),
                    "cannot assign 'use' over an existing value",
                )
                .into());
            }
        }
        self.set_with("use", value, &WriteOptions::replace())
    }

    pub fn set_type(&self, kind: impl Into<Value>) -> Result<&Self, HelperError> {
        self.set("type", kind)
    }

    /// The slot must still hold the rule this handle was created for.
    /// Rules are addressed by index, so a rewritten `rules` sequence can put
    /// a different rule (or nothing) under the same anchor.
    fn verify(&self, tree: &Value) -> Result<(), HelperError> {
        let expected = self.test.lock();
        match addressing::lookup(tree, &self.anchor) {
            Some(Value::Object(rule)) if rule.get("test") == expected.as_ref() => Ok(()),
            _ => Err(HelperError::Configuration(format!(
                "Module rule at '{}' was replaced",
                self.anchor
            ))),
        }
    }

    fn remember_test(&self, tree: &Value) {
        *self.test.lock() = addressing::lookup(tree, &self.anchor.child("test")).cloned();
    }
}

impl Section for ModuleRule {
    fn top(&self) -> Result<Helper, HelperError> {
        self.top.upgrade()
    }

    fn anchor(&self) -> ConfPath {
        self.anchor.clone()
    }

    fn get_at(&self, path: &ConfPath, options: &ReadOptions) -> Result<Option<Value>, HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, required = options.required, "get");
        top.read_tree(|tree| -> Result<_, HelperError> {
            self.verify(tree)?;
            Ok(addressing::read(tree, &location, options)?)
        })
    }

    fn set_at(&self, path: &ConfPath, value: Value, options: &WriteOptions) -> Result<(), HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, mode = ?options.mode, "set");
        top.write_tree(|tree| -> Result<_, HelperError> {
            self.verify(tree)?;
            addressing::write(tree, &location, value, options)?;
            self.remember_test(tree);
            Ok(())
        })
    }

    fn append_at(&self, path: &ConfPath, value: Value) -> Result<usize, HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, "append");
        top.write_tree(|tree| -> Result<_, HelperError> {
            self.verify(tree)?;
            Ok(addressing::append(tree, &location, value)?)
        })
    }

    fn conf(&self) -> Result<Value, HelperError> {
        let top = self.top()?;
        top.read_tree(|tree| -> Result<_, HelperError> {
            self.verify(tree)?;
            Ok(addressing::lookup(tree, &self.anchor)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())))
        })
    }
}
