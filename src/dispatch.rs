//! Recursive walk over layout rules against a data context.
use crate::avt::{AttributeValueTemplate, AvtPart, parse_avt};
use crate::commands;
use crate::document::Document;
use crate::error::{ErrorKind, PublishError};
use crate::rules::RuleElement;
use crate::sequence::Sequence;
use crate::typesetter::{TextFormat, Typesetter};
use gridpress_layout::PageType;
use gridpress_resource::FileFinder;
use gridpress_style::Extent;
use gridpress_style::parsers::{parse_extent, parse_length, run_parser};
use gridpress_xpath::engine::format_number;
use gridpress_xpath::{
    DataNode, EvaluationContext, Expression, Value, VariableResolver, parse_expression,
};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A layout command: receives its rule element and the data context, returns the
/// content it produced.
pub type Command<'s, 'a, 'input> = fn(
    &mut Dispatcher<'s, 'a, 'input>,
    &Rc<RuleElement>,
    DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError>;

/// The data node rules are applied to, with its position in the node list being
/// processed (1-based).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataContext<'a, 'input> {
    pub node: DataNode<'a, 'input>,
    pub position: usize,
    pub size: usize,
}

impl<'a, 'input> DataContext<'a, 'input> {
    pub fn new(node: DataNode<'a, 'input>) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
        }
    }

    pub fn at(node: DataNode<'a, 'input>, position: usize, size: usize) -> Self {
        Self {
            node,
            position,
            size,
        }
    }
}

/// Variable bindings, innermost scope last. Lookups search inward out.
#[derive(Debug)]
struct Scopes<'a, 'input>(Vec<HashMap<String, Value<'a, 'input>>>);

impl<'a, 'input> VariableResolver<'a, 'input> for Scopes<'a, 'input> {
    fn variable(&self, name: &str) -> Option<Value<'a, 'input>> {
        self.0.iter().rev().find_map(|scope| scope.get(name).cloned())
    }
}

pub struct Dispatcher<'s, 'a, 'input> {
    pub(crate) document: Document<'s>,
    pub(crate) typesetter: &'s dyn Typesetter,
    pub(crate) finder: &'s dyn FileFinder,
    pub(crate) format: TextFormat,
    commands: HashMap<&'static str, Command<'s, 'a, 'input>>,
    scopes: Scopes<'a, 'input>,
    expressions: RefCell<HashMap<String, Rc<Expression>>>,
}

impl<'s, 'a, 'input> Dispatcher<'s, 'a, 'input> {
    pub fn new(
        document: Document<'s>,
        typesetter: &'s dyn Typesetter,
        finder: &'s dyn FileFinder,
        format: TextFormat,
    ) -> Self {
        Self {
            document,
            typesetter,
            finder,
            format,
            commands: commands::command_table(),
            scopes: Scopes(vec![HashMap::new()]),
            expressions: RefCell::new(HashMap::new()),
        }
    }

    pub fn document(&self) -> &Document<'s> {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document<'s> {
        &mut self.document
    }

    pub fn into_document(self) -> Document<'s> {
        self.document
    }

    // --- Dispatch ---

    /// Dispatches every child element of `rule` in document order and concatenates
    /// their results.
    pub fn execute_children(
        &mut self,
        rule: &Rc<RuleElement>,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Sequence<'a, 'input>, PublishError> {
        let mut result = Vec::new();
        for child in rule.elements() {
            result.extend(self.execute(child, ctx)?);
        }
        Ok(result)
    }

    /// Runs the command registered for `rule`. Unknown elements are skipped.
    pub fn execute(
        &mut self,
        rule: &Rc<RuleElement>,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Sequence<'a, 'input>, PublishError> {
        if !rule.is_layout_element() {
            warn!(
                "Element <{}> (line {}) is not in the layout namespace, skipped",
                rule.name, rule.line
            );
            return Ok(Vec::new());
        }
        let Some(command) = self.commands.get(rule.name.as_str()).copied() else {
            warn!("Unknown layout element <{}> (line {}), skipped", rule.name, rule.line);
            return Ok(Vec::new());
        };
        debug!("<{}> (line {})", rule.name, rule.line);
        command(self, rule, ctx)
            .map_err(|e| e.report_with(format!("<{}> (line {})", rule.name, rule.line)))
    }

    // --- Variables ---

    pub fn push_scope(&mut self) {
        self.scopes.0.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.0.len() > 1 {
            self.scopes.0.pop();
        }
    }

    /// Binds `name` in the innermost scope.
    pub fn bind_local(&mut self, name: &str, value: Value<'a, 'input>) {
        if let Some(scope) = self.scopes.0.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Updates the nearest existing binding of `name`, or binds it globally.
    pub fn assign(&mut self, name: &str, value: Value<'a, 'input>) {
        let target = self
            .scopes
            .0
            .iter_mut()
            .rev()
            .find(|scope| scope.contains_key(name));
        match target {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => {
                self.scopes.0[0].insert(name.to_string(), value);
            }
        }
    }

    pub fn variable(&self, name: &str) -> Option<Value<'a, 'input>> {
        self.scopes.variable(name)
    }

    // --- Expressions ---

    fn compile(&self, expression: &str) -> Result<Rc<Expression>, PublishError> {
        if let Some(parsed) = self.expressions.borrow().get(expression) {
            return Ok(Rc::clone(parsed));
        }
        let parsed = parse_expression(expression).map_err(|source| ErrorKind::Expression {
            expression: expression.to_string(),
            source,
        })?;
        let parsed = Rc::new(parsed);
        self.expressions
            .borrow_mut()
            .insert(expression.to_string(), Rc::clone(&parsed));
        Ok(parsed)
    }

    fn evaluate_parsed(
        &self,
        parsed: &Expression,
        source: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Value<'a, 'input>, PublishError> {
        let e_ctx = EvaluationContext {
            context_node: ctx.node,
            context_position: ctx.position,
            context_size: ctx.size,
            variables: &self.scopes,
            extensions: &self.document,
        };
        gridpress_xpath::evaluate(parsed, &e_ctx).map_err(|e| {
            ErrorKind::Expression {
                expression: source.to_string(),
                source: e,
            }
            .into()
        })
    }

    /// Evaluates `expression` against the data context.
    pub fn evaluate(
        &self,
        expression: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Value<'a, 'input>, PublishError> {
        let parsed = self.compile(expression)?;
        self.evaluate_parsed(&parsed, expression, ctx)
    }

    /// Nodes selected by `expression`. Any other result is an error.
    pub fn select_nodes(
        &self,
        rule: &RuleElement,
        attribute: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Vec<DataNode<'a, 'input>>, PublishError> {
        let expression = self.required_raw(rule, attribute)?;
        match self.evaluate(expression, ctx)? {
            Value::NodeSet(nodes) => Ok(nodes),
            other => Err(invalid(rule, attribute, expression, format!(
                "expected a node set, got {}",
                describe(&other)
            ))),
        }
    }

    // --- Attributes ---

    /// Expands `{expression}` spans of an attribute value.
    pub fn expand(&self, value: &str, ctx: DataContext<'a, 'input>) -> Result<String, PublishError> {
        let template = parse_avt(value).map_err(|source| ErrorKind::Expression {
            expression: value.to_string(),
            source,
        })?;
        match template {
            AttributeValueTemplate::Static(s) => Ok(s),
            AttributeValueTemplate::Dynamic(parts) => {
                let mut out = String::new();
                for part in &parts {
                    match part {
                        AvtPart::Static(s) => out.push_str(s),
                        AvtPart::Dynamic(expr) => {
                            out.push_str(&self.evaluate_parsed(expr, value, ctx)?.to_string())
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    /// The attribute's literal text, not expanded. Used for expression attributes.
    pub fn required_raw<'r>(&self, rule: &'r RuleElement, name: &str) -> Result<&'r str, PublishError> {
        rule.attribute(name).ok_or_else(|| missing(rule, name))
    }

    pub fn attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<String>, PublishError> {
        rule.attribute(name)
            .map(|value| self.expand(value, ctx))
            .transpose()
    }

    pub fn required_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<String, PublishError> {
        self.attribute(rule, name, ctx)?
            .ok_or_else(|| missing(rule, name))
    }

    pub fn attribute_or(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
        default: &str,
    ) -> Result<String, PublishError> {
        Ok(self
            .attribute(rule, name, ctx)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn number_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<f64>, PublishError> {
        let Some(value) = self.attribute(rule, name, ctx)? else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(rule, name, &value, "not a number"))
    }

    /// A positive whole number of grid cells.
    pub fn cells_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<u32>, PublishError> {
        let Some(value) = self.attribute(rule, name, ctx)? else {
            return Ok(None);
        };
        match value.trim().parse::<u32>() {
            Ok(n) if n >= 1 => Ok(Some(n)),
            _ => Err(invalid(rule, name, &value, "expected a positive whole number")),
        }
    }

    /// A grid position; may be zero or negative to reach into the margins.
    pub fn position_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<i64>, PublishError> {
        let Some(value) = self.attribute(rule, name, ctx)? else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(rule, name, &value, "expected a whole number"))
    }

    /// A length with unit, in points. A bare number is taken as points.
    pub fn length_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<f64>, PublishError> {
        let Some(value) = self.attribute(rule, name, ctx)? else {
            return Ok(None);
        };
        run_parser(parse_length, &value)
            .map(Some)
            .map_err(|e| invalid(rule, name, &value, e.to_string()))
    }

    /// A bare number of grid cells or a length with unit.
    pub fn extent_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
    ) -> Result<Option<Extent>, PublishError> {
        let Some(value) = self.attribute(rule, name, ctx)? else {
            return Ok(None);
        };
        match run_parser(parse_extent, &value) {
            Ok(Extent::Cells(n) | Extent::Length(n)) if !n.is_finite() => {
                Err(invalid(rule, name, &value, "size is out of range"))
            }
            Ok(extent) => Ok(Some(extent)),
            Err(e) => Err(invalid(rule, name, &value, e.to_string())),
        }
    }

    /// `yes`/`true` or `no`/`false`.
    pub fn bool_attribute(
        &self,
        rule: &RuleElement,
        name: &str,
        ctx: DataContext<'a, 'input>,
        default: bool,
    ) -> Result<bool, PublishError> {
        match self.attribute(rule, name, ctx)?.as_deref().map(str::trim) {
            None => Ok(default),
            Some("yes" | "true") => Ok(true),
            Some("no" | "false") => Ok(false),
            Some(other) => Err(invalid(rule, name, other, "expected yes/no or true/false")),
        }
    }

    // --- Pages ---

    /// Makes sure there is a page or group to place content on, creating a page
    /// of the selected page type if necessary.
    pub fn ensure_target(&mut self, ctx: DataContext<'a, 'input>) -> Result<(), PublishError> {
        if self.document.has_target() {
            return Ok(());
        }
        self.document.begin_page_creation()?;
        let result = self
            .select_pagetype(ctx)
            .and_then(|pagetype| self.document.install_page(&pagetype));
        self.document.end_page_creation();
        result
    }

    /// The most recently registered page type whose test holds for `ctx`.
    pub fn select_pagetype(&self, ctx: DataContext<'a, 'input>) -> Result<PageType, PublishError> {
        let selected = self
            .document
            .pagetypes
            .select(|pagetype| self.test_pagetype(pagetype, ctx))?;
        selected
            .cloned()
            .ok_or_else(|| ErrorKind::NoPagetype.into())
    }

    fn test_pagetype(
        &self,
        pagetype: &PageType,
        ctx: DataContext<'a, 'input>,
    ) -> Result<bool, PublishError> {
        match self.evaluate(&pagetype.test, ctx)? {
            Value::Boolean(eligible) => Ok(eligible),
            other => Err(ErrorKind::MalformedPredicate {
                pagetype: pagetype.name.clone(),
                found: describe(&other),
            }
            .into()),
        }
    }
}

pub(crate) fn missing(rule: &RuleElement, attribute: &str) -> PublishError {
    ErrorKind::MissingAttribute {
        element: rule.name.clone(),
        attribute: attribute.to_string(),
        line: rule.line,
    }
    .into()
}

pub(crate) fn invalid(
    rule: &RuleElement,
    attribute: &str,
    value: &str,
    reason: impl Into<String>,
) -> PublishError {
    ErrorKind::InvalidAttribute {
        element: rule.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
    .into()
}

pub(crate) fn rule_error(rule: &RuleElement, message: impl Into<String>) -> PublishError {
    ErrorKind::Rule {
        element: rule.name.clone(),
        line: rule.line,
        message: message.into(),
    }
    .into()
}

fn describe(value: &Value<'_, '_>) -> String {
    match value {
        Value::NodeSet(nodes) => format!("a node set of {} node(s)", nodes.len()),
        Value::String(s) => format!("the string '{}'", s),
        Value::Number(n) => format!("the number {}", format_number(*n)),
        Value::Boolean(b) => format!("the boolean {}", b),
    }
}
