//! Hydration of DSL placeholders against a resolution context.

use crate::color;
use crate::config::{
    number::css, ColorScheme, ResolveMode, BREAKPOINT_STEP, DEFAULT_BREAKPOINTS,
    DEFAULT_CONTRAST_THRESHOLD, DEFAULT_EMPHASIS, DEFAULT_SPACING_FACTOR,
};
use crate::error::{Result, ThemeError};
use crate::model::{BreakpointDirection, BreakpointKey, DslNode};
use crate::path::{get_at_path, join_path};
use serde_json::{Number, Value};

/// What placeholders are resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionContext {
    /// Theme fragment token reads and breakpoint tables come from.
    pub template: Value,
    pub scheme: ColorScheme,
    /// Pixels per `spacing(1)`.
    pub spacing_factor: f64,
}

impl ResolutionContext {
    /// Build a context, taking the spacing factor from `template.spacing` when numeric.
    pub fn new(template: Value, scheme: ColorScheme) -> Self {
        let spacing_factor = template
            .get("spacing")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_SPACING_FACTOR);
        Self {
            template,
            scheme,
            spacing_factor,
        }
    }

    /// Breakpoint widths sorted ascending, from `breakpoints.values` or the defaults.
    pub fn breakpoints(&self) -> Vec<(String, f64)> {
        let mut table: Vec<(String, f64)> = match get_at_path(&self.template, "breakpoints.values")
        {
            Some(Value::Object(values)) => values
                .iter()
                .filter_map(|(k, v)| v.as_f64().map(|w| (k.clone(), w)))
                .collect(),
            _ => Vec::new(),
        };
        if table.is_empty() {
            table = DEFAULT_BREAKPOINTS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect();
        }
        table.sort_by(|a, b| a.1.total_cmp(&b.1));
        table
    }

    fn breakpoint_step(&self) -> f64 {
        get_at_path(&self.template, "breakpoints.step")
            .and_then(Value::as_f64)
            .unwrap_or(BREAKPOINT_STEP)
    }

    fn contrast_threshold(&self) -> f64 {
        get_at_path(&self.template, "palette.contrastThreshold")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_CONTRAST_THRESHOLD)
    }

    /// Media query for a breakpoint placeholder.
    pub fn media_query(
        &self,
        key: &BreakpointKey,
        direction: BreakpointDirection,
        end: Option<&BreakpointKey>,
    ) -> std::result::Result<String, String> {
        let table = self.breakpoints();
        let width = |k: &BreakpointKey| match k {
            BreakpointKey::Width(w) => Ok(*w),
            BreakpointKey::Named(name) => table
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, w)| *w)
                .ok_or_else(|| format!("unknown breakpoint '{}'", name)),
        };
        let gap = self.breakpoint_step() / 100.0;
        let up = |w: f64| format!("@media (min-width:{}px)", css(w));
        let between = |start: f64, stop: f64| {
            format!(
                "@media (min-width:{}px) and (max-width:{}px)",
                css(start),
                css(stop - gap)
            )
        };

        match direction {
            BreakpointDirection::Up => Ok(up(width(key)?)),
            BreakpointDirection::Down => Ok(format!("@media (max-width:{}px)", css(width(key)? - gap))),
            BreakpointDirection::Between => {
                let end = end.ok_or_else(|| "between() needs an end breakpoint".to_string())?;
                Ok(between(width(key)?, width(end)?))
            }
            BreakpointDirection::Only => {
                let start = width(key)?;
                let next = match key {
                    BreakpointKey::Named(name) => table
                        .iter()
                        .position(|(n, _)| n == name)
                        .and_then(|idx| table.get(idx + 1))
                        .map(|(_, w)| *w),
                    BreakpointKey::Width(_) => None,
                };
                Ok(match next {
                    Some(stop) => between(start, stop),
                    None => up(start),
                })
            }
        }
    }
}

/// A style callback hydrated from a DSL callback node.
///
/// Calling it re-resolves the captured body; the code evaluator never runs
/// again at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleCallback {
    pub params: Vec<String>,
    body: DslNode,
    context: ResolutionContext,
    mode: ResolveMode,
}

impl StyleCallback {
    /// Invoke with a props object. A `theme` object in props replaces the
    /// captured template for this call.
    pub fn call(&self, props: &Value) -> Result<Value> {
        let live;
        let context = match props.get("theme").filter(|t| t.is_object()) {
            Some(theme) => {
                live = ResolutionContext::new(theme.clone(), self.context.scheme);
                &live
            }
            None => &self.context,
        };
        let mut hydrator = Hydrator::new(context, self.mode);
        hydrator.props = Some(props);
        Ok(hydrator.node(&self.body, "")?.unwrap_or(Value::Null))
    }

    /// The captured body.
    pub fn body(&self) -> &DslNode {
        &self.body
    }
}

/// Result of hydrating a compiled override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydrated {
    /// Plain configuration fragment. Callback positions are omitted.
    pub value: Value,
    /// Callbacks by dot-path.
    pub callbacks: Vec<(String, StyleCallback)>,
    /// Lenient-mode warnings.
    pub warnings: Vec<String>,
}

/// Hydrate `node` against `context`.
///
/// In strict mode the first missing token, unknown breakpoint or failing
/// helper is an error; in lenient mode it becomes a warning and resolves to `""`.
pub fn hydrate(node: &DslNode, context: &ResolutionContext, mode: ResolveMode) -> Result<Hydrated> {
    let mut hydrator = Hydrator::new(context, mode);
    let value = hydrator.node(node, "")?.unwrap_or(Value::Null);
    Ok(Hydrated {
        value,
        callbacks: hydrator.callbacks,
        warnings: hydrator.warnings,
    })
}

struct Hydrator<'a> {
    context: &'a ResolutionContext,
    mode: ResolveMode,
    props: Option<&'a Value>,
    callbacks: Vec<(String, StyleCallback)>,
    warnings: Vec<String>,
}

impl<'a> Hydrator<'a> {
    fn new(context: &'a ResolutionContext, mode: ResolveMode) -> Self {
        Self {
            context,
            mode,
            props: None,
            callbacks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a placeholder failure per the failure policy.
    fn fail(&mut self, placeholder: String, message: String) -> Result<Value> {
        match self.mode {
            ResolveMode::Strict => Err(ThemeError::Hydration {
                placeholder,
                message,
            }),
            ResolveMode::Lenient => {
                tracing::warn!("Hydration of '{}' failed: {}", placeholder, message);
                self.warnings
                    .push(format!("Cannot hydrate '{}': {}", placeholder, message));
                Ok(Value::String(String::new()))
            }
        }
    }

    /// Hydrate one node. `None` marks a callback, which is kept out of the tree.
    fn node(&mut self, node: &DslNode, path: &str) -> Result<Option<Value>> {
        let value = match node {
            DslNode::Literal { value } => value.clone(),
            DslNode::Array { items } => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let child = self.node(item, &join_path(path, &idx.to_string()))?;
                    out.push(child.unwrap_or(Value::Null));
                }
                Value::Array(out)
            }
            DslNode::Object { entries } => {
                let mut out = serde_json::Map::new();
                for (key, item) in entries {
                    let (key, item) = match item {
                        DslNode::Keyed { key, value } => match self.computed_key(key, path)? {
                            Some(computed) => (computed, &**value),
                            None => continue,
                        },
                        _ => (key.clone(), item),
                    };
                    if let Some(child) = self.node(item, &join_path(path, &key))? {
                        out.insert(key, child);
                    }
                }
                Value::Object(out)
            }
            DslNode::Keyed { value, .. } => return self.node(value, path),
            DslNode::Spacing { factors } => {
                let factor = self.context.spacing_factor;
                match factors.as_slice() {
                    [single] => number_value(single * factor),
                    many => Value::String(
                        many.iter()
                            .map(|f| format!("{}px", css(f * factor)))
                            .collect::<Vec<_>>()
                            .join(" "),
                    ),
                }
            }
            DslNode::Token { path: token } => match get_at_path(&self.context.template, token) {
                Some(found) => found.clone(),
                None => self.fail(
                    format!("theme.{}", token),
                    "token is not defined by the template".to_string(),
                )?,
            },
            DslNode::Breakpoint {
                key,
                direction,
                end,
            } => match self.context.media_query(key, *direction, end.as_ref()) {
                Ok(query) => Value::String(query),
                Err(message) => {
                    self.fail(format!("theme.breakpoints.{}({})", direction, key), message)?
                }
            },
            DslNode::Helper { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.node(arg, path)?.unwrap_or(Value::Null));
                }
                match self.call_helper(name, &values) {
                    Ok(value) => value,
                    Err(message) => self.fail(format!("{}()", name), message)?,
                }
            }
            DslNode::Callback { params, body } => {
                self.callbacks.push((
                    path.to_string(),
                    StyleCallback {
                        params: params.clone(),
                        body: (**body).clone(),
                        context: self.context.clone(),
                        mode: self.mode,
                    },
                ));
                return Ok(None);
            }
            DslNode::Prop { path: prop } => match self.props {
                Some(props) if prop.is_empty() => props.clone(),
                Some(props) => get_at_path(props, prop).cloned().unwrap_or(Value::Null),
                None => self.fail(
                    prop.clone(),
                    "props are only available inside style callbacks".to_string(),
                )?,
            },
        };
        Ok(Some(value))
    }

    /// Hydrate a computed object key. `None` skips the entry after a lenient failure.
    fn computed_key(&mut self, key: &DslNode, path: &str) -> Result<Option<String>> {
        let computed = match self.node(key, path)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            other => {
                let found = other.map_or_else(|| "a callback".to_string(), |v| v.to_string());
                match self.fail(
                    format!("[{}]", path),
                    format!("computed key evaluated to {}", found),
                )? {
                    Value::String(s) => s,
                    _ => String::new(),
                }
            }
        };
        Ok(Some(computed).filter(|k| !k.is_empty()))
    }

    fn call_helper(&self, name: &str, args: &[Value]) -> std::result::Result<Value, String> {
        let text = |idx: usize| -> std::result::Result<&str, String> {
            args.get(idx)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("argument {} must be a color string", idx + 1))
        };
        let amount = |idx: usize| -> std::result::Result<f64, String> {
            args.get(idx)
                .and_then(Value::as_f64)
                .ok_or_else(|| format!("argument {} must be a number", idx + 1))
        };
        let to_value = |r: std::result::Result<String, crate::error::ColorError>| {
            r.map(Value::String).map_err(|e| e.to_string())
        };

        match name {
            "alpha" => to_value(color::alpha(text(0)?, amount(1)?)),
            "lighten" => to_value(color::lighten(text(0)?, amount(1)?)),
            "darken" => to_value(color::darken(text(0)?, amount(1)?)),
            "emphasize" => {
                let coefficient = if args.len() > 1 { amount(1)? } else { DEFAULT_EMPHASIS };
                to_value(color::emphasize(text(0)?, coefficient))
            }
            "getContrastRatio" => color::contrast_ratio(text(0)?, text(1)?)
                .map(number_value)
                .map_err(|e| e.to_string()),
            "getContrastText" => to_value(color::contrast_text(
                text(0)?,
                self.context.contrast_threshold(),
            )),
            "rgbToHex" => to_value(color::rgb_to_hex(text(0)?)),
            "hexToRgb" => to_value(color::hex_to_rgb(text(0)?)),
            other => Err(format!("unknown helper '{}'", other)),
        }
    }
}

/// JSON number, integral when possible.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}
