use std::fmt;
use std::sync::Arc;

use crate::args::ArgBag;

/// A registered callable. Returning `None` signals a hard failure and aborts
/// the dispatch loop; recoverable problems should be reported as a string
/// result instead.
pub type ToolFn = Arc<dyn Fn(&ArgBag) -> Option<String> + Send + Sync>;

/// Describes one parameter of a tool as advertised to the model.
///
/// `type_tag` is carried verbatim into the manifest; tags the marshaller
/// does not understand survive to the wire and coerce to absent on the way
/// back in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub type_tag: String,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn new(
        name: impl Into<String>,
        type_tag: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            description: description.into(),
            required,
        }
    }
}

/// A locally callable function exposed to the model under a name.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    callable: Option<ToolFn>,
}

impl Tool {
    fn new(name: String) -> Self {
        Self {
            name,
            description: String::new(),
            params: Vec::new(),
            callable: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Append a parameter descriptor. Registration order is the order the
    /// model sees in the manifest.
    pub fn add_param(&mut self, param: ParamSpec) -> &mut Self {
        self.params.push(param);
        self
    }

    pub fn set_callable<F>(&mut self, callable: F) -> &mut Self
    where
        F: Fn(&ArgBag) -> Option<String> + Send + Sync + 'static,
    {
        self.callable = Some(Arc::new(callable));
        self
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// A tool registered without a callable refuses every invocation.
    pub(crate) fn invoke(&self, args: &ArgBag) -> Option<String> {
        self.callable.as_ref().and_then(|callable| callable(args))
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("has_callable", &self.callable.is_some())
            .finish()
    }
}

/// Registered tools, kept in registration order so manifest builds are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent by name: re-registering returns the existing entry.
    pub fn add_tool(&mut self, name: impl Into<String>) -> &mut Tool {
        let name = name.into();
        let idx = match self.tools.iter().position(|tool| tool.name == name) {
            Some(idx) => idx,
            None => {
                self.tools.push(Tool::new(name));
                self.tools.len() - 1
            }
        };
        &mut self.tools[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_tool_is_idempotent_by_name() {
        let mut registry = ToolRegistry::new();
        registry.add_tool("echo").set_description("first");
        registry.add_tool("echo").add_param(ParamSpec::new(
            "text",
            "string",
            "what to echo",
            true,
        ));

        assert_eq!(registry.len(), 1);
        let tool = registry.get("echo").unwrap();
        assert_eq!(tool.description(), "first");
        assert_eq!(tool.params().len(), 1);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = ToolRegistry::new();
        registry.add_tool("zeta");
        registry.add_tool("alpha");
        registry.add_tool("mid");

        let names: Vec<&str> = registry.iter().map(Tool::name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn tool_without_callable_refuses() {
        let mut registry = ToolRegistry::new();
        registry.add_tool("stub");

        let bag = crate::args::ArgBag::default();
        assert_eq!(registry.get("stub").unwrap().invoke(&bag), None);
    }

    #[test]
    fn callable_sees_coerced_args() {
        let mut registry = ToolRegistry::new();
        registry
            .add_tool("greet")
            .add_param(ParamSpec::new("who", "string", "greeting target", true))
            .set_callable(|args| args.get_str("who").map(|who| format!("hi {who}")));

        let mut bag = crate::args::ArgBag::default();
        bag.set("who", crate::args::ArgValue::Str("world".into()));
        assert_eq!(
            registry.get("greet").unwrap().invoke(&bag),
            Some("hi world".into())
        );
    }
}
