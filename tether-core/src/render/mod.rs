//! Live Rendering
//!
//! Turns static templates into live nodes.
//!
//! # Pipeline
//!
//! 1. Markup is parsed into [`TemplateNode`]s.
//! 2. With a scope, the templates are compiled into blueprints: every
//!    expression is parsed, every directive validated.
//! 3. Blueprints are instantiated against the scope. Each interpolation and
//!    directive creates a [`Binding`](crate::binding::Binding) registered
//!    under the node it targets.
//!
//! Without a scope, templates are copied into live nodes verbatim, with no
//! compilation and no bindings.
//!
//! # Directives
//!
//! | Attribute          | Effect                                             |
//! |--------------------|----------------------------------------------------|
//! | `m-for="items"`    | one copy of the element per item                   |
//! | `m-if="flag"`      | element present only while `flag` is truthy        |
//! | `m-on:click="fn"`  | call scope method `fn` on `click`                  |
//! | `m-bind:value="p"` | two-way sync of the control's value with `p`       |
//! | `m-bind:checked="p"` | two-way sync of a checkbox with `p`              |
//!
//! `m-for` applies before `m-if` on the same element.

mod blueprint;
mod conditional;
mod event;
mod list;
mod two_way;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::binding::{Binding, BindingKind};
use crate::config::RenderConfig;
use crate::dom::{parse_markup, Document, ElementTemplate, Node, TemplateNode};
use crate::error::Result;
use crate::expr::Expression;
use crate::reactive::Scope;

use blueprint::{compile, Blueprint, ElementBlueprint, TextBlueprint};
use conditional::ConditionalState;

/// Where [`Renderer::render`] reads its markup from.
#[derive(Debug, Clone, Copy)]
pub enum TemplateSource<'a> {
    /// Markup text.
    Markup(&'a str),
    /// An element (typically a `<script type="text/template">`) whose text
    /// content is the markup.
    Element(&'a Node),
}

impl<'a> From<&'a str> for TemplateSource<'a> {
    fn from(markup: &'a str) -> Self {
        Self::Markup(markup)
    }
}

impl<'a> From<&'a Node> for TemplateSource<'a> {
    fn from(element: &'a Node) -> Self {
        Self::Element(element)
    }
}

/// The node currently occupying an instantiated blueprint's position.
pub(crate) enum Slot {
    Fixed(Node),
    Conditional(Rc<RefCell<ConditionalState>>),
}

impl Slot {
    pub(crate) fn current(&self) -> Node {
        match self {
            Slot::Fixed(node) => node.clone(),
            Slot::Conditional(state) => state.borrow().current(),
        }
    }
}

/// Renders templates into one document.
#[derive(Debug, Clone)]
pub struct Renderer {
    document: Document,
    config: Rc<RenderConfig>,
}

impl Renderer {
    /// A renderer with the default template syntax.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            config: Rc::new(RenderConfig::default()),
        }
    }

    pub fn with_config(document: Document, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            document,
            config: Rc::new(config),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render markup, or the text of a template element, against `scope`.
    pub fn render(&self, source: TemplateSource<'_>, scope: &Scope) -> Result<Node> {
        let markup = match source {
            TemplateSource::Markup(markup) => markup.to_string(),
            TemplateSource::Element(element) => element.text_content(),
        };
        self.render_fragment_from_html(&markup, Some(scope))
    }

    /// Parse and render markup into a fragment. Without a scope the result
    /// is static.
    pub fn render_fragment_from_html(&self, html: &str, scope: Option<&Scope>) -> Result<Node> {
        let templates = parse_markup(html)?;
        match scope {
            Some(scope) => self.render_templates(&templates, scope),
            None => {
                let fragment = self.document.create_document_fragment();
                for template in &templates {
                    fragment.append_child(&self.create_static(template));
                }
                Ok(fragment)
            }
        }
    }

    /// Compile and instantiate already parsed templates into a fragment.
    pub fn render_templates(&self, templates: &[TemplateNode], scope: &Scope) -> Result<Node> {
        let blueprints = templates
            .iter()
            .map(|template| compile(template, &self.config))
            .collect::<Result<Vec<_>>>()?;

        let fragment = self.document.create_document_fragment();
        for blueprint in &blueprints {
            fragment.append_child(&self.instantiate(blueprint, scope).0);
        }
        debug!(templates = templates.len(), nodes = fragment.child_count(), "rendered fragment");
        Ok(fragment)
    }

    /// A static element copied from `template`, attributes verbatim.
    ///
    /// Defined custom elements are constructed through the document's
    /// custom element registry.
    pub fn create_live_element(&self, template: &ElementTemplate) -> Node {
        let element = self.create_element(&template.tag_name);
        for attribute in &template.attributes {
            element.set_attribute(&attribute.name, &attribute.value);
        }
        for child in &template.children {
            element.append_child(&self.create_static(child));
        }
        element
    }

    /// A fragment holding one text node for `text`. With a scope, the text
    /// node is bound to the interpolations in `text`.
    pub fn create_live_text_fragment(&self, text: &str, scope: Option<&Scope>) -> Result<Node> {
        let fragment = self.document.create_document_fragment();
        let node = match scope {
            Some(scope) => {
                let blueprint = TextBlueprint {
                    text: text.to_string(),
                    expression: Expression::parse_template(text, &self.config)?,
                };
                self.instantiate_text(&blueprint, scope)
            }
            None => self.document.create_text_node(text),
        };
        fragment.append_child(&node);
        Ok(fragment)
    }

    fn create_static(&self, template: &TemplateNode) -> Node {
        match template {
            TemplateNode::Text(text) => self.document.create_text_node(text),
            TemplateNode::Element(element) => self.create_live_element(element),
        }
    }

    fn create_element(&self, tag_name: &str) -> Node {
        match self.document.custom_elements().construct(tag_name) {
            Some(component) => self.document.create_custom_element(tag_name, component),
            None => self.document.create_element(tag_name),
        }
    }

    /// Instantiate a blueprint. Returns the node to insert and the slot
    /// tracking which node holds its position.
    pub(crate) fn instantiate(&self, blueprint: &Blueprint, scope: &Scope) -> (Node, Slot) {
        match blueprint {
            Blueprint::Text(text) => {
                let node = self.instantiate_text(text, scope);
                (node.clone(), Slot::Fixed(node))
            }
            Blueprint::Element(element) => {
                let node = self.instantiate_element(element, scope);
                (node.clone(), Slot::Fixed(node))
            }
            Blueprint::Conditional(conditional) => conditional::instantiate(self, conditional, scope),
            Blueprint::List(list) => list::instantiate(self, list, scope),
        }
    }

    fn instantiate_text(&self, blueprint: &TextBlueprint, scope: &Scope) -> Node {
        let Some(expression) = &blueprint.expression else {
            return self.document.create_text_node(&blueprint.text);
        };
        let node = self.document.create_text_node("");
        Binding::reactive(
            node.clone(),
            BindingKind::Text,
            expression.clone(),
            scope.clone(),
            |binding, value| binding.node().set_node_value(&value.to_text()),
        );
        node
    }

    fn instantiate_element(&self, blueprint: &ElementBlueprint, scope: &Scope) -> Node {
        let element = self.create_element(&blueprint.tag_name);
        for (name, value) in &blueprint.attributes {
            element.set_attribute(name, value);
        }

        for (name, expression) in &blueprint.bound_attributes {
            let attribute = name.clone();
            Binding::reactive(
                element.clone(),
                BindingKind::Attribute(name.clone()),
                expression.clone(),
                scope.clone(),
                move |binding, value| binding.node().set_attribute(&attribute, &value.to_text()),
            );
        }
        for (name, handler) in &blueprint.events {
            event::bind(&element, name, handler, scope);
        }
        for (target, expression) in &blueprint.two_way {
            two_way::bind(&element, *target, expression, scope);
        }

        for child in &blueprint.children {
            element.append_child(&self.instantiate(child, scope).0);
        }
        element
    }
}
