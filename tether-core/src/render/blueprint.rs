//! Template compilation.
//!
//! A static template tree is compiled into a blueprint before any live node
//! is created: every interpolation and directive expression is parsed up
//! front, so a broken expression fails the render even when it sits in a
//! hidden `m-if` branch or an empty `m-for`.

use std::rc::Rc;

use crate::config::RenderConfig;
use crate::dom::{ElementTemplate, TemplateNode};
use crate::error::{Error, Result};
use crate::expr::Expression;

use super::two_way::TwoWayTarget;

#[derive(Debug)]
pub(crate) enum Blueprint {
    Text(TextBlueprint),
    Element(ElementBlueprint),
    Conditional(ConditionalBlueprint),
    List(ListBlueprint),
}

#[derive(Debug)]
pub(crate) struct TextBlueprint {
    pub(crate) text: String,
    pub(crate) expression: Option<Expression>,
}

#[derive(Debug)]
pub(crate) struct ElementBlueprint {
    pub(crate) tag_name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) bound_attributes: Vec<(Rc<str>, Expression)>,
    pub(crate) events: Vec<(Rc<str>, Expression)>,
    pub(crate) two_way: Vec<(TwoWayTarget, Expression)>,
    pub(crate) children: Vec<Blueprint>,
}

/// `m-if`: the body is the element carrying the directive.
#[derive(Debug)]
pub(crate) struct ConditionalBlueprint {
    pub(crate) condition: Expression,
    pub(crate) body: Rc<Blueprint>,
}

/// `m-for`: the body is instantiated once per item.
#[derive(Debug)]
pub(crate) struct ListBlueprint {
    pub(crate) collection: Expression,
    pub(crate) body: Rc<Blueprint>,
}

pub(crate) fn compile(node: &TemplateNode, config: &RenderConfig) -> Result<Blueprint> {
    match node {
        TemplateNode::Text(text) => Ok(Blueprint::Text(TextBlueprint {
            text: text.clone(),
            expression: Expression::parse_template(text, config)?,
        })),
        TemplateNode::Element(element) => compile_element(element, config),
    }
}

fn compile_element(template: &ElementTemplate, config: &RenderConfig) -> Result<Blueprint> {
    let mut element = ElementBlueprint {
        tag_name: template.tag_name.clone(),
        attributes: Vec::new(),
        bound_attributes: Vec::new(),
        events: Vec::new(),
        two_way: Vec::new(),
        children: Vec::new(),
    };
    let mut condition = None;
    let mut collection = None;

    for attribute in &template.attributes {
        let value = attribute.value.as_str();
        let Some(directive) = config.directive(&attribute.name) else {
            match Expression::parse_template(value, config)? {
                Some(expression) => element
                    .bound_attributes
                    .push((attribute.name.as_str().into(), expression)),
                None => element
                    .attributes
                    .push((attribute.name.clone(), value.to_string())),
            }
            continue;
        };

        if directive == "if" {
            condition = Some(Expression::parse_directive(value, config)?);
        } else if directive == "for" {
            collection = Some(Expression::parse_directive(value, config)?);
        } else if let Some(event) = directive.strip_prefix("on:").filter(|e| !e.is_empty()) {
            element
                .events
                .push((event.into(), Expression::parse_directive(value, config)?));
        } else if let Some(target) = directive.strip_prefix("bind:") {
            let target = TwoWayTarget::from_name(target).ok_or_else(|| unsupported(&attribute.name))?;
            element.two_way.push((target, bindable(value, config)?));
        } else {
            return Err(unsupported(&attribute.name));
        }
    }

    for child in &template.children {
        element.children.push(compile(child, config)?);
    }

    let mut blueprint = Blueprint::Element(element);
    if let Some(condition) = condition {
        blueprint = Blueprint::Conditional(ConditionalBlueprint {
            condition,
            body: Rc::new(blueprint),
        });
    }
    if let Some(collection) = collection {
        blueprint = Blueprint::List(ListBlueprint {
            collection,
            body: Rc::new(blueprint),
        });
    }
    Ok(blueprint)
}

/// A two-way target must be a single path, bare or interpolated.
fn bindable(value: &str, config: &RenderConfig) -> Result<Expression> {
    match Expression::parse_template(value, config)? {
        Some(expression) => {
            expression.require_path()?;
            Ok(expression)
        }
        None => Expression::parse_directive(value, config),
    }
}

fn unsupported(name: &str) -> Error {
    Error::UnsupportedDirective {
        directive: name.to_string(),
    }
}
