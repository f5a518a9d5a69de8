//! Custom element definitions.
//!
//! Maps a tag name to a constructor for the element's instance. The renderer
//! consults the registry whenever it creates an element and attaches the
//! constructed instance to the node, where it can be recovered with
//! [`Node::component`](super::Node::component).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Builds the instance backing one custom element.
pub type ElementConstructor = Rc<dyn Fn() -> Rc<dyn Any>>;

/// Tag name → constructor, scoped to one document.
#[derive(Default)]
pub struct CustomElementRegistry {
    definitions: RefCell<HashMap<String, ElementConstructor>>,
}

impl CustomElementRegistry {
    /// Define a custom element.
    ///
    /// Names must be lower-case ASCII, start with a letter and contain a
    /// hyphen. A name can only be defined once.
    pub fn define<T, F>(&self, name: &str, constructor: F) -> Result<()>
    where
        T: Any,
        F: Fn() -> T + 'static,
    {
        validate_name(name)?;

        let mut definitions = self.definitions.borrow_mut();
        if definitions.contains_key(name) {
            return Err(Error::CustomElement {
                name: name.to_string(),
                reason: "already defined".to_string(),
            });
        }
        definitions.insert(
            name.to_string(),
            Rc::new(move || Rc::new(constructor()) as Rc<dyn Any>),
        );
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.borrow().contains_key(&name.to_ascii_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<ElementConstructor> {
        self.definitions.borrow().get(&name.to_ascii_lowercase()).cloned()
    }

    /// Construct an instance for `name`, if it is defined.
    pub fn construct(&self, name: &str) -> Option<Rc<dyn Any>> {
        // Release the borrow before running user code.
        let constructor = self.get(name)?;
        Some(constructor())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(Error::CustomElement {
            name: name.to_string(),
            reason: "not a valid custom element name".to_string(),
        })
    }
}

impl fmt::Debug for CustomElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.definitions.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("CustomElementRegistry").field("names", &names).finish()
    }
}
