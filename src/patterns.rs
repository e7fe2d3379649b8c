use crate::rules::RuleElement;
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// Layout rules registered by `Record`, keyed by data element name and mode.
#[derive(Debug, Default)]
pub struct DataPatternRegistry {
    rules: HashMap<(String, String), Rc<RuleElement>>,
}

impl DataPatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rule` for `element` in `mode` (empty for the default mode). An
    /// existing registration for the same key is replaced.
    pub fn record(&mut self, element: &str, mode: &str, rule: Rc<RuleElement>) {
        let key = (element.to_string(), mode.to_string());
        if self.rules.insert(key, rule).is_some() {
            debug!("Rule for <{}> (mode '{}') replaced", element, mode);
        }
    }

    pub fn lookup(&self, element: &str, mode: &str) -> Option<Rc<RuleElement>> {
        self.rules
            .get(&(element.to_string(), mode.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
