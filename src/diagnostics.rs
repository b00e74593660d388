use std::collections::BTreeMap;

type Action = Box<dyn Fn() -> String + Send + Sync>;

/// Named, argument-less diagnostic actions a console can invoke.
///
/// Actions are registered once during startup; the registry is shared
/// read-only afterwards.
#[derive(Default)]
pub struct DiagnosticRegistry {
    actions: BTreeMap<String, Action>,
}

impl DiagnosticRegistry {
    pub fn new() -> Self { Self::default() }

    /// Registers `action` under `name`, replacing an earlier one of the same name.
    pub fn register(&mut self, name: &str, action: impl Fn() -> String + Send + Sync + 'static) {
        self.actions.insert(name.to_lowercase(), Box::new(action));
    }

    /// Runs the action registered under `name`. `help` lists all names.
    pub fn invoke(&self, name: &str) -> Option<String> {
        let key = name.trim().to_lowercase();
        if key == "help" && !self.actions.contains_key("help") {
            return Some(self.names().join(", "));
        }
        self.actions.get(&key).map(|action| action())
    }

    /// Sorted names of every invocable action, the built-in `help` included.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        if let Err(pos) = names.binary_search_by(|n| n.as_str().cmp("help")) {
            names.insert(pos, String::from("help"));
        }
        names
    }
}

impl std::fmt::Debug for DiagnosticRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticRegistry").field("actions", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::DiagnosticRegistry;

    #[test]
    fn test_invoke_by_name() {
        let mut registry = DiagnosticRegistry::new();
        registry.register("ping", || String::from("pong"));
        registry.register("Version", || String::from("1"));
        assert_eq!(registry.invoke("ping").as_deref(), Some("pong"));
        assert_eq!(registry.invoke(" VERSION ").as_deref(), Some("1"));
        assert_eq!(registry.invoke("missing"), None);
        assert_eq!(registry.invoke("help").as_deref(), Some("help, ping, version"));
        assert_eq!(registry.names(), vec!["help", "ping", "version"]);
    }
}
