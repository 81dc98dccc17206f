//! Logging and debugging facilities.
//!
//! linkki is instrumented with the `tracing` crate. Nothing is printed unless
//! the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_max_level(tracing::Level::TRACE)
//!     .init();
//! ```
//!
//! Cache population and dispatcher chain construction log at trace level,
//! dropped writes to read-only properties at debug level.
//!
//! Use [`BindingTreeDebug`] to look at the bindings of a context:
//!
//! ```ignore
//! use linkki_core::logging::BindingTreeDebug;
//!
//! println!("{}", BindingTreeDebug::new().format(&context));
//! ```

use std::fmt;

use crate::binding::{Binding, BindingContext};

/// Target names for log filtering. Every event of linkki uses one of these.
pub mod targets {
    pub const CORE: &str = "linkki_core";
    /// Property accessor resolution and caching.
    pub const ACCESSOR: &str = "linkki_core::accessor";
    /// Dispatcher chain construction.
    pub const DISPATCHER: &str = "linkki_core::dispatcher";
    /// Reading UI annotations.
    pub const ANNOTATION: &str = "linkki_core::annotation";
    /// Bindings, contexts and component events.
    pub const BINDING: &str = "linkki_core::binding";
}

/// Style of the binding tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Options of [`BindingTreeDebug`].
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show binding ids of top-level bindings.
    pub show_ids: bool,
    /// Show the PMO type of every binding.
    pub show_types: bool,
    /// Show the current component value.
    pub show_values: bool,
    /// Maximum nesting depth, unlimited if `None`.
    pub max_depth: Option<usize>,
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_values: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    pub fn detailed() -> Self {
        Self {
            show_values: true,
            ..Default::default()
        }
    }

    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_values: false,
            ..Default::default()
        }
    }
}

/// Formats the bindings of a [`BindingContext`] as a tree.
#[derive(Debug, Clone, Default)]
pub struct BindingTreeDebug {
    options: TreeFormatOptions,
}

impl BindingTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format all bindings of `context`.
    pub fn format(&self, context: &BindingContext) -> String {
        self.display(context).to_string()
    }

    /// A [`Display`](fmt::Display) view of the tree of `context`.
    pub fn display<'a>(&'a self, context: &'a BindingContext) -> impl fmt::Display + 'a {
        BindingTree {
            debug: self,
            context,
        }
    }

    fn write_binding(
        &self,
        f: &mut fmt::Formatter<'_>,
        binding: &dyn Binding,
        label: Option<String>,
        ancestors_last: &mut Vec<bool>,
        is_last: bool,
    ) -> fmt::Result {
        let depth = ancestors_last.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        f.write_str(&self.prefix(ancestors_last, is_last))?;
        let property = binding.property();
        if property.is_empty() {
            f.write_str("(container)")?;
        } else {
            f.write_str(property)?;
        }
        write!(f, " <{}>", binding.component().kind())?;
        if let Some(label) = label {
            write!(f, " {label}")?;
        }
        if self.options.show_types {
            write!(f, " ({})", binding.pmo().meta_class().simple_name())?;
        }
        if self.options.show_values && !property.is_empty() {
            write!(f, " = {:?}", binding.component().read().value())?;
        }
        f.write_str("\n")?;

        let children = binding.children();
        let count = children.len();
        ancestors_last.push(is_last);
        for (index, child) in children.iter().enumerate() {
            self.write_binding(f, child.as_ref(), None, ancestors_last, index + 1 == count)?;
        }
        ancestors_last.pop();
        Ok(())
    }

    fn prefix(&self, ancestors_last: &[bool], is_last: bool) -> String {
        let indent = " ".repeat(self.options.indent_size);
        let (pipe, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "", ""),
        };

        let mut prefix = String::new();
        // the context line is the root, top-level bindings are its children
        for &last in ancestors_last {
            prefix.push_str(if last { " " } else { pipe });
            prefix.push_str(&indent);
        }
        if self.options.style == TreeStyle::Compact {
            prefix.push_str(&indent);
        } else {
            prefix.push_str(if is_last { corner } else { tee });
        }
        prefix
    }
}

struct BindingTree<'a> {
    debug: &'a BindingTreeDebug,
    context: &'a BindingContext,
}

impl fmt::Display for BindingTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.context.entries();
        writeln!(
            f,
            "BindingContext \"{}\" ({} bindings):",
            self.context.name(),
            entries.len()
        )?;
        if entries.is_empty() {
            return writeln!(f, "  (empty)");
        }

        let count = entries.len();
        let mut ancestors = Vec::new();
        for (index, (id, binding)) in entries.iter().enumerate() {
            let label = self.debug.options.show_ids.then(|| format!("[{id:?}]"));
            self.debug
                .write_binding(f, binding.as_ref(), label, &mut ancestors, index + 1 == count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::BindingConfig;
    use crate::dispatcher::test_support::person_pmo;
    use crate::value::Value;

    #[test]
    fn test_tree_format_empty() {
        let context = BindingContext::new("empty", BindingConfig::default());
        let output = BindingTreeDebug::new().format(&context);
        assert!(output.contains("BindingContext \"empty\" (0 bindings)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_tree_format_bindings() {
        let (pmo, _) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        context.create_ui(&pmo).unwrap();

        let output = BindingTreeDebug::with_options(TreeFormatOptions::detailed()).format(&context);
        assert!(output.contains("name <text_field>"));
        assert!(output.contains("save <button>"));
        assert!(output.contains("(PersonPmo)"));
        assert!(output.contains("Ada"));
        assert!(output.contains("\u{2514}\u{2500}\u{2500} first_name"));
    }

    struct RecordTargets(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RecordTargets {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.lock().push(event.metadata().target().to_owned());
        }
    }

    #[test]
    fn test_events_use_declared_targets() {
        use tracing_subscriber::layer::SubscriberExt;

        let recorded = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(RecordTargets(recorded.clone()));
        tracing::subscriber::with_default(subscriber, || {
            let (pmo, _) = person_pmo();
            let context = BindingContext::new("person", BindingConfig::default());
            let components = context.create_ui(&pmo).unwrap();
            components[0].edit(Value::Text("Grace".into())).unwrap();
        });

        let recorded = recorded.lock();
        assert!(recorded.iter().any(|t| t == targets::BINDING));
        assert!(recorded.iter().any(|t| t == targets::DISPATCHER));
        let declared = [
            targets::ACCESSOR,
            targets::DISPATCHER,
            targets::ANNOTATION,
            targets::BINDING,
        ];
        assert!(
            recorded.iter().all(|t| declared.contains(&t.as_str())),
            "unexpected targets {recorded:?}"
        );
    }

    #[test]
    fn test_tree_format_minimal_ascii() {
        let (pmo, _) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        context.create_ui(&pmo).unwrap();

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let output = BindingTreeDebug::with_options(options).format(&context);
        assert!(output.contains("+-- name <text_field>\n"));
        assert!(!output.contains("PersonPmo"));
        assert!(!output.contains("["));
    }
}
