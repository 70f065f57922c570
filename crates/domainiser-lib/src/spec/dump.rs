use std::fmt::Write;

use domainiser_core::ContainerShape;

use super::graph_spec::GraphSpec;

/// Renders a spec as an indented tree:
///
/// ```text
/// Person
///   spouse: Person
///   children[]: Person
///     addresses{}: Address
/// ```
///
/// Sequences are marked `[]`, sets `{}` and mappings `{:}`.
pub struct SpecPrinter<'s> {
    spec: &'s GraphSpec,
    qualified: bool,
}

impl<'s> SpecPrinter<'s> {
    pub fn new(spec: &'s GraphSpec) -> Self {
        Self {
            spec,
            qualified: false,
        }
    }

    /// Print full type names instead of simple names.
    pub fn qualified(mut self, value: bool) -> Self {
        self.qualified = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        writeln!(w, "{}", self.type_label(self.spec))?;
        self.format_children(self.spec, 1, w)
    }

    fn format_children(&self, spec: &GraphSpec, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let prefix = "  ".repeat(indent);
        for (property, child) in spec.children() {
            let shape = spec.ensure_child_property(property).shape();
            writeln!(
                w,
                "{prefix}{property}{}: {}",
                shape_mark(shape),
                self.type_label(child)
            )?;
            self.format_children(child, indent + 1, w)?;
        }
        Ok(())
    }

    fn type_label<'a>(&self, spec: &'a GraphSpec) -> &'a str {
        if self.qualified {
            spec.owner().as_str()
        } else {
            spec.name()
        }
    }
}

fn shape_mark(shape: ContainerShape) -> &'static str {
    match shape {
        ContainerShape::Scalar => "",
        ContainerShape::Sequence => "[]",
        ContainerShape::Set => "{}",
        ContainerShape::Mapping => "{:}",
    }
}
