use derive_more::Display;

/// A three-line catalog record before any field validation
/// https://en.wikipedia.org/wiki/Two-line_element_set
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}", "name")]
pub struct UnstructuredTle {
    pub name: String,
    pub line1: String,
    pub line2: String,
}
