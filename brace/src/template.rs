use std::collections::HashMap;
use std::sync::Arc;

/// A named template source.
///
/// Templates are not parsed ahead of time: the source is interpreted tag by tag on
/// every render, so creating one can't fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub(crate) source: Arc<str>,
    /// The file the template was read from, if any
    pub(crate) path: Option<String>,
}

impl Template {
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: Arc::from(source),
            path: None,
        }
    }

    pub(crate) fn from_file(name: &str, source: &str, path: String) -> Self {
        Self {
            path: Some(path),
            ..Self::new(name, source)
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// The partials a template can include with `{{> name}}`.
///
/// The registry is only read while rendering: build it fully before the first render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partials {
    templates: HashMap<String, Template>,
}

impl Partials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partial, replacing any existing partial with the same name
    pub fn insert(&mut self, name: &str, source: &str) {
        self.insert_template(Template::new(name, source));
    }

    pub fn insert_template(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All the partial names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[cfg(feature = "glob_fs")]
    pub(crate) fn clear(&mut self) {
        self.templates.clear();
    }
}

impl<N: AsRef<str>, C: AsRef<str>> FromIterator<(N, C)> for Partials {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut partials = Partials::new();
        for (name, content) in iter {
            partials.insert(name.as_ref(), content.as_ref());
        }
        partials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_collect_partials() {
        let partials: Partials = vec![("nav", "<nav/>"), ("footer", "<footer/>")]
            .into_iter()
            .collect();
        assert_eq!(partials.len(), 2);
        assert_eq!(partials.names(), vec!["footer", "nav"]);
        assert_eq!(partials.get("nav").unwrap().source(), "<nav/>");
        assert!(!partials.contains("header"));
    }

    #[test]
    fn inserting_replaces_existing_partial() {
        let mut partials = Partials::new();
        partials.insert("nav", "old");
        partials.insert("nav", "new");
        assert_eq!(partials.len(), 1);
        assert_eq!(partials.get("nav").unwrap().source(), "new");
    }
}
