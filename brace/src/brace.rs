use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::errors::{BraceResult, Error};
#[cfg(feature = "glob_fs")]
use crate::globbing::load_from_glob;
use crate::renderer::{Rendered, Renderer, ONE_OFF_TEMPLATE_NAME};
use crate::scope::Scope;
use crate::template::{Partials, Template};
use crate::utils::template_name_from_path;
use crate::Context;

/// Holds the page templates, the partials they can include and a global context.
#[derive(Clone, Default)]
pub struct Brace {
    /// The globs used to load templates and partials if there were some.
    /// Only used if the `glob_fs` feature is turned on
    templates_glob: Option<String>,
    partials_glob: Option<String>,
    templates: HashMap<String, Template>,
    partials: Partials,
    global_context: Context,
}

impl Brace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads all the files matching the glob as page templates, replacing the
    /// existing ones. Templates are named by their path relative to the glob
    /// directory without extension: `pages/about.html` loaded with
    /// `pages/**/*.html` is `about`.
    #[cfg(feature = "glob_fs")]
    pub fn load_templates_from_glob(&mut self, glob: &str) -> BraceResult<()> {
        let files = load_from_glob(glob)?;
        self.templates_glob = Some(glob.to_string());
        self.templates.clear();

        for (path, name) in files {
            let template = read_file(&path, &template_name_from_path(&name))?;
            self.templates.insert(template.name.clone(), template);
        }
        Ok(())
    }

    /// Same as [`load_templates_from_glob`](Self::load_templates_from_glob) for partials.
    #[cfg(feature = "glob_fs")]
    pub fn load_partials_from_glob(&mut self, glob: &str) -> BraceResult<()> {
        let files = load_from_glob(glob)?;
        self.partials_glob = Some(glob.to_string());
        self.partials.clear();

        for (path, name) in files {
            self.partials
                .insert_template(read_file(&path, &template_name_from_path(&name))?);
        }
        Ok(())
    }

    /// Reloads everything found in the globs given to Brace.
    ///
    /// Use this when you are watching a directory and want to pick up added
    /// or deleted files.
    #[cfg(feature = "glob_fs")]
    pub fn full_reload(&mut self) -> BraceResult<()> {
        if self.templates_glob.is_none() && self.partials_glob.is_none() {
            return Err(Error::message(
                "Reloading is only available if you are using a glob",
            ));
        }

        if let Some(glob) = self.templates_glob.clone() {
            self.load_templates_from_glob(&glob)?;
        }
        if let Some(glob) = self.partials_glob.clone() {
            self.load_partials_from_glob(&glob)?;
        }
        Ok(())
    }

    /// Add a single page template, replacing any template with the same name.
    ///
    /// ```
    /// # use brace::Brace;
    /// let mut brace = Brace::default();
    /// brace.add_raw_template("index", "Blabla");
    /// ```
    pub fn add_raw_template(&mut self, name: &str, content: &str) {
        self.templates
            .insert(name.to_string(), Template::new(name, content));
    }

    /// Add all the page templates given
    ///
    /// ```
    /// # use brace::Brace;
    /// let mut brace = Brace::default();
    /// brace.add_raw_templates(vec![
    ///     ("index", "blabla"),
    ///     ("about", "hello"),
    /// ]);
    /// ```
    pub fn add_raw_templates<I, N, C>(&mut self, templates: I)
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        for (name, content) in templates {
            self.add_raw_template(name.as_ref(), content.as_ref());
        }
    }

    /// Add a partial, replacing any partial with the same name.
    pub fn add_raw_partial(&mut self, name: &str, content: &str) {
        self.partials.insert(name, content);
    }

    pub fn add_raw_partials<I, N, C>(&mut self, partials: I)
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        for (name, content) in partials {
            self.add_raw_partial(name.as_ref(), content.as_ref());
        }
    }

    /// Add a single page template from a path. The default name for the template is
    /// the path given without its extension, but this can be renamed with the `name` parameter
    ///
    /// ```no_run
    /// # use brace::Brace;
    /// let mut brace = Brace::default();
    /// // Rename template with custom name
    /// brace.add_template_file("path/to/template.html", Some("template")).unwrap();
    /// // Named `path/to/other`
    /// brace.add_template_file("path/to/other.html", None).unwrap();
    /// ```
    pub fn add_template_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        name: Option<&str>,
    ) -> BraceResult<()> {
        let template = read_named_file(path.as_ref(), name)?;
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Same as [`add_template_file`](Self::add_template_file) for a partial.
    pub fn add_partial_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        name: Option<&str>,
    ) -> BraceResult<()> {
        self.partials
            .insert_template(read_named_file(path.as_ref(), name)?);
        Ok(())
    }

    /// Get a page template by name.
    #[inline]
    pub fn get_template(&self, template_name: &str) -> Option<&Template> {
        self.templates.get(template_name)
    }

    /// Get a template by name, returning an error if not found. Used internally.
    #[inline]
    pub(crate) fn must_get_template(&self, template_name: &str) -> BraceResult<&Template> {
        self.get_template(template_name)
            .ok_or_else(|| Error::template_not_found(template_name))
    }

    /// All the page template names, sorted
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn partials(&self) -> &Partials {
        &self.partials
    }

    /// Returns the global context, allowing modifications to it
    ///
    /// The global context is visible from every render, which is useful for
    /// sharing the site data between pages. Names in the context given to a
    /// render win over the global ones.
    ///
    /// ```
    /// # use brace::{Brace, Context, context};
    /// let mut brace = Brace::new();
    /// brace.global_context().insert("name", "John Doe");
    ///
    /// let rendered = brace.render_str("Hello, {{ name }}!", &Context::new());
    /// assert_eq!(rendered.output, "Hello, John Doe!");
    /// ```
    pub fn global_context(&mut self) -> &mut Context {
        &mut self.global_context
    }

    /// Renders a page template given a [`Context`].
    ///
    /// The only error is asking for a template that was never added: problems in the
    /// templates themselves are in the diagnostics of the [`Rendered`] output.
    ///
    /// ```
    /// # use brace::{Brace, Context};
    /// let mut brace = Brace::default();
    /// brace.add_raw_template("info", "My age is {{ age }}.");
    ///
    /// let mut context = Context::new();
    /// context.insert("age", &18);
    ///
    /// let rendered = brace.render("info", &context).unwrap();
    /// assert_eq!(rendered.output, "My age is 18.");
    /// ```
    pub fn render(&self, template_name: &str, context: &Context) -> BraceResult<Rendered> {
        let template = self.must_get_template(template_name)?;
        Ok(self.render_template(template, context))
    }

    /// Renders a page template to something that implements [`Write`], returning the
    /// diagnostics.
    ///
    /// The page is fully rendered before anything is written. Any I/O error will be
    /// reported in the result.
    pub fn render_to(
        &self,
        template_name: &str,
        context: &Context,
        mut write: impl Write,
    ) -> BraceResult<Vec<Diagnostic>> {
        let rendered = self.render(template_name, context)?;
        write.write_all(rendered.output.as_bytes())?;
        write.flush()?;
        Ok(rendered.diagnostics)
    }

    /// Renders a one-off template (for example a template coming from a user input)
    /// given a `Context` and using this Brace instance's partials and global context.
    ///
    /// Any diagnostics will mention the `__brace_one_off` template: this is the name
    /// given to the template by Brace.
    pub fn render_str(&self, input: &str, context: &Context) -> Rendered {
        let template = Template::new(ONE_OFF_TEMPLATE_NAME, input);
        self.render_template(&template, context)
    }

    /// Renders a one off template with no partials nor global context.
    ///
    /// ```
    /// # use brace::{Context, Brace};
    /// let mut context = Context::new();
    /// context.insert("greeting", &"hello");
    /// let rendered = Brace::one_off("{{ greeting }} world", &context);
    /// assert_eq!(rendered.output, "hello world");
    /// ```
    pub fn one_off(input: &str, context: &Context) -> Rendered {
        Brace::default().render_str(input, context)
    }

    fn render_template(&self, template: &Template, context: &Context) -> Rendered {
        let scope = Scope::root(context, &self.global_context);
        Renderer::new(&self.partials).render(template, &scope)
    }
}

impl fmt::Debug for Brace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brace")
            .field("templates_glob", &self.templates_glob)
            .field("partials_glob", &self.partials_glob)
            .field("templates", &self.template_names())
            .field("partials", &self.partials.names())
            .finish_non_exhaustive()
    }
}

/// Reads a template file, naming it after its path when no name is given.
fn read_named_file(path: &Path, name: Option<&str>) -> BraceResult<Template> {
    let name = match name {
        Some(name) => name.to_string(),
        None => template_name_from_path(&path.to_string_lossy()),
    };
    read_file(path, &name)
}

fn read_file(path: &Path, name: &str) -> BraceResult<Template> {
    let mut f = File::open(path)
        .map_err(|e| Error::chain(format!("Couldn't open template '{}'", path.display()), e))?;

    let mut content = String::new();
    f.read_to_string(&mut content)
        .map_err(|e| Error::chain(format!("Failed to read template '{}'", path.display()), e))?;

    Ok(Template::from_file(
        name,
        &content,
        path.to_string_lossy().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{context, DiagnosticKind, ErrorKind};

    #[test]
    fn global_context() {
        let mut brace = Brace::new();
        brace.global_context().insert("name", "John Doe");

        let rendered = brace.render_str("Hello, {{ name }}!", &Context::new());
        assert_eq!(rendered.output, "Hello, John Doe!");

        let rendered = brace.render_str(
            "UserID: {{ id }}, Username: {{ name }}",
            &context! { id => &7489 },
        );
        assert_eq!(rendered.output, "UserID: 7489, Username: John Doe");
    }

    #[test]
    fn page_context_shadows_global_context() {
        let mut brace = Brace::new();
        brace.global_context().insert("title", "Site");
        brace.add_raw_template("index", "{{title}}");

        let rendered = brace.render("index", &context! { title => "Page" }).unwrap();
        assert_eq!(rendered.output, "Page");
        let rendered = brace.render("index", &Context::new()).unwrap();
        assert_eq!(rendered.output, "Site");
    }

    #[test]
    fn render_unknown_template_errors() {
        let brace = Brace::new();
        let err = brace.render("nope", &Context::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TemplateNotFound("nope".to_string()));
    }

    #[test]
    fn render_with_partials() {
        let mut brace = Brace::new();
        brace.add_raw_partials(vec![
            ("header", "<h1>{{site.name}}</h1>"),
            ("footer", "<footer>{{#each links}}{{this}} {{/each}}</footer>"),
        ]);
        brace.add_raw_templates(vec![("index", "{{> header}}\n<main/>\n{{> footer}}")]);

        let ctx = context! {
            site => &std::collections::BTreeMap::from([("name", "Conf")]),
            links => &vec!["a", "b"],
        };
        let rendered = brace.render("index", &ctx).unwrap();
        assert!(rendered.is_clean());
        insta::assert_snapshot!(rendered.output, @r"
        <h1>Conf</h1>
        <main/>
        <footer>a b </footer>
        ");
    }

    #[test]
    fn render_str_uses_registered_partials() {
        let mut brace = Brace::new();
        brace.add_raw_partial("partial", "I am partial");
        let rendered = brace.render_str(
            "Hello {{ name }}!. {{> partial}}{{> missing}}",
            &context! { name => "world" },
        );

        insta::assert_snapshot!(rendered.output, @"Hello world!. I am partial");
        assert_eq!(rendered.diagnostics.len(), 1);
        assert_eq!(rendered.diagnostics[0].template, ONE_OFF_TEMPLATE_NAME);
    }

    #[test]
    fn one_off_has_no_partials() {
        let rendered = Brace::one_off("{{> nav}}{{x}}", &context! { x => &1 });
        assert_eq!(rendered.output, "1");
        assert_eq!(
            rendered.diagnostics[0].kind,
            DiagnosticKind::MissingPartial("nav".to_string())
        );
    }

    #[test]
    fn render_to_writes_output_and_returns_diagnostics() {
        let mut brace = Brace::new();
        brace.add_raw_template("index", "<p>{{ name }}</p>{{#if name}}");

        let mut buffer = Vec::new();
        let diagnostics = brace
            .render_to("index", &context! { name => "John Wick" }, &mut buffer)
            .unwrap();
        assert_eq!(buffer, b"<p>John Wick</p>");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn template_names_are_sorted() {
        let mut brace = Brace::new();
        brace.add_raw_templates(vec![("schedule", ""), ("index", ""), ("about", "")]);
        assert_eq!(brace.template_names(), vec!["about", "index", "schedule"]);
    }

    #[test]
    fn can_add_files() {
        let tmp_dir = tempfile::tempdir().expect("create temp dir");
        let page = tmp_dir.path().join("index.html");
        let partial = tmp_dir.path().join("nav.html");
        fs::write(&page, "{{> menu}}").unwrap();
        fs::write(&partial, "<nav/>").unwrap();

        let mut brace = Brace::new();
        brace.add_template_file(&page, Some("index")).unwrap();
        brace.add_partial_file(&partial, Some("menu")).unwrap();

        let template = brace.get_template("index").unwrap();
        assert_eq!(template.path(), Some(page.to_string_lossy().as_ref()));
        let rendered = brace.render("index", &Context::new()).unwrap();
        assert_eq!(rendered.output, "<nav/>");
    }

    #[test]
    fn file_names_default_to_the_path_without_extension() {
        let tmp_dir = tempfile::tempdir().expect("create temp dir");
        let page = tmp_dir.path().join("about.html");
        fs::write(&page, "about").unwrap();

        let mut brace = Brace::new();
        brace.add_template_file(&page, None).unwrap();
        let expected = template_name_from_path(&page.to_string_lossy());
        assert!(expected.ends_with("about"));
        assert!(brace.get_template(&expected).is_some());
    }

    #[test]
    fn adding_missing_file_errors() {
        let mut brace = Brace::new();
        let err = brace
            .add_template_file("this/does/not/exist.html", None)
            .unwrap_err();
        assert!(err.to_string().contains("Couldn't open template"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "glob_fs")]
    #[test]
    fn can_load_from_globs_and_full_reload() {
        let tmp_dir = tempfile::tempdir().expect("create temp dir");
        let root = tmp_dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("pages/talks")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("pages/index.html"), "{{> nav}}").unwrap();
        fs::write(root.join("pages/talks/rust.html"), "rust").unwrap();
        fs::write(root.join("partials/nav.html"), "<nav/>").unwrap();

        let pages = format!("{}/pages/**/*.html", root.display());
        let partials = format!("{}/partials/**/*", root.display());
        let mut brace = Brace::new();
        assert!(brace.full_reload().is_err());
        brace.load_templates_from_glob(&pages).unwrap();
        brace.load_partials_from_glob(&partials).unwrap();

        assert_eq!(brace.template_names(), vec!["index", "talks/rust"]);
        assert_eq!(brace.render("index", &Context::new()).unwrap().output, "<nav/>");

        fs::write(root.join("pages/about.html"), "about").unwrap();
        fs::remove_file(root.join("pages/talks/rust.html")).unwrap();
        brace.full_reload().unwrap();
        assert_eq!(brace.template_names(), vec!["about", "index"]);
        assert!(brace.partials().contains("nav"));
    }
}
