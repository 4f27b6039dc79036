use std::fs;
use std::path::{Path, PathBuf};

use brace::{Brace, Context, Diagnostic, Rendered};

use crate::assets::copy_static;
use crate::config::SiteConfig;
use crate::data::load_data;
use crate::error::{Result, SiteError};

/// The context a page is rendered with, on top of the site data: `page` is the page
/// name and `page_<name>` is true, so templates can do `{{#if page_index}}`.
pub fn page_context(name: &str) -> Context {
    let mut context = Context::new();
    context.insert("page", name);
    context.insert(format!("page_{name}"), &true);
    context
}

/// What a build or a check went through.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Names of the rendered pages, sorted
    pub pages: Vec<String>,
    /// Number of static files copied, always 0 for a check
    pub assets: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn warnings(&self) -> usize {
        self.diagnostics.len()
    }
}

/// A site whose data, partials and pages are loaded and ready to render.
#[derive(Debug)]
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    brace: Brace,
}

impl Site {
    /// Loads everything the pages need. Nothing is rendered yet.
    pub fn load(root: impl Into<PathBuf>, config: SiteConfig) -> Result<Self> {
        let root = root.into();
        config.validate()?;

        let mut brace = Brace::new();
        *brace.global_context() = load_data(&root.join(&config.data_dir))?;
        brace.load_partials_from_glob(&glob_in(&root.join(&config.partials_dir)))?;
        brace.load_templates_from_glob(&glob_in(&root.join(&config.pages_dir)))?;

        log::debug!(
            "Loaded {} page(s) and {} partial(s) from {}",
            brace.template_names().len(),
            brace.partials().len(),
            root.display()
        );
        if brace.template_names().is_empty() {
            log::warn!(
                "No pages found in {}",
                root.join(&config.pages_dir).display()
            );
        }

        Ok(Self {
            root,
            config,
            brace,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn brace(&self) -> &Brace {
        &self.brace
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    /// Where the page `name` is written
    pub fn page_path(&self, name: &str) -> PathBuf {
        self.output_dir()
            .join(format!("{name}.{}", self.config.page_extension))
    }

    /// Renders every page and reports the diagnostics without writing anything.
    pub fn check(&self) -> Result<BuildReport> {
        let rendered = self.render_pages()?;
        let mut report = BuildReport::default();
        for (name, page) in rendered {
            report.pages.push(name);
            report.diagnostics.extend(page.diagnostics);
        }
        self.deny_warnings(&report)?;
        Ok(report)
    }

    /// Renders every page, writes them and copies the static files.
    ///
    /// When warnings are denied, nothing is written if any page had a diagnostic.
    pub fn build(&self) -> Result<BuildReport> {
        let rendered = self.render_pages()?;
        let mut report = BuildReport::default();
        for (_, page) in &rendered {
            report.diagnostics.extend(page.diagnostics.iter().cloned());
        }
        self.deny_warnings(&report)?;

        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir).map_err(|e| SiteError::io(&output_dir, e))?;

        for (name, page) in rendered {
            let path = self.page_path(&name);
            write_page(&path, &page.output)?;
            log::info!("Wrote {}", path.display());
            report.pages.push(name);
        }

        report.assets = copy_static(&self.root.join(&self.config.static_dir), &output_dir)?;
        log::info!(
            "Built {} page(s) and copied {} static file(s) into {}",
            report.pages.len(),
            report.assets,
            output_dir.display()
        );
        Ok(report)
    }

    /// Pages are rendered in name order and every diagnostic is logged.
    fn render_pages(&self) -> Result<Vec<(String, Rendered)>> {
        let mut pages = Vec::new();
        for name in self.brace.template_names() {
            log::debug!("Rendering {name}");
            let rendered = self.brace.render(name, &page_context(name))?;
            for diagnostic in &rendered.diagnostics {
                log::warn!("{}", diagnostic.generate_report());
            }
            pages.push((name.to_string(), rendered));
        }
        Ok(pages)
    }

    fn deny_warnings(&self, report: &BuildReport) -> Result<()> {
        if self.config.deny_warnings && report.warnings() > 0 {
            return Err(SiteError::WarningsDenied(report.warnings()));
        }
        Ok(())
    }
}

/// Every file under `dir`, at any depth
fn glob_in(dir: &Path) -> String {
    format!("{}/**/*", dir.display())
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| SiteError::io(path, e))
}
