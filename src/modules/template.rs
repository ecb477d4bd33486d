//! Render a template file into place

use super::diff_summary;
use anyhow::{Context, Result};
use changestore::{Store, write_preserving_mode};
use minijinja::{Environment, Value};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Template rendering with snapshot-based reversal
///
/// Templates use Jinja syntax; `vars` is any serialisable value, typically a
/// struct or the installer's [`Facts`](crate::facts::Facts).
#[derive(Debug, Clone)]
pub struct Template {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub vars: Value,
    pub store: Store,
}

impl Template {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>, store: &Store) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            vars: minijinja::context! {},
            store: store.clone(),
        }
    }

    pub fn vars(mut self, vars: impl Serialize) -> Self {
        self.vars = Value::from_serialize(vars);
        self
    }

    fn dest(&self) -> PathBuf {
        crate::paths::expand_path(&self.dest)
    }

    fn render(&self) -> Result<String> {
        let src = crate::paths::expand_path(&self.src);
        let source = fs::read_to_string(&src)
            .with_context(|| format!("Could not read template file {}", src.display()))?;

        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template("template", &source)
            .context("Could not parse template.")?;
        let rendered = env
            .get_template("template")?
            .render(&self.vars)
            .context("Failed to execute template.")?;
        Ok(rendered)
    }
}

impl Module for Template {
    fn id(&self) -> String {
        format!("Template: {} => {}", self.src.display(), self.dest.display())
    }

    fn files(&self) -> Vec<PathBuf> {
        vec![self.src.clone()]
    }

    fn status(&self) -> Result<Probe> {
        let rendered = self.render()?;
        let current = fs::read_to_string(self.dest()).unwrap_or_default();
        if current == rendered {
            Ok(Probe::pass("Template file installed."))
        } else {
            Ok(Probe::fail(format!(
                "Template and destination differ ({}).",
                diff_summary(&current, &rendered)
            )))
        }
    }

    fn install(&self) -> Result<String> {
        let rendered = self.render()?;
        let dest = self.dest();
        self.store
            .save_file(&dest, "")
            .context("Could not save snapshot to the store.")?;
        write_preserving_mode(&dest, rendered.as_bytes())
            .with_context(|| format!("Could not write destination file {}", dest.display()))?;
        Ok("Successfully ran template file.".into())
    }

    fn remove(&self) -> Result<String> {
        self.store
            .restore_file(self.dest(), "")
            .context("Failed to restore template file.")?;
        Ok("Successfully restored template file.".into())
    }
}
