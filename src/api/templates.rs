//! Server-side HTML templates.
//!
//! Sources are embedded at compile time and registered with a `minijinja`
//! environment. Names ending in `.html` are auto-escaped.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

const SOURCES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("list.html", include_str!("../../templates/list.html")),
    ("my_lists.html", include_str!("../../templates/my_lists.html")),
];

#[derive(Clone)]
pub struct Templates {
    environment: Arc<Environment<'static>>,
}

impl Templates {
    /// Compiles every embedded template.
    ///
    /// # Errors
    ///
    /// Returns the `minijinja` syntax error of the first broken template.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut environment = Environment::new();
        for (name, source) in SOURCES {
            environment.add_template(name, source)?;
        }
        Ok(Self {
            environment: Arc::new(environment),
        })
    }

    /// # Errors
    ///
    /// Returns an error for an unknown template name or a failed render.
    pub fn render<Context: Serialize>(
        &self,
        name: &str,
        context: &Context,
    ) -> Result<Html<String>, minijinja::Error> {
        self.environment.get_template(name)?.render(context).map(Html)
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Templates")
            .field("templates", &SOURCES.map(|(name, _)| name))
            .finish()
    }
}
