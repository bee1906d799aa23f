//! Embedded page templates.

use super::error::WebError;
use minijinja::Environment;
use serde::Serialize;

const SOURCES: [(&str, &str); 8] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("_task_fields.html", include_str!("../../templates/_task_fields.html")),
    ("task_list.html", include_str!("../../templates/task_list.html")),
    (
        "done_task_list.html",
        include_str!("../../templates/done_task_list.html"),
    ),
    ("task_detail.html", include_str!("../../templates/task_detail.html")),
    ("task_create.html", include_str!("../../templates/task_create.html")),
    ("task_update.html", include_str!("../../templates/task_update.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

/// Compiled template set shared by every page handler.
#[derive(Debug)]
pub struct Templates {
    environment: Environment<'static>,
}

impl Templates {
    /// Compiles every embedded template.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] when a template fails to parse.
    pub fn load() -> Result<Self, WebError> {
        let mut environment = Environment::new();
        for (name, source) in SOURCES {
            environment
                .add_template(name, source)
                .map_err(|error| WebError::template(name, &error))?;
        }
        Ok(Self { environment })
    }

    /// Renders `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] when the template is unknown or
    /// rendering fails.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, WebError> {
        self.environment
            .get_template(name)
            .and_then(|template| template.render(context))
            .map_err(|error| WebError::template(name, &error))
    }
}
