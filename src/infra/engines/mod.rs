//! Built-in template engines.

mod handlebars;
mod html;
mod jinja;
mod markdown;

pub use handlebars::HandlebarsEngine;
pub use html::HtmlEngine;
pub use jinja::JinjaEngine;
pub use markdown::MarkdownEngine;

use crate::application::render::EngineRegistry;
use crate::domain::engine::EngineId;

/// Register `md`, `html`, `njk`, `liquid` and `hbs`.
///
/// `liquid` shares the Jinja engine: both use `{{ }}` output and `{% %}` tags.
pub fn register_builtin_engines(registry: &mut EngineRegistry) {
    registry.register(EngineId::markdown(), |includes_dir| {
        Box::new(MarkdownEngine::new(includes_dir))
    });
    registry.register(EngineId::html(), |includes_dir| {
        Box::new(HtmlEngine::new(includes_dir))
    });
    for name in ["njk", "liquid"] {
        registry.register(name, move |includes_dir| {
            Box::new(JinjaEngine::new(EngineId::new(name), includes_dir))
        });
    }
    registry.register("hbs", |includes_dir| {
        Box::new(HandlebarsEngine::new(includes_dir))
    });
}
