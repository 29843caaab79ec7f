use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;
use rendition::application::render::{
    CompileRequest, CompiledTemplate, EngineChain, EngineError, EngineRegistry, RenderConfig,
    RenderContext, RenderError, TemplateEngine, TemplateRender,
};
use rendition::cache::TemplateCache;
use rendition::domain::engine::EngineId;
use rendition::infra::extensions::ExtensionMap;
use serde_json::json;

fn dispatcher(identifier: &str, context: &RenderContext) -> TemplateRender {
    TemplateRender::new(identifier, None, context).expect("dispatcher")
}

#[tokio::test]
async fn markdown_documents_default_to_liquid_preprocessing() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);

    assert_eq!(render.engine_name().expect("resolves").as_str(), "md");
    assert!(render.use_markdown());
    assert_eq!(render.markdown_engine(), Some(&EngineId::new("liquid")));

    let compiled = render
        .compiled_template("# Hi {{name}}")
        .await
        .expect("compiles");
    let html = compiled.render(&json!({ "name": "A" })).expect("renders");
    assert!(html.contains("<h1>Hi A</h1>"), "{html}");
}

#[tokio::test]
async fn njk_override_replaces_markdown() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);
    render.apply_override("njk", false).expect("override applies");

    assert!(render.is_engine("njk").expect("resolves"));
    assert!(!render.use_markdown());
    assert_eq!(render.html_engine(), None);
    assert_eq!(render.engine_chain().expect("chain"), EngineChain::Generic);

    let compiled = render.compiled_template("# {{ t }}").await.expect("compiles");
    assert_eq!(compiled.render(&json!({ "t": "x" })).expect("renders"), "# x");
}

#[tokio::test]
async fn markdown_first_override_chains_preprocessor() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);
    render.apply_override("njk,md", false).expect("override applies");

    assert!(render.is_engine("md").expect("resolves"));
    assert!(render.use_markdown());
    assert_eq!(render.markdown_engine(), Some(&EngineId::new("njk")));
    assert_eq!(
        render.describe_engines().expect("describes"),
        "njk (and markdown)"
    );

    let compiled = render
        .compiled_template("{% if on %}**bold**{% endif %}")
        .await
        .expect("compiles");
    let html = compiled.render(&json!({ "on": true })).expect("renders");
    assert_eq!(html.trim(), "<p><strong>bold</strong></p>");
}

#[tokio::test]
async fn bypassed_markdown_keeps_preprocessor_output() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);
    render.apply_override("md,njk", true).expect("override applies");

    assert!(render.is_engine("md").expect("resolves"));
    assert!(!render.use_markdown());

    let compiled = render.compiled_template("# {{ t }}").await.expect("compiles");
    assert_eq!(compiled.render(&json!({ "t": "x" })).expect("renders"), "# x");
}

#[test]
fn conflicting_override_names_the_declaration() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);

    let err = render
        .apply_override("njk,liquid", false)
        .expect_err("conflict");
    assert!(matches!(err, RenderError::OverrideConflict(_)));
    assert!(err.to_string().ends_with("You used: njk,liquid"), "{err}");
}

#[test]
fn empty_override_binds_plain_html() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.md", &context);
    render.apply_override(" , ", false).expect("override applies");

    assert!(render.is_engine("html").expect("resolves"));
    assert_eq!(
        render.engine_chain().expect("chain"),
        EngineChain::Html { preprocessor: None }
    );
}

#[test]
fn blank_identifier_is_rejected() {
    let context = RenderContext::default();
    let err = TemplateRender::new("  ", None, &context).expect_err("blank identifier");
    assert!(matches!(err, RenderError::MissingIdentifier { .. }));
}

#[test]
fn unknown_extension_fails_on_resolution() {
    let context = RenderContext::default();
    let mut render = dispatcher("style.css", &context);

    let err = render.engine_name().expect_err("unknown engine");
    assert_eq!(err.to_string(), "Unknown engine for style.css");
}

#[test]
fn formats_outside_configuration_do_not_resolve() {
    let context = RenderContext::new(RenderConfig {
        template_formats: vec![EngineId::markdown()],
        ..RenderConfig::default()
    });
    let mut render = dispatcher("card.hbs", &context);
    assert!(matches!(
        render.engine_name(),
        Err(RenderError::UnknownEngine { .. })
    ));
}

#[tokio::test]
async fn markdown_override_alone_parses_markdown_only() {
    let context = RenderContext::default();
    let mut render = dispatcher("page.njk", &context);
    render.apply_override("md", false).expect("override applies");

    assert!(render.is_engine("md").expect("resolves"));
    assert!(render.use_markdown());
    assert_eq!(render.markdown_engine(), None);
    assert_eq!(
        render.describe_engines().expect("describes"),
        "false (and markdown)"
    );

    let compiled = render.compiled_template("# {{ x }}").await.expect("compiles");
    let html = compiled.render(&json!({ "x": 1 })).expect("renders");
    assert_eq!(html.trim(), "<h1>{{ x }}</h1>");
}

#[tokio::test]
async fn bypassed_markdown_without_preprocessor_emits_raw_body() {
    let context = RenderContext::new(RenderConfig {
        markdown_template_engine: None,
        ..RenderConfig::default()
    });
    let mut render = dispatcher("page.njk", &context);
    render.apply_override("md", true).expect("override applies");

    assert!(render.is_engine("md").expect("resolves"));
    assert!(!render.use_markdown());
    assert_eq!(render.markdown_engine(), None);

    let compiled = render.compiled_template("# {{ x }}").await.expect("compiles");
    assert_eq!(
        compiled.render(&json!({ "x": 1 })).expect("renders"),
        "# {{ x }}"
    );
}

#[tokio::test]
async fn overrides_to_different_engines_do_not_share_compiled_templates() {
    let context = RenderContext::default();
    let mut with_njk = dispatcher("page.md", &context);
    with_njk.apply_override("njk", false).expect("override applies");
    let mut with_hbs = dispatcher("page.md", &context);
    with_hbs.apply_override("hbs", false).expect("override applies");

    let body = "{% if x %}y{% endif %}";
    assert_ne!(
        with_njk.cache_key(body).expect("key"),
        with_hbs.cache_key(body).expect("key")
    );

    let njk = with_njk.compiled_template(body).await.expect("compiles");
    let hbs = with_hbs.compiled_template(body).await.expect("compiles");
    assert!(!njk.ptr_eq(&hbs));
    assert_eq!(njk.render(&json!({ "x": true })).expect("renders"), "y");
    assert_eq!(
        hbs.render(&json!({ "x": true })).expect("renders"),
        "{% if x %}y{% endif %}"
    );
    assert_eq!(context.cache().len(), 2);
}

#[test]
fn bare_engine_names_key_by_bound_engine() {
    let context = RenderContext::default();
    let mut plain = dispatcher("njk", &context);
    let mut overridden = dispatcher("njk", &context);
    overridden.apply_override("liquid", false).expect("override applies");

    assert_ne!(
        plain.cache_key("{{ x }}").expect("key"),
        overridden.cache_key("{{ x }}").expect("key")
    );
}

#[test]
fn markdown_keys_track_use_markdown() {
    let context = RenderContext::default();
    let mut on = dispatcher("page.md", &context);
    let mut off = dispatcher("page.md", &context);
    off.set_use_markdown(false);

    assert_ne!(
        on.cache_key("# Hi").expect("key"),
        off.cache_key("# Hi").expect("key")
    );
}

#[test]
fn html_keys_ignore_markdown_settings() {
    let context = RenderContext::default();
    let mut first = dispatcher("index.html", &context);
    let mut second = dispatcher("index.html", &context);
    second.set_use_markdown(true);
    second.set_markdown_engine(Some(EngineId::new("njk")));

    assert_eq!(
        first.cache_key("<p>{{ x }}</p>").expect("key"),
        second.cache_key("<p>{{ x }}</p>").expect("key")
    );
}

#[tokio::test]
async fn html_documents_run_through_their_preprocessor() {
    let context = RenderContext::default();
    let mut render = dispatcher("index.html", &context);
    let compiled = render
        .compiled_template("<p>{{ x }}</p>")
        .await
        .expect("compiles");
    assert_eq!(compiled.render(&json!({ "x": 1 })).expect("renders"), "<p>1</p>");

    let mut plain = dispatcher("index.html", &context);
    plain.set_html_engine(None);
    let compiled = plain
        .compiled_template("<p>{{ x }}</p>")
        .await
        .expect("compiles");
    assert_eq!(compiled.render(&json!({ "x": 1 })).expect("renders"), "<p>{{ x }}</p>");
}

#[tokio::test]
async fn dispatchers_share_the_context_cache() {
    let context = RenderContext::default();
    let mut first = dispatcher("post.njk", &context);
    let mut second = dispatcher("post.njk", &context);

    let a = first.compiled_template("{{ x }}").await.expect("compiles");
    let b = second.compiled_template("{{ x }}").await.expect("cached");
    assert!(a.ptr_eq(&b));
    assert_eq!(context.cache().len(), 1);

    let isolated = RenderContext::default();
    let mut third = dispatcher("post.njk", &isolated);
    let c = third.compiled_template("{{ x }}").await.expect("compiles");
    assert!(!a.ptr_eq(&c));
}

#[tokio::test]
async fn includes_resolve_against_input_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("_includes")).expect("includes dir");
    fs::write(dir.path().join("_includes/footer.njk"), "<footer>{{ year }}</footer>")
        .expect("write include");

    let context = RenderContext::default();
    let mut render = TemplateRender::new("page.njk", Some(dir.path()), &context).expect("dispatcher");
    assert_eq!(render.includes_dir(), dir.path().join("_includes"));

    let compiled = render
        .compiled_template("<main></main>{% include \"footer.njk\" %}")
        .await
        .expect("compiles");
    assert_eq!(
        compiled.render(&json!({ "year": 2024 })).expect("renders"),
        "<main></main><footer>2024</footer>"
    );
}

struct FailingEngine {
    name: EngineId,
}

#[async_trait]
impl TemplateEngine for FailingEngine {
    fn name(&self) -> &EngineId {
        &self.name
    }

    async fn compile(&self, request: CompileRequest<'_>) -> Result<CompiledTemplate, EngineError> {
        Err(EngineError::compile(&self.name, request.identifier, "always fails"))
    }
}

#[tokio::test]
async fn compile_failures_propagate_and_are_not_cached() {
    let mut registry = EngineRegistry::with_builtin_engines();
    registry.register("njk", |_: &Path| {
        Box::new(FailingEngine {
            name: EngineId::new("njk"),
        }) as Box<dyn TemplateEngine>
    });

    let cache = Arc::new(TemplateCache::new());
    let context = RenderContext::from_parts(
        Arc::new(RenderConfig::default()),
        Arc::new(ExtensionMap::builtin()),
        Arc::new(registry),
        Arc::clone(&cache),
    );
    let mut render = dispatcher("page.njk", &context);

    let err = render.compiled_template("{{ x }}").await.expect_err("fails");
    assert!(matches!(
        err,
        RenderError::Engine(EngineError::Compile { ref message, .. }) if message == "always fails"
    ));
    assert!(cache.is_empty());
}
