use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(
        settings.render.markdown_template_engine,
        Some(EngineId::new("liquid"))
    );
    assert_eq!(
        settings.render.html_template_engine,
        Some(EngineId::new("liquid"))
    );
    assert_eq!(settings.render.input_dir, PathBuf::from("."));
    assert_eq!(settings.render.includes_dir, PathBuf::from("_includes"));
    assert_eq!(settings.render.template_formats.len(), BUILTIN_ENGINES.len());
    assert!(!settings.render.strict_variables);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.render.markdown_template_engine = Some("liquid".to_string());

    let overrides = RenderOverrides {
        markdown_template_engine: Some("njk".to_string()),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(
        settings.render.markdown_template_engine,
        Some(EngineId::new("njk"))
    );
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = RenderOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn disabled_preprocessors_resolve_to_none() {
    for value in ["false", "FALSE", "none", ""] {
        let mut raw = RawSettings::default();
        raw.render.markdown_template_engine = Some(value.to_string());
        raw.render.html_template_engine = Some(value.to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.render.markdown_template_engine, None, "{value:?}");
        assert_eq!(settings.render.html_template_engine, None, "{value:?}");
    }
}

#[test]
fn unknown_preprocessor_is_rejected() {
    let mut raw = RawSettings::default();
    raw.render.html_template_engine = Some("ejs".to_string());

    let err = Settings::from_raw(raw).expect_err("unknown engine");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "render.html_template_engine",
            ..
        }
    ));
}

#[test]
fn template_formats_are_normalized_and_validated() {
    let mut raw = RawSettings::default();
    raw.render.template_formats = Some(vec![
        " MD ".to_string(),
        "njk".to_string(),
        "md".to_string(),
    ]);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.render.template_formats,
        vec![EngineId::markdown(), EngineId::new("njk")]
    );

    let mut raw = RawSettings::default();
    raw.render.template_formats = Some(vec!["pug".to_string()]);
    let err = Settings::from_raw(raw).expect_err("unknown format");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "render.template_formats",
            ..
        }
    ));
}

#[test]
fn absolute_includes_dir_is_rejected() {
    let mut raw = RawSettings::default();
    raw.render.includes_dir = Some(PathBuf::from("/etc/includes"));

    let err = Settings::from_raw(raw).expect_err("absolute includes dir");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "render.includes_dir",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "rendition",
        "render",
        "posts/hello.md",
        "--engine-override",
        "md,njk",
        "--bypass-markdown",
        "--data",
        r#"{"title":"Hi"}"#,
        "--template-formats",
        "md,njk",
    ]);

    assert_eq!(
        args.overrides.template_formats,
        Some(vec!["md".to_string(), "njk".to_string()])
    );
    match args.command {
        Command::Render(render) => {
            assert_eq!(render.file, std::path::Path::new("posts/hello.md"));
            assert_eq!(render.engine_override.as_deref(), Some("md,njk"));
            assert!(render.bypass_markdown);
            assert_eq!(render.data.as_deref(), Some(r#"{"title":"Hi"}"#));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_engines_arguments() {
    let args = CliArgs::parse_from([
        "rendition",
        "--strict-variables=true",
        "engines",
        "index.html",
        "--engine-override",
        "njk",
    ]);

    assert_eq!(args.overrides.strict_variables, Some(true));
    match args.command {
        Command::Engines(engines) => {
            assert_eq!(engines.file, std::path::Path::new("index.html"));
            assert_eq!(engines.engine_override.as_deref(), Some("njk"));
        }
        _ => panic!("wrong command parsed"),
    }
}
