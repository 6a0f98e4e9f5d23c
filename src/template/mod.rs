//! Layout loading and composition on top of minijinja.

mod filters;
pub mod layouts;

use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use minijinja::value::Value;
use minijinja::{Environment, Error as TemplateError};
use time::OffsetDateTime;
use walkdir::WalkDir;

use crate::config::Config;

pub use layouts::{BASE_LAYOUT, HOME_LAYOUT, LIST_LAYOUT, LayoutKind, PAGE_LAYOUT, select_layout};

const DEFAULT_LAYOUTS: &[(&str, &str)] = &[
    (BASE_LAYOUT, include_str!("defaults/base.html")),
    (PAGE_LAYOUT, include_str!("defaults/page.html")),
    (LIST_LAYOUT, include_str!("defaults/list.html")),
    (HOME_LAYOUT, include_str!("defaults/home.html")),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTemplates {
    pub user: usize,
    pub defaults: usize,
}

pub fn environment(config: &Config) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_global("config", Value::from_serialize(config));
    env.add_global(
        "base_url",
        Value::from_safe_string(normalize_base_url(&config.base_url)),
    );

    let default_format = config.date_format.clone();
    env.add_function(
        "now",
        move |format: Option<&str>| -> Result<String, TemplateError> {
            filters::format_with(
                &OffsetDateTime::now_utc(),
                format.unwrap_or(&default_format),
            )
        },
    );

    filters::register(&mut env, config);

    Ok(env)
}

/// Registers every file under `templates_dir` by its relative path. When the
/// user supplies no base layout, the built-in layouts fill in whichever of
/// the standard names are still missing.
pub fn load_templates(templates_dir: &Path, env: &mut Environment<'static>) -> Result<LoadedTemplates> {
    let mut loaded = LoadedTemplates::default();
    let mut names = BTreeSet::new();

    if templates_dir.exists() {
        let mut files = Vec::new();
        for entry in WalkDir::new(templates_dir) {
            let entry = entry.with_context(|| format!("failed to walk {}", templates_dir.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();

        for path in files {
            let body = fs::read_to_string(&path)
                .with_context(|| format!("failed to read template {}", path.display()))?;
            let relative = path.strip_prefix(templates_dir).with_context(|| {
                format!("{} is outside {}", path.display(), templates_dir.display())
            })?;
            let name = template_name(relative);
            let name_static: &'static str = Box::leak(name.clone().into_boxed_str());
            let body_static: &'static str = Box::leak(body.into_boxed_str());
            env.add_template(name_static, body_static)
                .map_err(|err| describe_template_error("loading templates", &name, err))?;
            names.insert(name);
            loaded.user += 1;
        }
    }

    if !names.contains(BASE_LAYOUT) {
        for &(name, body) in DEFAULT_LAYOUTS {
            if names.contains(name) {
                continue;
            }
            env.add_template(name, body)
                .map_err(|err| describe_template_error("loading built-in layouts", name, err))?;
            loaded.defaults += 1;
        }
    }

    Ok(loaded)
}

fn template_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Renders the layout chosen for `kind`, then wraps the fragment in the
/// base layout.
pub fn compose(
    env: &Environment<'static>,
    kind: LayoutKind<'_>,
    context: Value,
    title: &str,
    site: &Value,
    scope: &str,
) -> Result<String> {
    let layout = select_layout(kind, |name| env.get_template(name).is_ok())?;
    let template = env
        .get_template(&layout)
        .map_err(|err| describe_template_error(scope, &layout, err))?;
    let fragment = render_template_with_scope(&template, context, scope)?;
    wrap_in_base(env, fragment, title, site, scope)
}

pub fn wrap_in_base(
    env: &Environment<'static>,
    fragment: String,
    title: &str,
    site: &Value,
    scope: &str,
) -> Result<String> {
    let name = select_layout(LayoutKind::Base, |name| env.get_template(name).is_ok())?;
    let base = env
        .get_template(&name)
        .map_err(|err| describe_template_error(scope, &name, err))?;
    render_template_with_scope(
        &base,
        minijinja::context! {
            title => title,
            content => Value::from_safe_string(fragment),
            site => site,
        },
        scope,
    )
}

pub fn render_template_with_scope(
    template: &minijinja::Template<'_, '_>,
    context: Value,
    scope: &str,
) -> Result<String> {
    let template_name = template.name().to_string();
    template
        .render(context)
        .map_err(|err| describe_template_error(scope, &template_name, err))
}

pub fn describe_template_error(scope: &str, template_name: &str, err: TemplateError) -> anyhow::Error {
    let actual_template = err.name().unwrap_or(template_name).to_string();
    let mut message = String::new();
    let _ = write!(&mut message, "{scope}: template '{actual_template}'");

    if actual_template != template_name {
        let _ = write!(&mut message, " (included from '{template_name}')");
    }
    if let Some(line) = err.line() {
        let _ = write!(&mut message, " at line {line}");
    }

    let _ = write!(&mut message, "\nkind: {:?}", err.kind());
    let detail = err.detail().map_or_else(|| err.to_string(), str::to_string);
    let _ = write!(&mut message, "\nmessage: {detail}");
    if let Some(source) = StdError::source(&err) {
        let _ = write!(&mut message, "\ncaused by: {source}");
    }

    anyhow!(message)
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
