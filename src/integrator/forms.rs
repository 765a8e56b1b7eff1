//! Generated input fields for the run and build forms.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::{
    error::Result,
    integrator::{naming, templates},
    patch::{Anchor, Injection},
};

static RUN_SUBMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<button[^>]*type="submit"[^>]*>"#).unwrap()
});

static BUILD_SUBMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<button[^>]*onClick.*buildImage[^>]*>"#).unwrap()
});

/// A form-bearing UI file and how fields are wired into it.
#[derive(Debug, Clone)]
pub struct FormTarget {
    pub anchor_id: &'static str,
    pub anchor: &'static LazyLock<Regex>,
    pub state: &'static str,
    pub setter: &'static str,
    pub accepts: fn(&str) -> bool,
}

pub fn run_form() -> FormTarget {
    FormTarget {
        anchor_id: "run-form-submit",
        anchor: &RUN_SUBMIT,
        state: "formData",
        setter: "setFormData",
        accepts: |_| true,
    }
}

pub fn build_form() -> FormTarget {
    FormTarget {
        anchor_id: "build-form-submit",
        anchor: &BUILD_SUBMIT,
        state: "buildFormData",
        setter: "setBuildFormData",
        accepts: |flag| {
            flag.contains("build") || flag.contains("image") || flag.contains("tag")
        },
    }
}

#[derive(Serialize)]
struct FieldContext<'a> {
    flag: &'a str,
    tag: &'a str,
    label: String,
    name: &'a str,
    field: String,
    state: &'a str,
    setter: &'a str,
}

/// Comment heading the generated field for `flag`.
pub fn field_marker(flag: &str, tag: &str) -> String {
    format!("{{/* Auto-generated for {flag} - {tag} */}}")
}

/// One injection carrying a field block per accepted flag, or `None` when
/// the target accepts none of them. Flags whose field marker already appears
/// in `existing` are left out.
pub fn injection(
    target: &FormTarget,
    flags: &[String],
    tag: &str,
    existing: &str,
) -> Result<Option<Injection>> {
    let fields = flags
        .iter()
        .filter(|f| (target.accepts)(f.as_str()))
        .filter(|f| !existing.contains(&field_marker(f, tag)))
        .map(|flag| {
            templates::render(
                templates::FORM_FIELD,
                &FieldContext {
                    flag,
                    tag,
                    label: naming::flag_label(flag),
                    name: flag.trim_start_matches('-'),
                    field: naming::field_name(flag),
                    state: target.state,
                    setter: target.setter,
                },
            )
        })
        .collect::<Result<Vec<String>>>()?;

    if fields.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        Injection::new(
            target.anchor_id,
            Anchor::FirstMatch(Regex::clone(target.anchor)),
            fields.join("\n"),
        )
        .with_suffix("\n\n        "),
    ))
}
