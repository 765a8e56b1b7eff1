//! Identifier derivation for generated code.

fn words(command: &str) -> impl Iterator<Item = &str> {
    command
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "volume" -> "Volume", "image prune" -> "ImagePrune".
pub fn page_name(command: &str) -> String {
    words(command)
        .map(|w| {
            capitalize(
                &w.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>(),
            )
        })
        .collect()
}

/// Generated utility method for a command, e.g. `executeVolume`.
pub fn method_name(command: &str) -> String {
    format!("execute{}", page_name(command))
}

/// Form-state key for a flag: leading dashes stripped, hyphenated segments
/// camel-cased ("--no-cache" -> "noCache").
pub fn field_name(flag: &str) -> String {
    let mut segments = flag.trim_start_matches('-').split('-');
    let first = segments.next().unwrap_or_default().to_string();

    segments
        .filter(|s| !s.is_empty())
        .fold(first, |mut acc, s| {
            acc.push_str(&capitalize(s));
            acc
        })
}

/// Human label for a flag ("--no-cache" -> "No cache").
pub fn flag_label(flag: &str) -> String {
    capitalize(&flag.trim_start_matches('-').replace('-', " "))
}

/// Router path of a command's page ("image prune" -> "/image-prune").
pub fn route_path(command: &str) -> String {
    format!(
        "/{}",
        words(command)
            .map(|w| w.to_lowercase())
            .collect::<Vec<String>>()
            .join("-")
    )
}

/// Command reduced to characters that are safe in generated markup.
pub fn display_command(command: &str) -> String {
    command
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<String>>()
        .join(" ")
}

/// Escape a value for a single-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Command split into CLI arguments, quoted for a JavaScript array.
pub fn js_args(command: &str) -> String {
    command
        .split_whitespace()
        .map(|w| format!("'{}'", js_string(w)))
        .collect::<Vec<String>>()
        .join(", ")
}
