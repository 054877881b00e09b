//! `PlantUML` source preparation.

/// Inject the `skinparam dpi` directive after `@startuml`.
///
/// Sources without `@startuml` get the directive prepended.
#[must_use]
pub fn inject_dpi(source: &str, dpi: u32) -> String {
    let directive = format!("skinparam dpi {dpi}\n");

    let insert_pos = source
        .find("@startuml")
        .and_then(|pos| source[pos..].find('\n').map(|nl| pos + nl + 1));

    match insert_pos {
        Some(pos) => {
            let mut result = String::with_capacity(source.len() + directive.len());
            result.push_str(&source[..pos]);
            result.push_str(&directive);
            result.push_str(&source[pos..]);
            result
        }
        None => format!("{directive}{source}"),
    }
}
