//! Inline `style` attribute helpers.
//!
//! Declarations are kept in their original order; property names are
//! compared case-insensitively and written back lowercased.

fn declarations(style: &str) -> impl Iterator<Item = (String, &str)> {
    style.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let name = name.trim();
        let value = value.trim();
        (!name.is_empty() && !value.is_empty()).then(|| (name.to_ascii_lowercase(), value))
    })
}

/// Value of `property` in a style attribute.
pub fn property(style: &str, property: &str) -> Option<String> {
    declarations(style)
        .filter(|(name, _)| name.eq_ignore_ascii_case(property))
        .last()
        .map(|(_, value)| value.to_string())
}

/// `style` with `property` set to `value`, or removed when `value` is `None`.
pub fn with_property(style: &str, property: &str, value: Option<&str>) -> String {
    let property = property.to_ascii_lowercase();
    let mut out: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, existing) in declarations(style) {
        if name == property {
            if let (Some(v), false) = (value, replaced) {
                out.push((name, v.to_string()));
                replaced = true;
            }
        } else {
            out.push((name, existing.to_string()));
        }
    }
    if let (Some(v), false) = (value, replaced) {
        out.push((property, v.to_string()));
    }
    out.iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
