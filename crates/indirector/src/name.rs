//! Canonical naming for indirections and terminus classes.
//!
//! Legacy type identifiers such as `Terminus::Type::MyStuff` are reduced to the
//! lowercase, underscore-joined key used by the registries (`my_stuff`).

/// Converts a mixed-case, optionally namespaced identifier into its canonical key.
///
/// Namespace qualification (everything up to the last `::`) is dropped, an
/// underscore is inserted at each lowercase-to-uppercase boundary, and the
/// result is lowercased.
pub fn canonicalize(identifier: &str) -> String {
	let base = identifier.rsplit("::").next().unwrap_or(identifier);
	let mut out = String::with_capacity(base.len() + 4);
	let mut prev_lower = false;
	for ch in base.chars() {
		if prev_lower && ch.is_uppercase() {
			out.push('_');
		}
		prev_lower = ch.is_lowercase();
		out.extend(ch.to_lowercase());
	}
	out
}

/// Returns true if `name` is non-empty and already in canonical form.
pub fn is_canonical(name: &str) -> bool {
	!name.is_empty() && canonicalize(name) == name
}
