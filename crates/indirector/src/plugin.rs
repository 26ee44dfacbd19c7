//! Link-time terminus plugins.
//!
//! Concrete backends declare themselves with [`terminus!`](crate::terminus).
//! A declaration only files the plugin under its location; the class is
//! registered the first time a [`PluginAutoloader`](crate::PluginAutoloader)
//! bound to that location is asked for it.

use std::sync::Arc;

use crate::name::canonicalize;
use crate::terminus::{Terminus, TerminusDef, TerminusFactory};

/// A statically declared concrete terminus.
#[derive(Debug)]
pub struct TerminusPlugin {
	/// Discovery namespace, `"indirector"` unless overridden.
	pub namespace: &'static str,
	/// Abstract terminus type (indirection name) this plugin serves.
	pub terminus_type: &'static str,
	/// Terminus name; canonicalized on load.
	pub name: &'static str,
	pub description: &'static str,
	pub factory: fn() -> Box<dyn Terminus>,
}

/// Registration wrapper collected by `inventory`.
pub struct TerminusPluginReg(pub &'static TerminusPlugin);
inventory::collect!(TerminusPluginReg);

impl TerminusPlugin {
	/// Iterates every plugin linked into the binary.
	pub fn all() -> impl Iterator<Item = &'static TerminusPlugin> {
		inventory::iter::<TerminusPluginReg>.into_iter().map(|reg| reg.0)
	}

	/// The discovery location this plugin is filed under.
	pub fn location(&self) -> String {
		format!("{}/{}", self.namespace, self.terminus_type)
	}

	pub fn name(&self) -> String {
		canonicalize(self.name)
	}

	pub(crate) fn to_def(&self) -> TerminusDef {
		let factory: TerminusFactory = Arc::new(self.factory);
		let def = TerminusDef::with_factory(self.terminus_type, self.name(), factory);
		if self.description.is_empty() {
			def
		} else {
			def.description(self.description)
		}
	}
}

/// Declares a concrete terminus plugin.
///
/// ```ignore
/// fn rest_terminus() -> Box<dyn Terminus> {
///     Box::new(RestCertificate::default())
/// }
///
/// terminus!(rest, {
///     terminus_type: "certificate",
///     description: "Certificates fetched from the CA over REST",
/// }, factory: rest_terminus);
/// ```
#[macro_export]
macro_rules! terminus {
	($ident:ident, {
		terminus_type: $ty:expr
		$(, name: $name:expr)?
		$(, namespace: $ns:expr)?
		$(, description: $desc:expr)?
		$(,)?
	}, factory: $factory:expr) => {
		$crate::__private::paste::paste! {
			#[allow(non_upper_case_globals)]
			pub static [<TERMINUS_ $ident>]: $crate::TerminusPlugin = $crate::TerminusPlugin {
				namespace: $crate::__terminus_opt!($({$ns})?, $crate::DEFAULT_NAMESPACE),
				terminus_type: $ty,
				name: $crate::__terminus_opt!($({$name})?, stringify!($ident)),
				description: $crate::__terminus_opt!($({$desc})?, ""),
				factory: $factory,
			};

			$crate::__private::inventory::submit! { $crate::TerminusPluginReg(&[<TERMINUS_ $ident>]) }
		}
	};
}

/// Selects a provided value or falls back to a default.
#[doc(hidden)]
#[macro_export]
macro_rules! __terminus_opt {
	({$val:expr}, $default:expr) => {
		$val
	};
	(, $default:expr) => {
		$default
	};
}
