#![allow(unused_crate_dependencies)]
//! End-to-end indirection wiring: configuration, plugin autoloading, and
//! cached dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indirector::{
	Indirection, IndirectorConfig, IndirectorError, InvalidOperation, Model, ModelRef, ModelType, Registry, Result,
	Terminus, TerminusDef, Version, terminus,
};
use indirector::termini::MemoryTerminus;
use parking_lot::RwLock;
use pretty_assertions::assert_eq;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Clone, PartialEq)]
struct Certificate {
	name: String,
	serial: u64,
}

impl Model for Certificate {
	fn key(&self) -> &str {
		&self.name
	}

	fn version(&self) -> Option<Version> {
		Some(Version(self.serial))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

fn cert(name: &str, serial: u64) -> ModelRef {
	Arc::new(Certificate {
		name: name.into(),
		serial,
	})
}

#[derive(Default)]
struct CertificateFile;

impl Terminus for CertificateFile {
	fn find(&self, key: &str) -> Result<Option<ModelRef>> {
		Ok((key == "ca").then(|| cert("ca", 7)))
	}
}

fn certificate_file() -> Box<dyn Terminus> {
	Box::new(CertificateFile)
}

terminus!(certificate_file, {
	terminus_type: "certificate",
	name: "file",
	namespace: "integration",
	description: "Certificates read from the local ssl directory",
}, factory: certificate_file);

#[test]
fn test_model_is_delegated_from_indirection() {
	init_tracing();
	let registry = Registry::new();
	let indirection = registry
		.register_indirection(Indirection::new("my_stuff", ModelType::named("yay")))
		.unwrap();

	let parent = registry.define_abstract("MyStuff").unwrap();
	assert_eq!(parent.terminus_type(), "my_stuff");
	assert!(Arc::ptr_eq(&parent.indirection(), &indirection));

	registry
		.define_terminus(TerminusDef::new("my_stuff", "test", CertificateFile::default))
		.unwrap();
	let instance = registry.terminus("my_stuff", "test").unwrap();
	assert_eq!(instance.model(), &ModelType::named("yay"));
	assert_eq!(instance.terminus_type(), "my_stuff");
}

#[test]
fn test_plugins_autoload_from_configured_namespace() {
	init_tracing();
	let config = IndirectorConfig::parse(
		r#"
		[autoload]
		namespace = "integration"

		[indirections.certificate]
		terminus = "file"
		"#,
	)
	.unwrap();
	let registry = Registry::from_config(&config);
	registry
		.register_indirection(Indirection::new("certificate", ModelType::of::<Certificate>()))
		.unwrap();
	registry.define_abstract("Certificate").unwrap();

	assert!(registry.termini().get("certificate", "file").is_none());
	let class = registry.terminus_class("certificate", "file").unwrap();
	assert_eq!(class.description().as_deref(), Some("Certificates read from the local ssl directory"));
	assert!(class.model().is::<Certificate>());

	let found = registry.find("certificate", "ca").unwrap().unwrap();
	assert_eq!(found.downcast_ref::<Certificate>().unwrap().serial, 7);
	assert!(registry.find("certificate", "missing").unwrap().is_none());

	let err = registry.terminus_class("certificate", "rest").unwrap_err();
	assert!(matches!(err, IndirectorError::Lookup { .. }));
}

#[test]
fn test_default_namespace_does_not_see_other_plugins() {
	let registry = Registry::new();
	registry
		.register_indirection(Indirection::new("certificate", ModelType::of::<Certificate>()))
		.unwrap();
	registry.define_abstract("Certificate").unwrap();

	assert!(registry.terminus_class("certificate", "file").is_err());
	assert!(registry.terminus_classes("certificate").unwrap().is_empty());
}

#[test]
fn test_dispatch_requires_selected_terminus() {
	let registry = Registry::new();
	registry
		.register_indirection(Indirection::new("node", ModelType::named("node")))
		.unwrap();

	let err = registry.find("node", "web01").unwrap_err();
	assert_eq!(
		err,
		IndirectorError::InvalidOperation(InvalidOperation::NoTerminusSelected {
			indirection: "node".into()
		})
	);
}

/// Primary store with cheap versioning and a counted `find`.
#[derive(Clone, Default)]
struct Source {
	store: Arc<RwLock<HashMap<String, u64>>>,
	finds: Arc<AtomicUsize>,
}

impl Terminus for Source {
	fn find(&self, key: &str) -> Result<Option<ModelRef>> {
		self.finds.fetch_add(1, Ordering::SeqCst);
		Ok(self.store.read().get(key).map(|&serial| cert(key, serial)))
	}

	fn save(&mut self, instance: ModelRef) -> Result<()> {
		let serial = instance.version().map_or(0, |v| v.0);
		self.store.write().insert(instance.key().to_string(), serial);
		Ok(())
	}

	fn search(&self, query: &str) -> Result<Vec<ModelRef>> {
		let store = self.store.read();
		let mut keys: Vec<&String> = store.keys().filter(|key| key.starts_with(query)).collect();
		keys.sort();
		Ok(keys.into_iter().map(|key| cert(key, store[key])).collect())
	}

	fn destroy(&mut self, instance: &dyn Model) -> Result<()> {
		self.store.write().remove(instance.key());
		Ok(())
	}

	fn version(&self, key: &str) -> Result<Option<Version>> {
		Ok(self.store.read().get(key).map(|&serial| Version(serial)))
	}
}

#[test]
fn test_cached_find_respects_freshness() {
	init_tracing();
	let (registry, source) = cached_registry();

	registry.save("certificate", cert("web01", 1)).unwrap();
	let found = registry.find("certificate", "web01").unwrap().unwrap();
	assert_eq!(found.version(), Some(Version(1)));
	assert_eq!(source.finds.load(Ordering::SeqCst), 0, "fresh cache answers without a fetch");

	source.store.write().insert("web01".into(), 2);
	let found = registry.find("certificate", "web01").unwrap().unwrap();
	assert_eq!(found.version(), Some(Version(2)));
	assert_eq!(source.finds.load(Ordering::SeqCst), 1);

	registry.find("certificate", "web01").unwrap();
	assert_eq!(source.finds.load(Ordering::SeqCst), 1, "cache was refreshed");

}

fn cached_registry() -> (Registry, Source) {
	let config = IndirectorConfig::parse("[indirections.certificate]\nterminus = \"source\"\ncache = \"memory\"\n").unwrap();
	let registry = Registry::from_config(&config);
	registry
		.register_indirection(Indirection::new("certificate", ModelType::of::<Certificate>()))
		.unwrap();
	registry.define_abstract("Certificate").unwrap();

	let source = Source::default();
	let shared = source.clone();
	registry
		.define_terminus(TerminusDef::new("certificate", "source", move || shared.clone()))
		.unwrap();
	registry
		.define_terminus(TerminusDef::with_factory("certificate", "memory", MemoryTerminus::factory()))
		.unwrap();
	(registry, source)
}

#[test]
fn test_destroy_evicts_primary_and_cache() {
	let (registry, source) = cached_registry();
	registry.save("certificate", cert("web01", 3)).unwrap();
	let cache = registry.terminus("certificate", "memory").unwrap();
	assert!(cache.find("web01").unwrap().is_some());

	registry.destroy("certificate", cert("web01", 3).as_ref()).unwrap();

	assert!(source.store.read().get("web01").is_none());
	assert!(cache.find("web01").unwrap().is_none());
	assert!(registry.find("certificate", "web01").unwrap().is_none());
}

#[test]
fn test_search_goes_to_primary_terminus() {
	let (registry, source) = cached_registry();
	source.store.write().insert("web01".into(), 1);
	source.store.write().insert("web02".into(), 4);
	source.store.write().insert("db01".into(), 2);

	let found = registry.search("certificate", "web").unwrap();
	let keys: Vec<&str> = found.iter().map(|instance| instance.key()).collect();
	assert_eq!(keys, vec!["web01", "web02"]);
	assert!(
		registry.terminus("certificate", "memory").unwrap().search("*").unwrap().is_empty(),
		"search does not populate the cache"
	);
}

#[test]
fn test_reconfigure_without_cache_clears_cache_terminus() {
	let (registry, source) = cached_registry();
	let indirection = registry.indirection("certificate").unwrap();
	assert_eq!(indirection.cache_class().as_deref(), Some("memory"));

	registry.configure(&IndirectorConfig::parse("[indirections.certificate]\nterminus = \"source\"\n").unwrap());
	assert_eq!(indirection.cache_class(), None);

	source.store.write().insert("web01".into(), 1);
	registry.find("certificate", "web01").unwrap();
	registry.find("certificate", "web01").unwrap();
	assert_eq!(source.finds.load(Ordering::SeqCst), 2, "every find reaches the primary");
}

#[derive(Default)]
struct Listing;

impl Terminus for Listing {}

fn listing() -> Box<dyn Terminus> {
	Box::new(Listing)
}

terminus!(yaml, {
	terminus_type: "catalog",
	namespace: "listing",
}, factory: listing);

terminus!(listing_json, {
	terminus_type: "catalog",
	name: "Json",
	namespace: "listing",
}, factory: listing);

fn listing_registry() -> Registry {
	let config = IndirectorConfig::parse("[autoload]\nnamespace = \"listing\"\n").unwrap();
	let registry = Registry::from_config(&config);
	registry
		.register_indirection(Indirection::new("catalog", ModelType::named("catalog")))
		.unwrap();
	registry
		.register_indirection(Indirection::new("resource", ModelType::named("resource")))
		.unwrap();
	registry.define_abstract("Catalog").unwrap();
	registry
}

#[test]
fn test_plugin_name_defaults_to_identifier() {
	let registry = listing_registry();
	assert_eq!(registry.terminus_class("catalog", "yaml").unwrap().name(), "yaml");
	assert_eq!(registry.terminus_class("catalog", "json").unwrap().name(), "json");
}

#[test]
fn test_listing_keeps_loaded_classes() {
	let registry = listing_registry();
	let class = registry.terminus_class("catalog", "yaml").unwrap();
	class.desc("operator help");
	registry.set_indirection(&class, "resource").unwrap();

	assert_eq!(registry.terminus_classes("catalog").unwrap(), vec!["json".to_string(), "yaml".to_string()]);
	assert_eq!(registry.terminus_classes("catalog").unwrap(), vec!["json".to_string(), "yaml".to_string()]);

	let again = registry.terminus_class("catalog", "yaml").unwrap();
	assert!(Arc::ptr_eq(&class, &again));
	assert_eq!(again.description().as_deref(), Some("operator help"));
	assert_eq!(again.indirection().name(), "resource");
}
