pub mod catalog;

use libris_kernel::ModuleRegistry;

use catalog::store::CatalogStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: CatalogStore) {
    registry.register(catalog::create_module(store));
}
