use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};
use crate::Migration;

/// Ordered set of modules making up an application
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module. Names must be unique because they become mount paths.
    pub fn register(&mut self, module: Arc<dyn Module>) -> anyhow::Result<()> {
        if self.get_module(module.name()).is_some() {
            anyhow::bail!("module '{}' registered twice", module.name());
        }
        self.modules.push(module);
        Ok(())
    }

    /// All registered modules, in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;

            if !module.is_ready() {
                anyhow::bail!("module '{}' is not ready after init", module.name());
            }
        }

        Ok(())
    }

    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations, sorted by module name then migration id
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules
            .iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();

        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use atrium_authz::TokenService;
    use atrium_db::Database;

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "DEFINE INDEX thing_name ON thing FIELDS name;",
                },
                Migration {
                    id: "001_init",
                    up: "DEFINE TABLE thing SCHEMALESS;",
                },
            ]
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ModuleRegistry::new();
        registry
            .register(Arc::new(TestModule { name: "books" }))
            .unwrap();

        assert!(registry
            .register(Arc::new(TestModule { name: "books" }))
            .is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn migrations_are_sorted_by_module_then_id() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "zeta" })).unwrap();
        registry.register(Arc::new(TestModule { name: "alpha" })).unwrap();

        let order: Vec<(String, &str)> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| (module, migration.id))
            .collect();

        assert_eq!(
            order,
            vec![
                ("alpha".to_string(), "001_init"),
                ("alpha".to_string(), "002_index"),
                ("zeta".to_string(), "001_init"),
                ("zeta".to_string(), "002_index"),
            ]
        );
    }

    /// Forgets to build its state in init
    struct HollowModule;

    #[async_trait::async_trait]
    impl Module for HollowModule {
        fn name(&self) -> &'static str {
            "hollow"
        }

        fn is_ready(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn module_not_ready_after_init_aborts_startup() {
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let db = Database::in_memory().await.unwrap();
        let tokens = TokenService::new(b"registry-test", chrono::Duration::hours(1));
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
            tokens: &tokens,
        };

        registry.register(Arc::new(TestModule { name: "fine" })).unwrap();
        registry.register(Arc::new(HollowModule)).unwrap();

        let err = registry.init_modules(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("'hollow'"), "{err}");
    }

    #[tokio::test]
    async fn test_module_lifecycle() {
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let db = Database::in_memory().await.unwrap();
        let tokens = TokenService::new(b"registry-test", chrono::Duration::hours(1));
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
            tokens: &tokens,
        };

        registry.register(Arc::new(TestModule { name: "test" })).unwrap();

        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();
    }
}
