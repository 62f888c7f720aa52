pub mod auth;
pub mod books;
pub mod comments;
pub mod dishes;
pub mod favorites;
pub mod genres;
pub mod leaders;
pub mod promotions;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

use atrium_kernel::ModuleRegistry;

/// Register every Atrium module with the registry
pub fn register_all(registry: &mut ModuleRegistry) -> anyhow::Result<()> {
    registry.register(auth::create_module())?;
    registry.register(users::create_module())?;
    registry.register(genres::create_module())?;
    registry.register(books::create_module())?;
    registry.register(dishes::create_module())?;
    registry.register(favorites::create_module())?;
    registry.register(leaders::create_module())?;
    registry.register(promotions::create_module())?;
    Ok(())
}
