//! Runnable modules, each bundling its collaborators and providing a unified configuration

pub mod deployer;
