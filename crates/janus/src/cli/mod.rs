//! CLI command implementations.

mod display;

pub mod at;
pub mod index;
pub mod usages;

use std::path::Path;
use std::sync::Arc;

use janus::{Config, Generation, Janus, Scenario};

/// A scenario loaded into a freshly built engine.
pub(crate) struct Session {
    pub janus: Janus,
    pub scenario: Scenario,
    pub generation: Arc<Generation>,
}

/// Load configuration and scenario, then build the index.
pub(crate) fn open(config: Option<&Path>, scenario: &Path) -> Result<Session, janus::Error> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let scenario = Scenario::load(scenario)?;
    let janus = Janus::new(config)?;
    let generation = janus.build(&scenario.files, &scenario.libraries)?;
    Ok(Session {
        janus,
        scenario,
        generation,
    })
}
