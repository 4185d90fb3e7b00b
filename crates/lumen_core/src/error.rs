//! Errors raised by malformed scene graphs.

use thiserror::Error;

/// Structural problems with a scene.
///
/// These are fatal for a render: a scene that fails validation produces no
/// image at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("scene has no root node")]
    NoRoot,

    #[error("unknown node id {0}")]
    UnknownNode(usize),

    #[error("unknown material id {0}")]
    UnknownMaterial(usize),

    #[error("geometry node '{0}' has no material")]
    MissingMaterial(String),

    #[error("boolean node '{name}' has {children} children, expected exactly 2")]
    MalformedBoolean { name: String, children: usize },

    #[error("node '{0}' is not a geometry node")]
    NotGeometry(String),

    #[error("node '{0}' already has a parent")]
    AlreadyParented(String),

    #[error("adding '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },

    #[error("{0} primitives cannot be sampled as area lights")]
    SamplingUnsupported(&'static str),

    #[error("emissive node '{0}' needs at least one light sample")]
    NoEmissionSamples(String),
}
