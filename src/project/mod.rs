/*!
 * Project documents: the normalized tree and the normalizer that builds it.
 */

pub mod model;
pub mod normalizer;

pub use model::{FrameSlot, ImagePromptSet, ProjectDocument, Scene, Shot, UNTITLED_PROJECT};
pub use normalizer::{FixedId, IdGenerator, Normalizer, UuidIdGenerator};
