pub mod debounce;
pub mod landmarks;

pub use debounce::{ClosureState, DebounceMachine, Phase, Transition};
pub use landmarks::{EyeIndexScheme, FaceLandmarks, FacePolicy};
