mod never;
pub use never::*;
pub mod template;
