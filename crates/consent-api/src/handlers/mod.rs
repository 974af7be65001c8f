pub mod consents;
pub mod health;
pub mod purposes;
pub mod validate;

pub use consents::*;
pub use health::*;
pub use purposes::*;
pub use validate::*;
