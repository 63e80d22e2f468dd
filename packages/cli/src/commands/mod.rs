pub mod compile;
pub mod import;
pub mod init;
pub mod recover;

pub use compile::{compile, CompileArgs};
pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};
pub use recover::{recover, RecoverArgs};
